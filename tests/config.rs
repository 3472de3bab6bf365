use snsout::boot::BootFailurePolicy;
use snsout::cli::Cli;
use snsout::codec::CodecKind;
use snsout::config::{Config, PublisherKind};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        json_logs = true
        default_destination = "alerts"
        boot_destination = "boot"
        boot_failure = "Abort"
        concurrency = 8
        queue_capacity = 50
        codec = "Plain"
        [publisher]
        kind = "Http"
        url = "http://localhost:9000/publish"
        timeout_ms = 2500
        auth_token = "secret"
    "#;

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert!(config.json_logs);
    assert_eq!(config.default_destination.as_deref(), Some("alerts"));
    assert_eq!(config.boot_destination.as_deref(), Some("boot"));
    assert_eq!(config.boot_failure, BootFailurePolicy::Abort);
    assert_eq!(config.concurrency, 8);
    assert_eq!(config.queue_capacity, 50);
    assert_eq!(config.codec, CodecKind::Plain);
    assert_eq!(config.publisher.kind, PublisherKind::Http);
    assert_eq!(
        config.publisher.url.as_deref(),
        Some("http://localhost:9000/publish")
    );
    assert_eq!(config.publisher.timeout_ms, 2500);
    assert_eq!(config.publisher.auth_token.as_deref(), Some("secret"));
}

#[test]
fn test_defaults_without_config_file() {
    let config = Config::load(&Cli::default()).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.boot_failure, BootFailurePolicy::LogAndContinue);
    assert_eq!(config.publisher.kind, PublisherKind::Log);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "default_destination = \"alerts\"\n").unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.default_destination.as_deref(), Some("alerts"));
    assert_eq!(config.concurrency, Config::default().concurrency);
    assert_eq!(config.publisher, Config::default().publisher);
}

#[test]
fn test_cli_arguments_override_file() {
    let toml_content = r#"
        default_destination = "from-file"
        concurrency = 2
        [publisher]
        kind = "Http"
        url = "http://localhost:9000/publish"
    "#;
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        default_destination: Some("from-cli".to_string()),
        concurrency: Some(16),
        dry_run: true,
        ..Default::default()
    };
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.default_destination.as_deref(), Some("from-cli"));
    assert_eq!(config.concurrency, 16);
    assert_eq!(config.publisher.kind, PublisherKind::Log);
    // Other publisher settings from the file survive the dry-run override.
    assert_eq!(
        config.publisher.url.as_deref(),
        Some("http://localhost:9000/publish")
    );
}

#[test]
fn test_invalid_enum_value_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "boot_failure = \"Explode\"\n").unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(Config::load(&cli).is_err());
}
