//! snsout - publishes application events as topic notifications
//!
//! Reads newline-delimited JSON events from stdin, shapes each into a
//! notification and delivers it through the configured publisher.

use anyhow::Result;
use clap::Parser;
use snsout::{
    boot::BootProbe,
    cli::Cli,
    config::Config,
    ingest::forward_events,
    notification::{manager::NotificationManager, NotificationAssembler, Notifier},
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    init_tracing(&config);

    info!("snsout starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!(
        "Default Destination: {}",
        config.default_destination.as_deref().unwrap_or("Not configured")
    );
    info!(
        "Boot Destination: {}",
        config.boot_destination.as_deref().unwrap_or("Not configured")
    );
    info!("Boot Failure Policy: {:?}", config.boot_failure);
    info!("Concurrency: {}", config.concurrency);
    info!("Queue Capacity: {}", config.queue_capacity);
    info!("Codec: {:?}", config.codec);
    info!("Publisher: {:?}", config.publisher.kind);
    info!("-------------------------------------------------------");

    let publisher = config.publisher.build()?;
    let notifier = Arc::new(Notifier::new(
        NotificationAssembler::new(publisher),
        config.default_destination.clone(),
        config.codec.build(),
    ));

    BootProbe::new(config.boot_destination.clone(), config.boot_failure)
        .run(notifier.assembler())
        .await?;

    let (event_tx, event_rx) = async_channel::bounded(config.queue_capacity.max(1));
    let manager = NotificationManager::new(notifier, event_rx, config.concurrency);
    let manager_handle = tokio::spawn(manager.run());

    let ingest_result = forward_events(BufReader::new(tokio::io::stdin()), event_tx).await;
    // Dropping the sender above closes the queue; the workers drain what is left.
    let summary = manager_handle.await?;

    if let Err(e) = ingest_result {
        error!(error = %e, "Failed to read events");
        return Err(e);
    }

    info!(
        published = summary.published,
        missing_destination = summary.missing_destination,
        failed = summary.failed,
        "snsout finished."
    );
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
