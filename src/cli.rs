//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the `snsout.toml` file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Publishes newline-delimited JSON events from stdin as topic notifications.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Destination used for events without an `sns` field.
    #[arg(long, value_name = "TOPIC")]
    pub default_destination: Option<String>,

    /// Destination for the one-shot boot notification.
    #[arg(long, value_name = "TOPIC")]
    pub boot_destination: Option<String>,

    /// Logging level (e.g. "info", "debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Number of concurrent publish workers.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Log notifications instead of sending them.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(destination) = &self.default_destination {
            dict.insert(
                "default_destination".into(),
                Value::from(destination.clone()),
            );
        }

        if let Some(destination) = &self.boot_destination {
            dict.insert("boot_destination".into(), Value::from(destination.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(concurrency) = self.concurrency {
            dict.insert("concurrency".into(), Value::from(concurrency));
        }

        // Flags only override when set, so `false` never masks the file or env.
        if self.json_logs {
            dict.insert("json_logs".into(), Value::from(true));
        }

        if self.dry_run {
            let mut publisher = Dict::new();
            publisher.insert("kind".into(), Value::from("Log"));
            dict.insert("publisher".into(), Value::from(publisher));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
