//! Configuration management for snsout
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a `snsout.toml` file and merge it with
//! environment variables and command-line arguments.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::boot::BootFailurePolicy;
use crate::cli::Cli;
use crate::codec::CodecKind;
use crate::core::Publisher;
use crate::notification::{logging_publisher::LoggingPublisher, webhook::HttpPublisher};

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Emit logs as JSON instead of human-readable lines.
    #[serde(default)]
    pub json_logs: bool,
    /// Destination for events that do not name one.
    pub default_destination: Option<String>,
    /// Destination for the boot notification. No boot notification if unset.
    pub boot_destination: Option<String>,
    /// What to do if the boot notification fails.
    pub boot_failure: BootFailurePolicy,
    /// Number of concurrent publish workers.
    pub concurrency: usize,
    /// Capacity of the inbound event queue.
    pub queue_capacity: usize,
    /// Codec for bodies that are not already text.
    pub codec: CodecKind,
    /// Configuration for the messaging backend.
    pub publisher: PublisherConfig,
}

/// The transport notifications are delivered through.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum PublisherKind {
    /// Log notifications without sending them.
    Log,
    /// POST notifications to an HTTP endpoint.
    Http,
}

/// Configuration for the messaging backend.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublisherConfig {
    pub kind: PublisherKind,
    /// Endpoint URL, required for `Http`.
    pub url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Bearer token sent with each request.
    pub auth_token: Option<String>,
}

impl PublisherConfig {
    /// Builds the configured publisher.
    pub fn build(&self) -> Result<Arc<dyn Publisher>> {
        match self.kind {
            PublisherKind::Log => Ok(Arc::new(LoggingPublisher::new())),
            PublisherKind::Http => {
                let url = self
                    .url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("publisher.url is required for the Http publisher"))?;
                Ok(Arc::new(HttpPublisher::new(
                    url,
                    self.auth_token.clone(),
                    Duration::from_millis(self.timeout_ms),
                )))
            }
        }
    }
}

impl Config {
    /// Loads the application configuration by layering defaults, the TOML
    /// file named on the command line, `SNSOUT_` environment variables and
    /// the command-line arguments themselves.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g., SNSOUT_DEFAULT_DESTINATION=alerts or SNSOUT_PUBLISHER__KIND=Http
            .merge(Env::prefixed("SNSOUT_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            default_destination: None,
            boot_destination: None,
            boot_failure: BootFailurePolicy::LogAndContinue,
            concurrency: 4,
            queue_capacity: 1000,
            codec: CodecKind::Json,
            publisher: PublisherConfig {
                kind: PublisherKind::Log,
                url: None,
                timeout_ms: 10_000,
                auth_token: None,
            },
        }
    }
}
