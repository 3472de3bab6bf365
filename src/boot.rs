//! One-shot boot notification used to surface configuration and credential
//! problems as soon as the service starts.

use crate::notification::{NotificationAssembler, NotificationError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Subject and body of the boot notification.
pub const BOOT_MESSAGE: &str = "service booted";

/// What to do when the boot notification cannot be published.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootFailurePolicy {
    /// Log the failure and keep running.
    #[default]
    LogAndContinue,
    /// Return the failure to the caller, which is expected to stop.
    Abort,
}

pub struct BootProbe {
    destination: Option<String>,
    on_failure: BootFailurePolicy,
}

impl BootProbe {
    pub fn new(destination: Option<String>, on_failure: BootFailurePolicy) -> Self {
        Self {
            destination,
            on_failure,
        }
    }

    /// Publishes the boot notification if a boot destination is configured.
    ///
    /// Returns an error only under `BootFailurePolicy::Abort`.
    pub async fn run(&self, assembler: &NotificationAssembler) -> Result<(), NotificationError> {
        let Some(destination) = self.destination.as_deref() else {
            return Ok(());
        };

        let outcome = match NotificationAssembler::assemble(
            Some(destination),
            BOOT_MESSAGE,
            BOOT_MESSAGE,
            None,
        ) {
            Ok(request) => assembler.publish(request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!(destination, "Boot notification published.");
                Ok(())
            }
            Err(e) => match self.on_failure {
                BootFailurePolicy::LogAndContinue => {
                    error!(destination, error = %e, "Boot notification failed; continuing.");
                    Ok(())
                }
                BootFailurePolicy::Abort => Err(e),
            },
        }
    }
}
