//! Shaping and delivery of outbound notifications.
//!
//! An event flows through the `resolver` (which fields to use), the
//! `assembler` (limits, required destination, typed attributes) and finally
//! a `Publisher`. The `manager` runs that path on a pool of workers.
pub mod assembler;
pub mod logging_publisher;
pub mod manager;
pub mod resolver;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod webhook;

use thiserror::Error;

pub use assembler::{NotificationAssembler, Notifier, MAX_BODY_BYTES, MAX_SUBJECT_BYTES};
pub use resolver::{resolve, MessageSource, ResolvedFields};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("missing destination: the event names none and no default destination is configured")]
    MissingDestination,

    #[error("failed to encode notification body: {0}")]
    Encoding(#[source] anyhow::Error),

    #[error("publisher '{publisher}' failed to deliver to '{destination}': {source}")]
    Dispatch {
        publisher: String,
        destination: String,
        #[source]
        source: anyhow::Error,
    },
}

impl NotificationError {
    /// A short, stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            NotificationError::MissingDestination => "missing_destination",
            NotificationError::Encoding(_) => "encoding",
            NotificationError::Dispatch { .. } => "dispatch",
        }
    }
}
