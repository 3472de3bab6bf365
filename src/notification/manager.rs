//! The notification manager runs a fixed pool of workers that take events off
//! a shared queue and publish one notification per event.

use crate::core::Event;
use crate::notification::{NotificationError, Notifier};
use async_channel::Receiver;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Counts of how the events handled by the manager turned out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySummary {
    pub published: usize,
    pub missing_destination: usize,
    pub failed: usize,
}

impl DeliverySummary {
    fn record(&mut self, outcome: &Result<(), NotificationError>) {
        match outcome {
            Ok(()) => self.published += 1,
            Err(NotificationError::MissingDestination) => self.missing_destination += 1,
            Err(_) => self.failed += 1,
        }
    }

    fn merge(&mut self, other: DeliverySummary) {
        self.published += other.published;
        self.missing_destination += other.missing_destination;
        self.failed += other.failed;
    }
}

/// The `NotificationManager` actor.
pub struct NotificationManager {
    notifier: Arc<Notifier>,
    event_rx: Receiver<Event>,
    concurrency: usize,
}

impl NotificationManager {
    /// Creates a new `NotificationManager`. At least one worker always runs.
    pub fn new(notifier: Arc<Notifier>, event_rx: Receiver<Event>, concurrency: usize) -> Self {
        Self {
            notifier,
            event_rx,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the workers until the event queue is closed and drained.
    pub async fn run(self) -> DeliverySummary {
        info!(workers = self.concurrency, "NotificationManager started.");
        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            let notifier = self.notifier.clone();
            let event_rx = self.event_rx.clone();
            workers.spawn(run_worker(id, notifier, event_rx));
        }

        let mut summary = DeliverySummary::default();
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(worker_summary) => summary.merge(worker_summary),
                Err(e) => warn!(error = %e, "Notification worker terminated abnormally"),
            }
        }
        info!(
            published = summary.published,
            missing_destination = summary.missing_destination,
            failed = summary.failed,
            "Event queue closed. NotificationManager shut down."
        );
        summary
    }
}

async fn run_worker(id: usize, notifier: Arc<Notifier>, event_rx: Receiver<Event>) -> DeliverySummary {
    let mut summary = DeliverySummary::default();
    while let Ok(event) = event_rx.recv().await {
        let outcome = notifier.handle(&event).await;
        if let Err(e) = &outcome {
            warn!(worker = id, error = %e, "Event not delivered");
        }
        summary.record(&outcome);
    }
    debug!(worker = id, "Notification worker exiting.");
    summary
}
