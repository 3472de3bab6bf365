use crate::core::{NotificationRequest, Publisher};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Fake publisher for testing. Records every request it is asked to publish.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<NotificationRequest>>>,
    // Queued failures; the front of the queue is the next publish outcome.
    failures: Arc<Mutex<VecDeque<String>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next publish call fail with `error`.
    pub fn fail_next(&self, error: &str) {
        self.failures.lock().unwrap().push_back(error.to_string());
    }

    /// The requests published so far, in order.
    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, request: &NotificationRequest) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            anyhow::bail!(error);
        }
        Ok(())
    }
}
