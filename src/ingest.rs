//! Reading of newline-delimited JSON events into the event queue.

use crate::core::Event;
use anyhow::Result;
use async_channel::Sender;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Parses one line of input into an event.
///
/// # Returns
/// * `Ok(Some(Event))` for a JSON object
/// * `Ok(None)` for a blank line
/// * `Err` if the line is not valid UTF-8 JSON or not an object
pub fn parse_line(line: &[u8]) -> Result<Option<Event>> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(line)?;
    Ok(Some(Event::try_from(value)?))
}

/// How many lines were forwarded and how many were skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub forwarded: usize,
    pub skipped: usize,
}

/// Forwards every event read from `reader` to `event_tx` until end of input.
///
/// Lines are read as raw bytes, so a line that is not UTF-8 is skipped like
/// any other line that is not a JSON object. Returns an error only if
/// reading fails or the queue is closed.
pub async fn forward_events<R>(reader: R, event_tx: Sender<Event>) -> Result<IngestSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = IngestSummary::default();
    let mut lines = reader.split(b'\n');
    let mut line_number = 0usize;

    while let Some(line) = lines.next_segment().await? {
        line_number += 1;
        match parse_line(&line) {
            Ok(Some(event)) => {
                event_tx
                    .send(event)
                    .await
                    .map_err(|e| anyhow::anyhow!("Event queue closed: {}", e))?;
                summary.forwarded += 1;
            }
            Ok(None) => debug!(line = line_number, "Skipping blank line"),
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping malformed event");
                metrics::counter!("events_skipped_total").increment(1);
                summary.skipped += 1;
            }
        }
    }

    info!(
        forwarded = summary.forwarded,
        skipped = summary.skipped,
        "End of input reached."
    );
    Ok(summary)
}
