//! Processors: downstream consumers of qualifying records.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use tracing::info;

use crate::error::ProcessorError;
use crate::source::MessageRecord;

/// Consumes one qualifying record at a time.
///
/// Called once per record, in the order the filter returned them. A failure
/// is reported by the caller and never stops sibling records.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Processor name for logging.
    fn name(&self) -> &str;

    async fn consume(&self, record: &MessageRecord) -> Result<(), ProcessorError>;
}

/// Writes each record to the log as a timestamp line plus a JSON dump.
#[derive(Debug, Default)]
pub struct LogProcessor;

impl LogProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for LogProcessor {
    fn name(&self) -> &str {
        "log"
    }

    async fn consume(&self, record: &MessageRecord) -> Result<(), ProcessorError> {
        let dump = render_record(record)?;
        info!(
            message_id = %record.message_id,
            timestamp = %format_timestamp(record.timestamp),
            "Processing message"
        );
        info!("Filtered message data:\n{dump}");
        Ok(())
    }
}

/// Pretty-printed JSON for a record.
pub fn render_record(record: &MessageRecord) -> Result<String, ProcessorError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// RFC 3339 rendering of an epoch timestamp, raw seconds if out of range.
pub fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ts.to_string())
}
