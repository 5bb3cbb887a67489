//! Batch filter: picks the records worth processing and the next watermark.
//!
//! A record qualifies when all of the following hold:
//! 1. its conversation matches the target exactly
//! 2. its kind matches the target exactly
//! 3. `timestamp >= cutoff` (inclusive window start)
//! 4. `timestamp > watermark` (not already processed)
//!
//! The new watermark is the maximum qualifying timestamp, so the result does
//! not depend on the order the source delivered the batch in.

use crate::source::MessageRecord;

/// Exact-match keys a record must carry to qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub conversation_id: String,
    pub kind: String,
}

impl FilterCriteria {
    pub fn new(conversation_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            kind: kind.into(),
        }
    }

    fn matches(&self, record: &MessageRecord) -> bool {
        record.conversation_id == self.conversation_id && record.kind == self.kind
    }
}

/// Output of one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Qualifying records, in source order.
    pub qualifying: Vec<MessageRecord>,
    /// Watermark to carry into the next pass. Never below the input watermark.
    pub watermark: i64,
}

/// Start of the recency window: `now - window_secs`.
pub fn window_cutoff(now: i64, window_secs: i64) -> i64 {
    now.saturating_sub(window_secs)
}

/// Whether a single record passes every predicate.
pub fn qualifies(
    record: &MessageRecord,
    watermark: i64,
    cutoff: i64,
    criteria: &FilterCriteria,
) -> bool {
    criteria.matches(record) && record.timestamp >= cutoff && record.timestamp > watermark
}

/// Keep qualifying records and compute the advanced watermark.
pub fn select_and_advance(
    records: Vec<MessageRecord>,
    watermark: i64,
    cutoff: i64,
    criteria: &FilterCriteria,
) -> Selection {
    let qualifying: Vec<MessageRecord> = records
        .into_iter()
        .filter(|r| qualifies(r, watermark, cutoff, criteria))
        .collect();

    let newest = qualifying.iter().map(|r| r.timestamp).max();
    let watermark = newest.map_or(watermark, |ts| ts.max(watermark));

    Selection {
        qualifying,
        watermark,
    }
}
