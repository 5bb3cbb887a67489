//! Error types for chatwatch.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Processor error: {0}")]
    Processor(#[from] ProcessorError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures fetching a batch from the message source.
///
/// Every variant skips the current cycle; the next tick is the retry.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request failed: {reason}")]
    Request { reason: String },

    #[error("Fetch timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode message list: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SourceError {
    /// True when the response arrived but did not parse into records.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request {
            reason: error_chain(&e),
        }
    }
}

/// Render an error and every `source()` below it, joined by `": "`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        cause = inner.source();
    }
    out
}

/// Failures handing a single record to the processor.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record {message_id} rejected: {reason}")]
    Rejected { message_id: String, reason: String },
}

/// Result type alias for chatwatch.
pub type Result<T> = std::result::Result<T, Error>;
