//! Message sources: where each poll cycle's batch comes from.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::SourceError;

pub use http::HttpMessageSource;
pub use types::MessageRecord;

/// Anything that can list recent messages.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch up to `window_minutes` of history.
    ///
    /// Ordering of the returned batch is not guaranteed.
    async fn fetch(&self, window_minutes: u32) -> Result<Vec<MessageRecord>, SourceError>;
}
