//! HTTP message source: `GET` with a `{"minutes": N}` JSON body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::config::WatchConfig;
use crate::error::SourceError;
use crate::source::{MessageRecord, MessageSource};

/// Maximum number of body bytes kept in a status error.
const MAX_ERROR_BODY_LEN: usize = 512;

#[derive(Debug, Serialize)]
struct FetchRequest {
    minutes: u32,
}

/// Lists messages from a remote JSON endpoint.
pub struct HttpMessageSource {
    endpoint: Url,
    api_token: Option<SecretString>,
    client: reqwest::Client,
    fetch_timeout: Duration,
}

impl HttpMessageSource {
    /// Build a source with the config's endpoint, token and fetch timeout.
    pub fn new(config: &WatchConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            client,
            fetch_timeout: config.fetch_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                timeout: self.fetch_timeout,
            }
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, window_minutes: u32) -> Result<Vec<MessageRecord>, SourceError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .json(&FetchRequest {
                minutes: window_minutes,
            });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_LEN),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        let records: Vec<MessageRecord> = serde_json::from_slice(&body)?;
        debug!(count = records.len(), bytes = body.len(), "Fetched message list");
        Ok(records)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
