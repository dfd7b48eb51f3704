//! Feed snapshot sources
//!
//! A source returns the current page of a feed, most recent first, or fails.
//! Sources hold no state between calls; deduplication is the reconciler's job.

mod quests;
mod transfers;

pub use quests::{QuestApiFeed, QuestEnvelope, QuestResult};
pub use transfers::MoralisTransferFeed;

use async_trait::async_trait;
use std::time::Duration;

use crate::core::paths::defaults;
use crate::error::FeedError;

#[async_trait]
pub trait FeedSource: Send + Sync {
    type Item: Send;

    /// Feed name for logs
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Self::Item>, FeedError>;
}

pub(crate) fn http_client(timeout: Option<Duration>) -> reqwest::Client {
    let timeout = timeout.unwrap_or(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS));
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("feedwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Turn a non-2xx answer into [`FeedError::Status`], keeping a bounded body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    body.truncate(body.char_indices().nth(512).map_or(body.len(), |(i, _)| i));
    Err(FeedError::Status { status: status.as_u16(), body })
}
