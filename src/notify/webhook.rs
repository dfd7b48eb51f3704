use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Message, NotificationSink};
use crate::error::SinkError;
use crate::feeds::http_client;

/// Posts each message as a single embed to a webhook URL.
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: http_client(None), url: url.into() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.http = http_client(Some(timeout)); self }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, message: &Message) -> Result<(), SinkError> {
        let body = json!({ "embeds": [message] });
        let response = self.http.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(title = %message.title, "notification delivered");
        } else {
            warn!(status = status.as_u16(), title = %message.title, "webhook rejected notification");
        }
        Ok(())
    }
}
