use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{check_status, http_client, FeedSource};
use crate::core::paths::{endpoints, loops};
use crate::error::FeedError;
use crate::model::{decode_page, QuestEvent};

/// Quest listing, one fixed page per fetch.
pub struct QuestApiFeed {
    http: reqwest::Client,
    url: String,
}

/// `{ "code": n, "result": { "items": [...] } }`
#[derive(Debug, Deserialize)]
pub struct QuestEnvelope {
    pub code: i64,
    #[serde(default)]
    pub result: Option<QuestResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestResult {
    #[serde(default)]
    pub items: Option<Vec<Value>>,
}

impl QuestEnvelope {
    /// Codes 0 and 200 both mean success on this API.
    pub fn is_success(&self) -> bool {
        self.code == 0 || self.code == 200
    }

    pub fn into_items(self) -> Result<Vec<Value>, FeedError> {
        if !self.is_success() {
            return Err(FeedError::Api { code: self.code });
        }
        Ok(self.result.and_then(|r| r.items).unwrap_or_default())
    }
}

impl Default for QuestApiFeed {
    fn default() -> Self { Self::new(endpoints::QUESTS) }
}

impl QuestApiFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: http_client(None), url: url.into() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.http = http_client(Some(timeout)); self }
}

#[async_trait]
impl FeedSource for QuestApiFeed {
    type Item = QuestEvent;

    fn name(&self) -> &str { loops::QUESTS }

    async fn fetch(&self) -> Result<Vec<QuestEvent>, FeedError> {
        let response = self.http.get(&self.url).send().await?;
        let envelope: QuestEnvelope = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        let items = envelope.into_items()?;
        debug!(items = items.len(), "fetched quest page");
        Ok(decode_page(items, loops::QUESTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_codes() {
        let ok: QuestEnvelope = serde_json::from_value(json!({"code": 200, "result": {"items": [{"id": 1}]}})).unwrap();
        assert_eq!(ok.into_items().unwrap().len(), 1);

        let zero: QuestEnvelope = serde_json::from_value(json!({"code": 0})).unwrap();
        assert!(zero.into_items().unwrap().is_empty());

        let err: QuestEnvelope = serde_json::from_value(json!({"code": 429, "message": "slow down"})).unwrap();
        assert!(matches!(err.into_items(), Err(FeedError::Api { code: 429 })));
    }
}
