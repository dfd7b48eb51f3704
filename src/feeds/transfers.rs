use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{check_status, http_client, FeedSource};
use crate::core::paths::{defaults, endpoints, loops};
use crate::error::FeedError;
use crate::model::{decode_page, TransferEvent};

/// ERC-20 transfer history for one wallet from the Moralis deep index.
pub struct MoralisTransferFeed {
    http: reqwest::Client,
    base_url: String,
    address: String,
    api_key: String,
    chain: String,
    limit: u32,
}

#[derive(Deserialize)]
struct TransferPage {
    #[serde(default)]
    result: Option<Vec<Value>>,
}

impl MoralisTransferFeed {
    pub fn new(address: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: http_client(None),
            base_url: endpoints::TRANSFERS_BASE.to_string(),
            address: address.into(),
            api_key: api_key.into(),
            chain: defaults::CHAIN.to_string(),
            limit: defaults::PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self { self.chain = chain.into(); self }
    pub fn with_limit(mut self, limit: u32) -> Self { self.limit = limit; self }
    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.http = http_client(Some(timeout)); self }

    fn url(&self) -> String {
        format!("{}/{}/erc20/transfers", self.base_url, self.address)
    }
}

#[async_trait]
impl FeedSource for MoralisTransferFeed {
    type Item = TransferEvent;

    fn name(&self) -> &str { loops::TRANSFERS }

    async fn fetch(&self) -> Result<Vec<TransferEvent>, FeedError> {
        let response = self
            .http
            .get(self.url())
            .header(endpoints::API_KEY_HEADER, &self.api_key)
            .query(&[("chain", self.chain.as_str()), ("order", "DESC")])
            .query(&[("limit", self.limit)])
            .send()
            .await?;
        let page: TransferPage = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        let records = page.result.unwrap_or_default();
        debug!(records = records.len(), chain = %self.chain, "fetched transfer page");
        Ok(decode_page(records, loops::TRANSFERS))
    }
}
