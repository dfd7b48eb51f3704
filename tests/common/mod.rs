//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use feedwatch::{FeedError, FeedSource, Message, NotificationSink, QuestEvent, SinkError, TransferEvent};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const WATCHED: &str = "0xwatched";

/// Feed that serves whatever page it was last given.
pub struct ScriptedFeed<T> {
    page: Mutex<Result<Vec<T>, u16>>,
    calls: AtomicUsize,
}

impl<T: Clone> ScriptedFeed<T> {
    pub fn new(page: Vec<T>) -> Self {
        Self { page: Mutex::new(Ok(page)), calls: AtomicUsize::new(0) }
    }

    pub fn set_page(&self, page: Vec<T>) {
        *self.page.lock().unwrap() = Ok(page);
    }

    /// Subsequent fetches fail with this HTTP status.
    pub fn fail_with(&self, status: u16) {
        *self.page.lock().unwrap() = Err(status);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> FeedSource for ScriptedFeed<T> {
    type Item = T;

    fn name(&self) -> &str { "scripted" }

    async fn fetch(&self) -> Result<Vec<T>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.page.lock().unwrap() {
            Ok(page) => Ok(page.clone()),
            Err(status) => Err(FeedError::Status { status: *status, body: "scripted failure".into() }),
        }
    }
}

/// Sink that records every message and can be told to fail after `n` deliveries.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Message>>,
    fail_after: Mutex<Option<usize>>,
}

impl RecordingSink {
    pub fn failing_after(n: usize) -> Self {
        Self { delivered: Mutex::new(Vec::new()), fail_after: Mutex::new(Some(n)) }
    }

    pub fn heal(&self) {
        *self.fail_after.lock().unwrap() = None;
    }

    pub fn titles(&self) -> Vec<String> {
        self.delivered.lock().unwrap().iter().map(|m| m.title.clone()).collect()
    }

    /// The `Tx Hash` field of each delivered transfer message, in order.
    pub fn hashes(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m.field_value("Tx Hash"))
            .filter_map(|v| v.rsplit('/').next())
            .map(|h| h.trim_end_matches(')').to_string())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &Message) -> Result<(), SinkError> {
        let limit = *self.fail_after.lock().unwrap();
        let refused = limit.is_some_and(|n| self.count() >= n);
        if refused {
            return Err(transport_error().await);
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A real transport error, produced without touching the network.
pub async fn transport_error() -> SinkError {
    match reqwest::Client::new().post("not a url").send().await {
        Err(e) => SinkError::Transport(e),
        Ok(_) => panic!("request to an invalid URL succeeded"),
    }
}

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

pub fn transfer(hash: &str, minute: u32) -> TransferEvent {
    TransferEvent {
        hash: hash.to_string(),
        token_symbol: "RON".into(),
        from: "0xsender".into(),
        to: WATCHED.into(),
        verified: true,
        amount: 1.5,
        timestamp: at(minute),
    }
}

pub fn quest(id: &str, name: &str) -> QuestEvent {
    serde_json::from_value(json!({ "id": id, "name": name })).unwrap()
}
