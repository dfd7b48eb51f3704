//! Notifications: one message per new feed item
//!
//! ```text
//! Notice (transfer | quest) ──► Renderer ──► Message ──► NotificationSink
//!                                                          └── WebhookSink (POST embeds)
//! ```
//!
//! Delivery is fire-and-forget: a sink reports transport failures only and
//! never retries.

mod render;
mod webhook;

pub use render::{format_amount, format_timestamp, Notice, Renderer};
pub use webhook::WebhookSink;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SinkError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

/// A structured message, serialized as one webhook embed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub title: String,
    pub color: u32,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

impl Message {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self { title: title.into(), color, fields: Vec::new(), footer: None, timestamp: None, thumbnail: None }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field { name: name.into(), value: value.into(), inline });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self { self.footer = Some(Footer { text: text.into() }); self }
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self { self.timestamp = Some(at); self }
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self { self.thumbnail = Some(Thumbnail { url: url.into() }); self }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, message: &Message) -> Result<(), SinkError>;
}
