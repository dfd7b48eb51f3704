//! Error types, one per failure class
//!
//! A cycle failure is always one of three things: the feed could not be
//! read, the sink could not be reached, or the cursor could not be written.
//! [`CycleError::kind`] exposes that class for logs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("feed returned API code {code}")]
    Api { code: i64 },
    #[error("feed payload could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("webhook delivery failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cursor state could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FeedError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Persist(#[from] CursorError),
}

impl CycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Sink(_) => "sink",
            CycleError::Persist(_) => "persist",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}
