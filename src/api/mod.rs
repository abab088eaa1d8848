//! The reader server's HTTP API, as consumed by the client.
//!
//! The item core only ever talks to [`ItemsApi`]; the `reqwest` implementation
//! lives in [`ApiClient`] together with the session/login endpoints that only
//! the binary uses.

mod client;
mod pending;

pub use client::{ApiClient, AUTH_FAILURE_MARKER};
pub use pending::{PendingGuard, PendingRequests};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned item identifier.
pub type ItemId = i64;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: status {status}: {body}")]
    Http { status: u16, body: String },

    /// The server rejected the session; it has already been cleared locally.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] crate::session::SessionError),
}

impl ApiError {
    /// Short form suitable for the status bar.
    pub fn status_text(&self) -> String {
        match self {
            ApiError::Http { status, body } if !body.trim().is_empty() => {
                format!("{} ({})", body.trim(), status)
            }
            other => other.to_string(),
        }
    }
}

/// One item as served by `GET /api/items/unread` and `/api/items/archived`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub feed_name: String,
    /// Unix seconds.
    pub publication_time: i64,
}

/// One subscription as served by `GET /api/feeds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub feed_id: i64,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub last_fetch_time: Option<i64>,
    #[serde(default)]
    pub last_failure: Option<String>,
    #[serde(default)]
    pub last_failure_time: Option<i64>,
    #[serde(default)]
    pub failure_count: Option<i64>,
    #[serde(default)]
    pub item_count: Option<i64>,
    #[serde(default)]
    pub last_publication_time: Option<i64>,
}

/// Item endpoints the navigation core depends on.
///
/// `Send + Sync` so implementations can be shared with spawned tasks behind an
/// `Arc`.
#[async_trait]
pub trait ItemsApi: Send + Sync {
    async fn get_unread_items(&self) -> Result<Vec<ItemRecord>, ApiError>;

    async fn get_archived_items(&self) -> Result<Vec<ItemRecord>, ApiError>;

    async fn mark_item_read(&self, id: ItemId) -> Result<(), ApiError>;

    async fn mark_all_read(&self, ids: &[ItemId]) -> Result<(), ApiError>;
}
