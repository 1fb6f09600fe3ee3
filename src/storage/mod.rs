//! Persistence module.
//!
//! Tracks users and download attempts. Writes go to the Supabase store
//! when one is configured and are always mirrored into the in-memory
//! fallback; reads prefer the store and fall back to the mirror, so stats
//! stay available even when the store is down or unconfigured.

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseClient;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{MAX_STORED_URL_LEN, StoreConfig};

/// Errors that can occur talking to the Supabase store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned HTTP {0}")]
    Status(u16),

    #[error("Store response missing a usable count")]
    MissingCount,
}

/// Service-wide aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Total tracked users.
    pub users: i64,

    /// Total download attempts.
    pub downloads: i64,

    /// Successful download attempts.
    pub successful: i64,

    /// Download attempts made on the current UTC calendar day.
    pub today: i64,
}

/// Aggregate counters for a single chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Total download attempts by this chat.
    pub downloads: i64,

    /// Successful attempts.
    pub successful: i64,

    /// Failed attempts.
    pub failed: i64,

    /// Attempts made on the current UTC calendar day.
    pub today: i64,
}

/// Persistence facade over the Supabase store and the in-memory mirror.
#[derive(Debug)]
pub struct Database {
    /// REST client, present when a store is configured.
    remote: Option<SupabaseClient>,

    /// Set once the configured store answered the startup probe.
    connected: AtomicBool,

    /// In-memory mirror, always written.
    memory: MemoryStore,
}

impl Database {
    /// Creates the persistence layer from the optional store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store HTTP client cannot be built.
    pub fn new(config: Option<&StoreConfig>) -> Result<Self, StorageError> {
        let remote = config.map(SupabaseClient::new).transpose()?;

        Ok(Self {
            remote,
            connected: AtomicBool::new(false),
            memory: MemoryStore::new(),
        })
    }

    /// Probes the configured store and records whether it is reachable.
    ///
    /// Never fails: an unreachable store just leaves the service on the
    /// in-memory fallback.
    pub async fn initialize(&self) {
        if let Some(remote) = &self.remote {
            match remote.probe().await {
                Ok(()) => {
                    self.connected.store(true, Ordering::Release);
                    info!("Connected to Supabase (REST API)");
                    return;
                }
                Err(e) => {
                    warn!("Supabase connection test failed: {}", e);
                }
            }
        }

        info!("Using in-memory storage");
    }

    /// Whether the configured store answered the startup probe.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Inserts the user if absent, else updates the last-seen timestamp.
    pub async fn upsert_user(&self, chat_id: i64, username: &str) {
        if self.is_connected()
            && let Some(remote) = &self.remote
            && let Err(e) = remote.upsert_user(chat_id, username).await
        {
            warn!("Error tracking user {}: {}", chat_id, e);
        }

        self.memory.upsert_user(chat_id).await;
    }

    /// Appends one download record, truncating the URL before persisting.
    pub async fn record_download(&self, chat_id: i64, url: &str, success: bool) {
        let url = truncate_url(url);

        if self.is_connected()
            && let Some(remote) = &self.remote
            && let Err(e) = remote.record_download(chat_id, url, success).await
        {
            warn!("Error tracking download for {}: {}", chat_id, e);
        }

        self.memory.record_download(chat_id, success).await;
    }

    /// Returns the service-wide aggregate counters.
    ///
    /// Prefers the store; falls back to the in-memory mirror when the
    /// store is unconfigured, unreachable, or the query fails.
    pub async fn get_stats(&self) -> Stats {
        if self.is_connected()
            && let Some(remote) = &self.remote
        {
            match remote.get_stats().await {
                Ok(stats) => return stats,
                Err(e) => warn!("Error getting stats from Supabase: {}", e),
            }
        }

        self.memory.stats().await
    }

    /// Returns the aggregate counters for one chat.
    pub async fn get_user_stats(&self, chat_id: i64) -> UserStats {
        if self.is_connected()
            && let Some(remote) = &self.remote
        {
            match remote.get_user_stats(chat_id).await {
                Ok(stats) => return stats,
                Err(e) => warn!("Error getting user stats from Supabase: {}", e),
            }
        }

        self.memory.user_stats(chat_id).await
    }
}

/// Truncates a URL to the persisted column width on a char boundary.
fn truncate_url(url: &str) -> &str {
    match url.char_indices().nth(MAX_STORED_URL_LEN) {
        Some((idx, _)) => &url[..idx],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_json_shape() {
        let stats = Stats {
            users: 3,
            downloads: 10,
            successful: 8,
            today: 2,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"users": 3, "downloads": 10, "successful": 8, "today": 2})
        );
    }

    #[test]
    fn test_truncate_url() {
        let short = "https://www.tiktok.com/@user/video/1";
        assert_eq!(truncate_url(short), short);

        let long = format!("https://www.tiktok.com/?q={}", "a".repeat(600));
        assert_eq!(truncate_url(&long).chars().count(), MAX_STORED_URL_LEN);
    }

    #[tokio::test]
    async fn test_unconfigured_database_uses_memory() {
        let db = Database::new(None).unwrap();
        db.initialize().await;
        assert!(!db.is_connected());

        db.upsert_user(1, "ada").await;
        db.record_download(1, "https://www.tiktok.com/@a/video/1", true).await;

        let stats = db.get_stats().await;
        assert_eq!(stats.users, 1);
        assert_eq!(stats.downloads, 1);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.today, 1);
    }
}
