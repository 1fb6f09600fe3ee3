//! In-memory fallback store.
//!
//! Process-local counters used when no Supabase store is configured (or a
//! store query fails). Lost on restart.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{Stats, UserStats};

/// One recorded download attempt.
#[derive(Debug, Clone)]
struct DownloadRow {
    chat_id: i64,
    success: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashSet<i64>,
    downloads: Vec<DownloadRow>,
}

/// Process-local counter store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the user; repeated calls for one chat keep a single entry.
    pub async fn upsert_user(&self, chat_id: i64) {
        let mut state = self.inner.write().await;
        state.users.insert(chat_id);
    }

    /// Appends one download attempt stamped with the current time.
    pub async fn record_download(&self, chat_id: i64, success: bool) {
        self.record_download_at(chat_id, success, Utc::now()).await;
    }

    /// Appends one download attempt with an explicit timestamp.
    pub async fn record_download_at(
        &self,
        chat_id: i64,
        success: bool,
        created_at: DateTime<Utc>,
    ) {
        let mut state = self.inner.write().await;
        state.downloads.push(DownloadRow {
            chat_id,
            success,
            created_at,
        });
    }

    /// Service-wide counters as of now.
    pub async fn stats(&self) -> Stats {
        self.stats_at(Utc::now().date_naive()).await
    }

    /// Service-wide counters for an explicit "today".
    pub async fn stats_at(&self, today: NaiveDate) -> Stats {
        let state = self.inner.read().await;

        let successful = state.downloads.iter().filter(|d| d.success).count();
        let today_count = state
            .downloads
            .iter()
            .filter(|d| d.created_at.date_naive() == today)
            .count();

        Stats {
            users: to_count(state.users.len()),
            downloads: to_count(state.downloads.len()),
            successful: to_count(successful),
            today: to_count(today_count),
        }
    }

    /// Per-chat counters as of now.
    pub async fn user_stats(&self, chat_id: i64) -> UserStats {
        self.user_stats_at(chat_id, Utc::now().date_naive()).await
    }

    /// Per-chat counters for an explicit "today".
    pub async fn user_stats_at(&self, chat_id: i64, today: NaiveDate) -> UserStats {
        let state = self.inner.read().await;

        let rows: Vec<&DownloadRow> = state
            .downloads
            .iter()
            .filter(|d| d.chat_id == chat_id)
            .collect();

        let successful = rows.iter().filter(|d| d.success).count();
        let today_count = rows
            .iter()
            .filter(|d| d.created_at.date_naive() == today)
            .count();

        UserStats {
            downloads: to_count(rows.len()),
            successful: to_count(successful),
            failed: to_count(rows.len() - successful),
            today: to_count(today_count),
        }
    }
}

fn to_count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[tokio::test]
    async fn test_upsert_user_is_idempotent() {
        let store = MemoryStore::new();

        store.upsert_user(1).await;
        store.upsert_user(1).await;
        store.upsert_user(2).await;

        let stats = store.stats().await;
        assert_eq!(stats.users, 2);
    }

    #[tokio::test]
    async fn test_record_download_appends_one_row_each() {
        let store = MemoryStore::new();

        store.record_download(1, true).await;
        store.record_download(1, false).await;
        store.record_download(2, false).await;

        let stats = store.stats().await;
        assert_eq!(stats.downloads, 3);
        assert_eq!(stats.successful, 1);
    }

    #[tokio::test]
    async fn test_today_boundary_at_midnight() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        // 23:59:59 the previous day
        let before_midnight = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 59).unwrap();
        // 00:00:00 on the day itself
        let at_midnight = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let later_today = Utc.with_ymd_and_hms(2024, 6, 15, 18, 30, 0).unwrap();

        store.record_download_at(1, true, before_midnight).await;
        store.record_download_at(1, true, at_midnight).await;
        store.record_download_at(1, false, later_today).await;

        let stats = store.stats_at(today).await;
        assert_eq!(stats.downloads, 3);
        assert_eq!(stats.today, 2);
    }

    #[tokio::test]
    async fn test_user_stats_filters_by_chat() {
        let store = MemoryStore::new();

        store.record_download(1, true).await;
        store.record_download(1, false).await;
        store.record_download(2, true).await;

        let stats = store.user_stats(1).await;
        assert_eq!(stats.downloads, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.today, 2);
    }

    #[tokio::test]
    async fn test_empty_store_is_all_zero() {
        let store = MemoryStore::new();

        let stats = store.stats().await;
        assert_eq!(stats.users, 0);
        assert_eq!(stats.downloads, 0);
        assert_eq!(stats.successful, 0);
        assert_eq!(stats.today, 0);

        let user_stats = store.user_stats(7).await;
        assert_eq!(user_stats.downloads, 0);
        assert_eq!(user_stats.failed, 0);
    }
}
