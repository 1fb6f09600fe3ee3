//! Supabase store client (PostgREST API).
//!
//! Talks directly to the project's REST endpoint. Counts are aggregate
//! queries with `Prefer: count=exact`; the count comes back in the
//! `content-range` response header (`0-24/3573`).
//!
//! Tables expected in the project:
//! - `users(id, telegram_id unique, username, first_seen, last_seen)`
//! - `downloads(id, telegram_id, url, success, created_at)`

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::{Stats, StorageError, UserStats};
use crate::config::StoreConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for one Supabase project.
pub struct SupabaseClient {
    /// Shared HTTP client.
    http: reqwest::Client,

    /// PostgREST base URL, `<project>/rest/v1`.
    rest_url: String,

    /// Project API key; sent as both `apikey` and bearer token.
    key: String,
}

impl SupabaseClient {
    /// Creates a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            rest_url: config.rest_url(),
            key: config.key.clone(),
        })
    }

    /// Tests the connection by counting the `users` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the key.
    pub async fn probe(&self) -> Result<(), StorageError> {
        self.count("users?select=count").await.map(|_| ())
    }

    /// Upserts one user row keyed on `telegram_id`, refreshing `last_seen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn upsert_user(&self, chat_id: i64, username: &str) -> Result<(), StorageError> {
        let response = self
            .http
            .post(format!("{}/users", self.rest_url))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({
                "telegram_id": chat_id,
                "username": username,
                "last_seen": Utc::now().to_rfc3339(),
            }))
            .send()
            .await?;

        check_status(&response)
    }

    /// Appends one download row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn record_download(
        &self,
        chat_id: i64,
        url: &str,
        success: bool,
    ) -> Result<(), StorageError> {
        let response = self
            .http
            .post(format!("{}/downloads", self.rest_url))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(&json!({
                "telegram_id": chat_id,
                "url": url,
                "success": success,
                "created_at": Utc::now().to_rfc3339(),
            }))
            .send()
            .await?;

        check_status(&response)
    }

    /// Service-wide aggregate counters via four count queries.
    ///
    /// # Errors
    ///
    /// Returns an error if any count query fails.
    pub async fn get_stats(&self) -> Result<Stats, StorageError> {
        let today = Utc::now().date_naive();

        let users = self.count("users?select=count").await?;
        let downloads = self.count("downloads?select=count").await?;
        let successful = self.count("downloads?success=eq.true&select=count").await?;
        let today_count = self
            .count(&format!("downloads?created_at=gte.{today}&select=count"))
            .await?;

        Ok(Stats {
            users,
            downloads,
            successful,
            today: today_count,
        })
    }

    /// Aggregate counters for one chat identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if any count query fails.
    pub async fn get_user_stats(&self, chat_id: i64) -> Result<UserStats, StorageError> {
        let today = Utc::now().date_naive();

        let downloads = self
            .count(&format!("downloads?telegram_id=eq.{chat_id}&select=count"))
            .await?;
        let successful = self
            .count(&format!(
                "downloads?telegram_id=eq.{chat_id}&success=eq.true&select=count"
            ))
            .await?;
        let today_count = self
            .count(&format!(
                "downloads?telegram_id=eq.{chat_id}&created_at=gte.{today}&select=count"
            ))
            .await?;

        Ok(UserStats {
            downloads,
            successful,
            failed: downloads - successful,
            today: today_count,
        })
    }

    /// Runs one count query and parses the `content-range` header.
    async fn count(&self, query: &str) -> Result<i64, StorageError> {
        debug!("Store count query: {}", query);

        let response = self
            .http
            .get(format!("{}/{query}", self.rest_url))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        check_status(&response)?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or(StorageError::MissingCount)
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(StorageError::Status(status.as_u16()))
    }
}

/// Parses the total out of a PostgREST `content-range` header value.
fn parse_content_range(value: &str) -> Option<i64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-0/1"), Some(1));
    }

    #[test]
    fn test_parse_content_range_invalid() {
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
        assert_eq!(parse_content_range(""), None);
    }
}
