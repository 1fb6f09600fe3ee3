//! Per-chat download cooldown.
//!
//! Enforces a minimum interval between downloads for each chat so a
//! single user cannot monopolize the extraction backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Tracks the last download time per chat and enforces a minimum interval.
#[derive(Debug)]
pub struct Cooldown {
    /// Minimum duration between downloads for one chat.
    min_interval: Duration,

    /// Last download time per chat identifier.
    last_download: Mutex<HashMap<i64, Instant>>,
}

impl Cooldown {
    /// Creates a new cooldown with the specified minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_download: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a cooldown from seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Admits the chat and records the download time, or returns the
    /// remaining wait when the chat is still inside the window.
    pub async fn try_acquire(&self, chat_id: i64) -> Result<(), Duration> {
        let mut last = self.last_download.lock().await;

        if let Some(last_time) = last.get(&chat_id) {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!(
                    "Chat {} is on cooldown for another {:?}",
                    chat_id, remaining
                );
                return Err(remaining);
            }
        }

        last.insert(chat_id, Instant::now());
        Ok(())
    }

    /// Returns the time remaining until the chat is admitted again.
    pub async fn time_until_allowed(&self, chat_id: i64) -> Duration {
        let last = self.last_download.lock().await;
        match last.get(&chat_id) {
            Some(last_time) => {
                let elapsed = last_time.elapsed();
                if elapsed >= self.min_interval {
                    Duration::ZERO
                } else {
                    self.min_interval - elapsed
                }
            }
            None => Duration::ZERO,
        }
    }

    /// Clears the cooldown for a chat, admitting it immediately.
    pub async fn reset(&self, chat_id: i64) {
        let mut last = self.last_download.lock().await;
        last.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_download_admitted() {
        let cooldown = Cooldown::from_secs(15);
        assert!(cooldown.try_acquire(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_download_blocked() {
        let cooldown = Cooldown::new(Duration::from_millis(200));

        assert!(cooldown.try_acquire(1).await.is_ok());

        let remaining = cooldown.try_acquire(1).await.unwrap_err();
        assert!(remaining > Duration::ZERO);
        assert!(cooldown.time_until_allowed(1).await > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_chats_tracked_independently() {
        let cooldown = Cooldown::from_secs(60);

        assert!(cooldown.try_acquire(1).await.is_ok());
        assert!(cooldown.try_acquire(2).await.is_ok());
        assert!(cooldown.try_acquire(1).await.is_err());
    }

    #[tokio::test]
    async fn test_admitted_after_window() {
        let cooldown = Cooldown::new(Duration::from_millis(20));

        assert!(cooldown.try_acquire(1).await.is_ok());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cooldown.try_acquire(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset() {
        let cooldown = Cooldown::from_secs(60);

        assert!(cooldown.try_acquire(1).await.is_ok());
        assert!(cooldown.try_acquire(1).await.is_err());

        cooldown.reset(1).await;
        assert!(cooldown.try_acquire(1).await.is_ok());
    }
}
