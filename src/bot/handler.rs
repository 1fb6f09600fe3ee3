//! Inbound update handler.
//!
//! One handler instance processes every webhook update. Each update is
//! independent: no queueing, no retries; a downloader failure becomes a
//! plain-text reply and one failed download record.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::commands::{
    BotCommand, cooldown_text, download_failed_text, invalid_link_text, user_stats_text,
    video_caption, welcome_text,
};
use crate::downloader::SsstikClient;
use crate::storage::Database;
use crate::telegram::{BotApi, Cooldown, Message, TgUser, Update};

/// Routes webhook updates to command handling or the download flow.
pub struct UpdateHandler {
    /// Bot API client for outbound calls.
    api: Arc<BotApi>,

    /// Video extraction collaborator.
    downloader: Arc<SsstikClient>,

    /// Persistence layer.
    db: Arc<Database>,

    /// Per-chat download cooldown.
    cooldown: Cooldown,

    /// Cooldown length, echoed in the help text.
    cooldown_secs: u64,
}

impl UpdateHandler {
    /// Creates a new update handler.
    #[must_use]
    pub fn new(
        api: Arc<BotApi>,
        downloader: Arc<SsstikClient>,
        db: Arc<Database>,
        cooldown_secs: u64,
    ) -> Self {
        Self {
            api,
            downloader,
            db,
            cooldown: Cooldown::from_secs(cooldown_secs),
            cooldown_secs,
        }
    }

    /// Processes one inbound update.
    ///
    /// Updates without a text message from an identifiable sender are
    /// ignored.
    pub async fn process_update(&self, update: Update) {
        let Some(message) = update.message else {
            debug!("Ignoring update {} without a message", update.update_id);
            return;
        };

        let Some(user) = message.from.clone() else {
            debug!("Ignoring message {} without a sender", message.message_id);
            return;
        };

        let Some(text) = message.text_trimmed().map(str::to_owned) else {
            debug!("Ignoring non-text message {}", message.message_id);
            return;
        };

        self.db.upsert_user(message.chat.id, user.display_name()).await;

        if let Some(command) = BotCommand::parse(&text) {
            self.handle_command(command, &message, &user).await;
        } else if is_tiktok_url(&text) {
            self.handle_download(&message, &text).await;
        } else {
            self.reply(message.chat.id, &invalid_link_text()).await;
        }
    }

    /// Answers a recognized command.
    async fn handle_command(&self, command: BotCommand, message: &Message, user: &TgUser) {
        debug!("Handling command /{} from chat {}", command, message.chat.id);

        let text = match command {
            BotCommand::Start | BotCommand::Help => {
                welcome_text(&user.first_name, self.cooldown_secs)
            }
            BotCommand::Stats => {
                let stats = self.db.get_user_stats(message.chat.id).await;
                user_stats_text(&stats)
            }
        };

        self.reply(message.chat.id, &text).await;
    }

    /// Runs the download flow for a TikTok link.
    async fn handle_download(&self, message: &Message, url: &str) {
        let chat_id = message.chat.id;

        if let Err(remaining) = self.cooldown.try_acquire(chat_id).await {
            self.reply(chat_id, &cooldown_text(remaining.as_secs().max(1)))
                .await;
            return;
        }

        // The acknowledgement doubles as the error surface: on failure it
        // is edited in place rather than sending a second message.
        let progress = match self
            .api
            .send_message(chat_id, "⏳ Processing your video...")
            .await
        {
            Ok(sent) => Some(sent.message_id),
            Err(e) => {
                warn!("Failed to send progress message to {}: {}", chat_id, e);
                None
            }
        };

        info!("Downloading for chat {}", chat_id);

        match self.downloader.download(url).await {
            Ok(video) => {
                self.db.record_download(chat_id, url, true).await;

                if let Err(e) = self.api.send_video(chat_id, &video.path, &video_caption()).await {
                    error!("Failed to send video to {}: {}", chat_id, e);
                    self.report_failure(chat_id, progress, &e.to_string()).await;
                } else if let Some(message_id) = progress
                    && let Err(e) = self.api.delete_message(chat_id, message_id).await
                {
                    debug!("Failed to delete progress message: {}", e);
                }

                if let Err(e) = tokio::fs::remove_file(&video.path).await {
                    warn!("Failed to remove {}: {}", video.path.display(), e);
                }
            }
            Err(e) => {
                error!("Download failed for chat {}: {}", chat_id, e);
                self.db.record_download(chat_id, url, false).await;
                self.report_failure(chat_id, progress, &e.to_string()).await;
            }
        }
    }

    /// Surfaces a failure in the progress message, or a fresh message
    /// when no progress message exists.
    async fn report_failure(&self, chat_id: i64, progress: Option<i64>, error: &str) {
        let text = download_failed_text(error);

        if let Some(message_id) = progress {
            if self
                .api
                .edit_message_text(chat_id, message_id, &text)
                .await
                .is_ok()
            {
                return;
            }
        }

        self.reply(chat_id, &text).await;
    }

    /// Best-effort text reply.
    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.api.send_message(chat_id, text).await {
            warn!("Failed to reply to chat {}: {}", chat_id, e);
        }
    }
}

impl std::fmt::Debug for UpdateHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateHandler")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Whether the message text looks like a TikTok link.
#[must_use]
pub fn is_tiktok_url(text: &str) -> bool {
    text.to_lowercase().contains("tiktok.com")
}
