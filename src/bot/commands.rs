//! Bot command parsing and canned response texts.

use std::fmt;

use crate::storage::UserStats;

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// First contact; replies with the welcome text.
    Start,

    /// Usage help; same text as the welcome.
    Help,

    /// The requesting user's personal download counters.
    Stats,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Accepts `/cmd` and the `/cmd@botname` form groups use, in any
    /// case. Returns `None` for anything that is not a known command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        let first_word = text.split_whitespace().next()?;
        let command = first_word.strip_prefix('/')?;

        // Strip the @botname suffix used in group chats
        let command = command
            .split_once('@')
            .map_or(command, |(name, _)| name)
            .to_lowercase();

        match command.as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Stats => "stats",
        };
        write!(f, "{name}")
    }
}

/// Welcome/help text sent for `/start`, `/help`, and unrecognized commands.
#[must_use]
pub fn welcome_text(first_name: &str, cooldown_secs: u64) -> String {
    format!(
        "🎬 TikTok Video Downloader Bot\n\
         \n\
         Hi {first_name}! 👋\n\
         \n\
         Send me a TikTok video link and I'll download it for you without watermark!\n\
         \n\
         How to use:\n\
         1. Copy a TikTok video link\n\
         2. Paste it here\n\
         3. Get your video!\n\
         \n\
         Supported links:\n\
         • https://www.tiktok.com/@user/video/...\n\
         • https://vm.tiktok.com/...\n\
         \n\
         📊 /stats - View your download stats\n\
         ❓ /help - Show this message\n\
         \n\
         ⏱️ Note: {cooldown_secs} second cooldown between downloads"
    )
}

/// Reply for messages that carry neither a command nor a TikTok link.
#[must_use]
pub fn invalid_link_text() -> String {
    "❌ Please send a valid TikTok video link.\n\
     \n\
     Example: https://www.tiktok.com/@user/video/123456789"
        .to_owned()
}

/// Reply for the `/stats` command.
#[must_use]
pub fn user_stats_text(stats: &UserStats) -> String {
    format!(
        "📊 Your Download Statistics\n\
         \n\
         📥 Total Downloads: {}\n\
         ✅ Successful: {}\n\
         ❌ Failed: {}\n\
         \n\
         📅 Today: {}",
        stats.downloads, stats.successful, stats.failed, stats.today
    )
}

/// Reply while a chat is still inside the cooldown window.
#[must_use]
pub fn cooldown_text(remaining_secs: u64) -> String {
    format!("⏱️ Please wait {remaining_secs} seconds before downloading again.")
}

/// Caption attached to a delivered video.
#[must_use]
pub fn video_caption() -> String {
    "✅ Here's your video without watermark!".to_owned()
}

/// Reply when the extraction flow fails.
#[must_use]
pub fn download_failed_text(error: &str) -> String {
    format!(
        "❌ Failed to download video.\n\
         \n\
         Error: {error}\n\
         \n\
         Please try again or check if the link is correct."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/help"), Some(BotCommand::Help));
        assert_eq!(BotCommand::parse("/stats"), Some(BotCommand::Stats));
    }

    #[test]
    fn test_parse_with_botname_suffix() {
        assert_eq!(
            BotCommand::parse("/start@tiktok_dl_bot"),
            Some(BotCommand::Start)
        );
        assert_eq!(
            BotCommand::parse("/STATS@TikTok_DL_Bot"),
            Some(BotCommand::Stats)
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(BotCommand::parse("/Start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/HELP"), Some(BotCommand::Help));
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(BotCommand::parse("  /start  "), Some(BotCommand::Start));
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(BotCommand::parse("start"), None);
        assert_eq!(BotCommand::parse("/unknown"), None);
        assert_eq!(BotCommand::parse("https://www.tiktok.com/@a/video/1"), None);
        assert_eq!(BotCommand::parse(""), None);
    }

    #[test]
    fn test_welcome_text_mentions_user_and_cooldown() {
        let text = welcome_text("Ada", 15);
        assert!(text.contains("Hi Ada!"));
        assert!(text.contains("15 second cooldown"));
        assert!(text.contains("/stats"));
    }

    #[test]
    fn test_user_stats_text() {
        let stats = UserStats {
            downloads: 10,
            successful: 8,
            failed: 2,
            today: 3,
        };
        let text = user_stats_text(&stats);
        assert!(text.contains("Total Downloads: 10"));
        assert!(text.contains("Successful: 8"));
        assert!(text.contains("Failed: 2"));
        assert!(text.contains("Today: 3"));
    }
}
