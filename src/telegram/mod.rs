//! Telegram Bot API module.
//!
//! Provides the wire types for inbound webhook updates, a thin typed
//! client for the outbound Bot API calls the service makes, and the
//! per-chat download cooldown.

mod api;
mod cooldown;
mod types;

pub use api::{BotApi, TelegramError};
pub use cooldown::Cooldown;
pub use types::{Chat, Message, TgUser, Update};
