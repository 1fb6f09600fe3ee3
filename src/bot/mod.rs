//! Webhook update handling module.
//!
//! Routes inbound Telegram updates: recognized commands get static
//! responses, TikTok links go through the download flow, anything else is
//! answered with usage help.

mod commands;
mod handler;

pub use commands::BotCommand;
pub use handler::{UpdateHandler, is_tiktok_url};
