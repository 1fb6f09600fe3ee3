//! Wire types for Telegram webhook payloads.
//!
//! Only the fields this service reads are modelled; unknown fields in the
//! payload are ignored during deserialization.

use serde::{Deserialize, Serialize};

/// An inbound update delivered to the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    pub update_id: i64,

    /// New incoming message, if this update carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, unique within the chat.
    pub message_id: i64,

    /// Sender of the message. Absent for channel posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<TgUser>,

    /// Chat the message belongs to.
    pub chat: Chat,

    /// Text of the message, for text messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Message {
    /// Returns the trimmed message text, if any.
    #[must_use]
    pub fn text_trimmed(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A Telegram user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgUser {
    /// Unique user identifier.
    pub id: i64,

    /// First name of the user.
    pub first_name: String,

    /// Username, without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl TgUser {
    /// Name recorded in the user row: username when set, first name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

/// A chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPDATE_JSON: &str = r#"{
        "update_id": 727349121,
        "message": {
            "message_id": 42,
            "from": {"id": 555001, "is_bot": false, "first_name": "Ada", "username": "ada_l"},
            "chat": {"id": 555001, "type": "private"},
            "date": 1722470400,
            "text": "  https://www.tiktok.com/@user/video/7123456789012345678  "
        }
    }"#;

    #[test]
    fn test_deserialize_update() {
        let update: Update = serde_json::from_str(UPDATE_JSON).unwrap();
        assert_eq!(update.update_id, 727_349_121);

        let message = update.message.unwrap();
        assert_eq!(message.message_id, 42);
        assert_eq!(message.chat.id, 555_001);
        assert_eq!(
            message.text_trimmed(),
            Some("https://www.tiktok.com/@user/video/7123456789012345678")
        );
    }

    #[test]
    fn test_deserialize_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 1, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_display_name_prefers_username() {
        let user = TgUser {
            id: 1,
            first_name: "Ada".to_owned(),
            username: Some("ada_l".to_owned()),
        };
        assert_eq!(user.display_name(), "ada_l");

        let user = TgUser {
            id: 2,
            first_name: "Grace".to_owned(),
            username: None,
        };
        assert_eq!(user.display_name(), "Grace");
    }

    #[test]
    fn test_text_trimmed_empty_is_none() {
        let message = Message {
            message_id: 1,
            from: None,
            chat: Chat { id: 1 },
            text: Some("   ".to_owned()),
        };
        assert_eq!(message.text_trimmed(), None);
    }
}
