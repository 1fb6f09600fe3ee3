//! Typed client for the Telegram Bot API.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::Message;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur during Bot API operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error: {0}")]
    Api(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u32),

    #[error("Unexpected Bot API response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read video file: {0}")]
    VideoFile(#[from] std::io::Error),
}

/// The `{ok, result, description, parameters}` envelope every Bot API
/// method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u32>,
}

impl<T> ApiResponse<T> {
    /// Collapses the envelope into a result, mapping `retry_after` to the
    /// dedicated rate-limit variant.
    fn into_result(self) -> Result<T, TelegramError> {
        if !self.ok {
            if let Some(seconds) = self.parameters.and_then(|p| p.retry_after) {
                return Err(TelegramError::RateLimited(seconds));
            }
            return Err(TelegramError::Api(
                self.description.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }

        self.result
            .ok_or_else(|| TelegramError::InvalidResponse("ok response without result".to_owned()))
    }
}

/// Thin client for the Bot API methods this service uses.
pub struct BotApi {
    /// Shared HTTP client.
    http: reqwest::Client,

    /// Method URL prefix, `https://api.telegram.org/bot<token>`.
    /// Contains the bot token; never logged.
    base_url: String,
}

impl BotApi {
    /// Creates a client for the given bot token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(bot_token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{API_BASE}/bot{bot_token}"),
        })
    }

    /// Registers the webhook endpoint with Telegram, dropping any updates
    /// that accumulated while the service was down.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the API rejects the URL.
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), TelegramError> {
        info!("Registering webhook: {}", webhook_url);

        let _: bool = self
            .invoke(
                "setWebhook",
                &json!({
                    "url": webhook_url,
                    "drop_pending_updates": true,
                }),
            )
            .await?;

        Ok(())
    }

    /// Sends a plain-text message and returns the sent message.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
    ) -> Result<Message, TelegramError> {
        self.invoke(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
            }),
        )
        .await
    }

    /// Replaces the text of a previously sent message.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .invoke(
                "editMessageText",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                }),
            )
            .await?;

        Ok(())
    }

    /// Deletes a previously sent message.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), TelegramError> {
        let _: bool = self
            .invoke(
                "deleteMessage",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                }),
            )
            .await?;

        Ok(())
    }

    /// Uploads a video file to the chat with a caption.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    pub async fn send_video(
        &self,
        chat_id: i64,
        video_path: &Path,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let bytes = tokio::fs::read(video_path).await?;
        let file_name = video_path
            .file_name()
            .map_or_else(|| "video.mp4".to_owned(), |n| n.to_string_lossy().into_owned());

        debug!("Uploading video {} ({} bytes)", file_name, bytes.len());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;

        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_owned())
            .part("video", part);

        let response = self
            .http
            .post(format!("{}/sendVideo", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        envelope.into_result().map(|_| ())
    }

    /// Invokes a JSON Bot API method and decodes the result.
    async fn invoke<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, TelegramError> {
        debug!("Calling Bot API method: {}", method);

        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(params)
            .send()
            .await?;

        let envelope: ApiResponse<T> = response.json().await?;
        let result = envelope.into_result();

        if let Err(TelegramError::RateLimited(seconds)) = &result {
            warn!("Bot API rate limit on {}: retry after {}s", method, seconds);
        }

        result
    }
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let envelope: ApiResponse<bool> =
            serde_json::from_str(r#"{"ok": true, "result": true}"#).unwrap();
        assert!(envelope.into_result().unwrap());
    }

    #[test]
    fn test_envelope_error_description() {
        let envelope: ApiResponse<bool> =
            serde_json::from_str(r#"{"ok": false, "description": "Bad Request: chat not found"}"#)
                .unwrap();
        match envelope.into_result() {
            Err(TelegramError::Api(desc)) => assert!(desc.contains("chat not found")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_rate_limited() {
        let envelope: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok": false, "error_code": 429, "description": "Too Many Requests",
                "parameters": {"retry_after": 23}}"#,
        )
        .unwrap();
        match envelope.into_result() {
            Err(TelegramError::RateLimited(seconds)) => assert_eq!(seconds, 23),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_message_result() {
        let envelope: ApiResponse<Message> = serde_json::from_str(
            r#"{"ok": true, "result": {"message_id": 7, "chat": {"id": 99}, "date": 0}}"#,
        )
        .unwrap();
        let message = envelope.into_result().unwrap();
        assert_eq!(message.message_id, 7);
        assert_eq!(message.chat.id, 99);
    }
}
