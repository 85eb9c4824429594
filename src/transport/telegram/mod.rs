//! Telegram Bot API transport
//!
//! Thin `reqwest` client over the JSON Bot API. The bot token is part of every
//! request URL, so request errors are stripped of their URL before they are
//! logged or returned.

pub mod markup;
mod polling;
pub mod types;

pub use polling::run_polling;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use self::types::{
    AnswerCallbackQuery, ApiResponse, DeleteWebhook, EditMessageText, GetUpdates, Message,
    SendMessage, SetWebhook, Update, ALLOWED_UPDATES,
};
use super::{ChatId, ChatTransport, MessageId};
use crate::view::View;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Telegram Bot API client
pub struct TelegramTransport {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(TELEGRAM_API_BASE, token)
    }

    /// Client against a non-default API host (local Bot API server, tests)
    pub fn with_base_url(api_base: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(anyhow!("Telegram bot token is empty"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    /// Call a Bot API method. `timeout` overrides the client default for
    /// long polls.
    async fn call<P, R>(&self, method: &str, payload: &P, timeout: Option<Duration>) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let mut request = self.http.post(&url).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Telegram {} request failed", method))?;

        let status = response.status();
        let body: ApiResponse<R> = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to parse Telegram {} response ({})", method, status))?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram {} error {}: {}",
                method,
                body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                body.description.unwrap_or_default()
            ));
        }
        body.result
            .ok_or_else(|| anyhow!("Telegram {} returned no result", method))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let payload = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        // Leave headroom over the server-side poll timeout
        let client_timeout = timeout + Duration::from_secs(REQUEST_TIMEOUT_SECS);
        self.call("getUpdates", &payload, Some(client_timeout)).await
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<()> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &DeleteWebhook {
                    drop_pending_updates,
                },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn set_webhook(&self, url: &str, secret_token: &str) -> Result<()> {
        let payload = SetWebhook {
            url,
            secret_token,
            drop_pending_updates: true,
            allowed_updates: ALLOWED_UPDATES,
        };
        let _: bool = self.call("setWebhook", &payload, None).await?;
        Ok(())
    }
}

/// Telegram rejects edits that change nothing; for a navigation bot that is
/// a repeated tap and not a failure.
fn is_not_modified(error: &anyhow::Error) -> bool {
    error.to_string().contains("message is not modified")
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat: ChatId, view: &View) -> Result<MessageId> {
        let text = markup::message_text(view);
        let reply_markup = markup::keyboard(view);
        let payload = SendMessage {
            chat_id: chat,
            text: &text,
            parse_mode: markup::PARSE_MODE,
            reply_markup: &reply_markup,
        };
        let message: Message = self.call("sendMessage", &payload, None).await?;
        Ok(message.message_id)
    }

    async fn edit_message(&self, chat: ChatId, message: MessageId, view: &View) -> Result<()> {
        let text = markup::message_text(view);
        let reply_markup = markup::keyboard(view);
        let payload = EditMessageText {
            chat_id: chat,
            message_id: message,
            text: &text,
            parse_mode: markup::PARSE_MODE,
            reply_markup: &reply_markup,
        };
        // Result is the edited Message, or `true` for inline messages
        match self
            .call::<_, serde_json::Value>("editMessageText", &payload, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => {
                tracing::debug!(chat, message, "Message unchanged, edit skipped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn ack_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let payload = AnswerCallbackQuery {
            callback_query_id: callback_id,
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &payload, None).await?;
        Ok(())
    }
}
