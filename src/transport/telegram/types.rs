//! Telegram Bot API wire types (the subset the bot uses).

use serde::{Deserialize, Serialize};

use crate::transport::InboundEvent;

/// Envelope around every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    pub reply_markup: &'a InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    pub reply_markup: &'a InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SetWebhook<'a> {
    pub url: &'a str,
    pub secret_token: &'a str,
    pub drop_pending_updates: bool,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct DeleteWebhook {
    pub drop_pending_updates: bool,
}

/// Update kinds the bot subscribes to
pub const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

impl Update {
    /// Map an update onto the bot's inbound events. Anything else (plain
    /// text, other commands) yields `None`. Every callback query maps to an
    /// event so that it gets acknowledged.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            return Some(match (query.message, query.data) {
                (Some(message), Some(token)) => InboundEvent::ButtonPress {
                    callback_id: query.id,
                    chat: message.chat.id,
                    message: message.message_id,
                    user: query.from.id,
                    token,
                },
                _ => InboundEvent::UnroutablePress {
                    callback_id: query.id,
                    user: query.from.id,
                },
            });
        }

        let message = self.message?;
        if !is_start_command(message.text.as_deref()?) {
            return None;
        }
        let from = message.from?;
        Some(InboundEvent::Start {
            chat: message.chat.id,
            user: from.id,
            first_name: Some(from.first_name).filter(|name| !name.trim().is_empty()),
        })
    }
}

/// `/start`, `/start@SomeBot`, optionally followed by a deep-link payload
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_start_command_becomes_start_event() {
        let update = parse(
            r#"{"update_id":1,"message":{"message_id":10,"chat":{"id":77},
                "from":{"id":5,"first_name":"Ada","is_bot":false},"text":"/start"}}"#,
        );
        assert_eq!(
            update.into_event(),
            Some(InboundEvent::Start {
                chat: 77,
                user: 5,
                first_name: Some("Ada".into()),
            })
        );
    }

    #[test]
    fn test_start_variants() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("/start@BuildupBot"));
        assert!(is_start_command("/start ref42"));
        assert!(!is_start_command("/help"));
        assert!(!is_start_command("start"));
        assert!(!is_start_command(""));
    }

    #[test]
    fn test_callback_query_becomes_button_press() {
        let update = parse(
            r#"{"update_id":2,"callback_query":{"id":"cb1",
                "from":{"id":5,"first_name":"Ada"},
                "message":{"message_id":10,"chat":{"id":77}},
                "data":"v1_m"}}"#,
        );
        assert_eq!(
            update.into_event(),
            Some(InboundEvent::ButtonPress {
                callback_id: "cb1".into(),
                chat: 77,
                message: 10,
                user: 5,
                token: "v1_m".into(),
            })
        );
    }

    #[test]
    fn test_unroutable_callback_still_yields_event() {
        let no_data = parse(
            r#"{"update_id":4,"callback_query":{"id":"cb2",
                "from":{"id":5,"first_name":"Ada"},
                "message":{"message_id":10,"chat":{"id":77}}}}"#,
        );
        let no_message = parse(
            r#"{"update_id":6,"callback_query":{"id":"cb3",
                "from":{"id":5,"first_name":"Ada"},"data":"v1_m"}}"#,
        );
        assert_eq!(
            no_data.into_event(),
            Some(InboundEvent::UnroutablePress {
                callback_id: "cb2".into(),
                user: 5,
            })
        );
        assert_eq!(
            no_message.into_event(),
            Some(InboundEvent::UnroutablePress {
                callback_id: "cb3".into(),
                user: 5,
            })
        );
    }

    #[test]
    fn test_other_updates_are_ignored() {
        let text = parse(
            r#"{"update_id":3,"message":{"message_id":11,"chat":{"id":77},
                "from":{"id":5,"first_name":"Ada"},"text":"hello"}}"#,
        );
        assert_eq!(text.into_event(), None);

        let empty = parse(r#"{"update_id":5}"#);
        assert_eq!(empty.into_event(), None);
    }
}
