//! Chat transport seam.
//!
//! The bot core never talks to a chat platform directly. Inbound events arrive
//! over an `mpsc` channel; outbound effects go through `ChatTransport`.

mod recording;
pub mod telegram;
#[cfg(feature = "server")]
pub mod webhook;

pub use recording::{RecordingTransport, TransportCall};

use anyhow::Result;
use async_trait::async_trait;

use crate::session::UserId;
use crate::view::View;

pub type ChatId = i64;
pub type MessageId = i64;

/// Something the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `/start` command
    Start {
        chat: ChatId,
        user: UserId,
        first_name: Option<String>,
    },
    /// Inline button pressed on a message the bot sent
    ButtonPress {
        callback_id: String,
        chat: ChatId,
        message: MessageId,
        user: UserId,
        token: String,
    },
    /// Button press that cannot be routed (no payload, or no message to
    /// edit); it only needs acknowledging
    UnroutablePress { callback_id: String, user: UserId },
}

impl InboundEvent {
    pub fn user(&self) -> UserId {
        match self {
            InboundEvent::Start { user, .. }
            | InboundEvent::ButtonPress { user, .. }
            | InboundEvent::UnroutablePress { user, .. } => *user,
        }
    }
}

/// Outbound side of a chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a new message, returning its id
    async fn send_message(&self, chat: ChatId, view: &View) -> Result<MessageId>;

    /// Replace the text and buttons of a message in place
    async fn edit_message(&self, chat: ChatId, message: MessageId, view: &View) -> Result<()>;

    /// Acknowledge a button press, optionally with a short toast
    async fn ack_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
