use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ChatId, ChatTransport, MessageId};
use crate::view::View;

/// One outbound call seen by a `RecordingTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send {
        chat: ChatId,
        message: MessageId,
        view: View,
    },
    Edit {
        chat: ChatId,
        message: MessageId,
        view: View,
    },
    Ack {
        callback_id: String,
        text: Option<String>,
    },
}

/// In-memory transport that records every call instead of talking to a
/// chat platform.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    next_message: Arc<AtomicI64>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    /// Drain the recorded calls
    pub async fn take(&self) -> Vec<TransportCall> {
        std::mem::take(&mut *self.calls.lock().await)
    }

    /// The view most recently sent or edited into `message`
    pub async fn latest_view(&self, message: MessageId) -> Option<View> {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find_map(|call| match call {
                TransportCall::Send { message: m, view, .. }
                | TransportCall::Edit { message: m, view, .. }
                    if *m == message =>
                {
                    Some(view.clone())
                }
                _ => None,
            })
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, chat: ChatId, view: &View) -> Result<MessageId> {
        let message = self.next_message.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().await.push(TransportCall::Send {
            chat,
            message,
            view: view.clone(),
        });
        Ok(message)
    }

    async fn edit_message(&self, chat: ChatId, message: MessageId, view: &View) -> Result<()> {
        self.calls.lock().await.push(TransportCall::Edit {
            chat,
            message,
            view: view.clone(),
        });
        Ok(())
    }

    async fn ack_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.calls.lock().await.push(TransportCall::Ack {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
