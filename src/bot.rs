//! Bot runner: inbound events in, transport calls out.
//!
//! Events for different users run concurrently. Events for one user run one
//! at a time from dispatch through delivery, so the message on screen always
//! matches the state the next press acts on.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use lru::LruCache;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::task::JoinSet;

use crate::dispatcher::Dispatcher;
use crate::error::{DecodeError, NavError};
use crate::session::UserId;
use crate::transport::{ChatTransport, InboundEvent};

/// Default number of per-user ordering locks kept
pub const USER_LOCK_CAPACITY: usize = 10_000;

/// Per-user FIFO locks, bounded by recency
struct UserLocks {
    locks: Mutex<LruCache<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            locks: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Wait for this user's turn. Waiters are served in arrival order.
    async fn acquire(&self, user: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            match locks.get(&user) {
                Some(lock) => Arc::clone(lock),
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.push(user, Arc::clone(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }
}

pub struct BotRunner {
    dispatcher: Arc<Dispatcher>,
    transport: Arc<dyn ChatTransport>,
    user_locks: UserLocks,
}

impl BotRunner {
    pub fn new(dispatcher: Arc<Dispatcher>, transport: Arc<dyn ChatTransport>) -> Self {
        let capacity = NonZeroUsize::new(USER_LOCK_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_lock_capacity(dispatcher, transport, capacity)
    }

    pub fn with_lock_capacity(
        dispatcher: Arc<Dispatcher>,
        transport: Arc<dyn ChatTransport>,
        capacity: NonZeroUsize,
    ) -> Self {
        Self {
            dispatcher,
            transport,
            user_locks: UserLocks::new(capacity),
        }
    }

    /// Consume events until the channel closes. Each event is handled on its
    /// own task; in-flight tasks are awaited before returning.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<InboundEvent>) {
        tracing::info!(
            strategy = self.dispatcher.strategy().name(),
            "Bot runner started"
        );
        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let runner = Arc::clone(&self);
                    tasks.spawn(async move { runner.handle_logged(event).await });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Event task panicked");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Event task panicked");
            }
        }
        tracing::info!("Bot runner stopped");
    }

    async fn handle_logged(&self, event: InboundEvent) {
        let user = event.user();
        if let Err(e) = self.handle_event(event).await {
            tracing::error!(user, error = %format!("{e:#}"), "Failed to handle event");
        }
    }

    /// Handle one event end to end, holding the user's lock throughout
    pub async fn handle_event(&self, event: InboundEvent) -> Result<()> {
        let _turn = self.user_locks.acquire(event.user()).await;
        match event {
            InboundEvent::Start {
                chat,
                user,
                first_name,
            } => {
                let instruction = self.dispatcher.start(user, first_name.as_deref()).await;
                self.transport
                    .send_message(chat, &instruction.view)
                    .await
                    .context("Failed to send welcome message")?;
            }
            InboundEvent::ButtonPress {
                callback_id,
                chat,
                message,
                user,
                token,
            } => {
                let instruction = self.dispatcher.handle(user, &token).await;

                // The ack stops the client spinner; a failed ack must not
                // keep the screen from updating.
                if let Err(e) = self
                    .transport
                    .ack_callback(&callback_id, instruction.view.toast())
                    .await
                {
                    tracing::warn!(user, error = %format!("{e:#}"), "Failed to acknowledge button press");
                }

                self.transport
                    .edit_message(chat, message, &instruction.view)
                    .await
                    .context("Failed to update message")?;
            }
            InboundEvent::UnroutablePress { callback_id, user } => {
                tracing::warn!(user, "Button press without payload or message");
                let toast = NavError::Malformed(DecodeError::Empty).toast();
                self.transport
                    .ack_callback(&callback_id, Some(toast))
                    .await
                    .context("Failed to acknowledge button press")?;
            }
        }
        Ok(())
    }
}
