use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::TelegramTransport;
use crate::transport::InboundEvent;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Long-poll `getUpdates` and forward every recognised update into `events`.
///
/// Clears any registered webhook first, dropping updates that queued up while
/// the bot was offline. Returns when the receiving side of `events` closes.
pub async fn run_polling(
    transport: Arc<TelegramTransport>,
    events: mpsc::Sender<InboundEvent>,
    poll_timeout: Duration,
) -> Result<()> {
    transport
        .delete_webhook(true)
        .await
        .context("Failed to delete webhook before polling")?;
    tracing::info!(timeout = ?poll_timeout, "Polling for updates");

    let mut offset = 0_i64;
    let mut backoff = Duration::from_secs(1);
    loop {
        let updates = match transport.get_updates(offset, poll_timeout).await {
            Ok(updates) => {
                backoff = Duration::from_secs(1);
                updates
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), retry_in = ?backoff, "getUpdates failed");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            match update.into_event() {
                Some(event) => {
                    if events.send(event).await.is_err() {
                        tracing::info!("Event receiver closed, polling stopped");
                        return Ok(());
                    }
                }
                None => tracing::debug!(update_id, "Ignoring unsupported update"),
            }
        }
    }
}
