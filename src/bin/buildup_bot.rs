//! buildup-bot: Telegram grammar drill bot.
//!
//! Polls for updates by default; runs a webhook server instead when a public
//! domain is configured and the `server` feature is enabled.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use buildup_bot::bot::BotRunner;
use buildup_bot::config::BotConfig;
use buildup_bot::transport::telegram::{self, TelegramTransport};

const EVENT_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,buildup_bot=debug".into()),
        )
        .init();

    let config = BotConfig::parse();
    tracing::debug!(?config, "Configuration loaded");

    let catalog = Arc::new(config.load_catalog()?);
    tracing::info!(
        groups = catalog.groups().len(),
        examples = catalog.example_count(),
        "Catalog ready"
    );

    let dispatcher = Arc::new(config.build_dispatcher(Arc::clone(&catalog))?);
    let transport = Arc::new(TelegramTransport::new(&config.resolve_token()?)?);
    let runner = Arc::new(BotRunner::new(dispatcher, transport.clone()));

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let runner_task = tokio::spawn(runner.run(events_rx));

    let intake = intake(&config, transport, events_tx);
    tokio::select! {
        result = intake => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown requested"),
    }

    // Intake dropped its sender; let in-flight events finish
    runner_task.await?;
    Ok(())
}

async fn intake(
    config: &BotConfig,
    transport: Arc<TelegramTransport>,
    events: mpsc::Sender<buildup_bot::transport::InboundEvent>,
) -> Result<()> {
    match config.public_domain.as_deref() {
        #[cfg(feature = "server")]
        Some(domain) => {
            tracing::info!(domain, port = config.port, "Running in webhook mode");
            buildup_bot::transport::webhook::run_webhook(transport, events, domain, config.port)
                .await
        }
        #[cfg(not(feature = "server"))]
        Some(domain) => {
            tracing::warn!(
                domain,
                "Public domain set but built without the `server` feature, falling back to polling"
            );
            telegram::run_polling(transport, events, config.poll_timeout()).await
        }
        None => {
            tracing::info!("Running in polling mode");
            telegram::run_polling(transport, events, config.poll_timeout()).await
        }
    }
}
