//! Webhook mode: Telegram pushes updates to an axum endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use super::telegram::types::Update;
use super::telegram::TelegramTransport;
use super::InboundEvent;

pub const WEBHOOK_PATH: &str = "/telegram/webhook";
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    secret: Arc<str>,
    events: mpsc::Sender<InboundEvent>,
}

/// Random value for `setWebhook`'s `secret_token` (1-256 chars of `A-Za-z0-9_-`)
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

pub fn build_router(secret: &str, events: mpsc::Sender<InboundEvent>) -> Router {
    let state = WebhookState {
        secret: Arc::from(secret),
        events,
    };
    Router::new()
        .route(WEBHOOK_PATH, post(receive_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    let authorized = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == &*state.secret);
    if !authorized {
        tracing::warn!("Rejected webhook call without valid secret");
        return StatusCode::UNAUTHORIZED;
    }

    let update_id = update.update_id;
    match update.into_event() {
        Some(event) => {
            if state.events.send(event).await.is_err() {
                tracing::error!(update_id, "Event receiver closed");
                return StatusCode::SERVICE_UNAVAILABLE;
            }
        }
        None => tracing::debug!(update_id, "Ignoring unsupported update"),
    }
    StatusCode::OK
}

/// Register `https://<domain>/telegram/webhook` and serve it on `0.0.0.0:<port>`
pub async fn run_webhook(
    transport: Arc<TelegramTransport>,
    events: mpsc::Sender<InboundEvent>,
    public_domain: &str,
    port: u16,
) -> Result<()> {
    let secret = generate_secret();
    let url = format!(
        "https://{}{}",
        public_domain.trim_end_matches('/'),
        WEBHOOK_PATH
    );
    transport
        .set_webhook(&url, &secret)
        .await
        .context("Failed to register webhook")?;
    tracing::info!(%url, "Webhook registered");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Webhook server listening");

    axum::serve(listener, build_router(&secret, events))
        .await
        .context("Webhook server error")
}
