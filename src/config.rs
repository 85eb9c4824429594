//! Runtime configuration: command-line flags with environment fallbacks.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use crate::catalog::ExerciseCatalog;
use crate::dispatcher::{Dispatcher, StateStrategy};
use crate::session::{MemorySessionStore, SessionLimits};

/// Where navigation state lives between button presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SessionMode {
    /// Full state in every button token
    #[default]
    Stateless,
    /// State kept in an in-memory session store
    Stateful,
}

/// Grammar drill bot for Telegram
#[derive(Parser, Clone)]
#[command(name = "buildup-bot", version)]
#[command(about = "Telegram bot that walks one sentence through many grammatical forms")]
pub struct BotConfig {
    /// Telegram Bot API token (falls back to BOT_TOKEN)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// YAML catalog to load instead of the built-in one
    #[arg(long, env = "BUILDUP_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[arg(long, env = "BUILDUP_SESSION_MODE", value_enum, default_value_t = SessionMode::Stateless)]
    pub session_mode: SessionMode,

    /// Maximum sessions kept in stateful mode
    #[arg(long, env = "BUILDUP_SESSION_CAPACITY", default_value_t = 10_000)]
    pub session_capacity: usize,

    /// Idle seconds before a session expires in stateful mode
    #[arg(long, env = "BUILDUP_SESSION_TTL_SECS", default_value_t = 86_400)]
    pub session_ttl_secs: u64,

    /// Public domain; when set the bot runs in webhook mode
    #[arg(long, env = "RAILWAY_PUBLIC_DOMAIN")]
    pub public_domain: Option<String>,

    /// Webhook listen port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Server-side long-poll timeout in seconds
    #[arg(long, env = "BUILDUP_POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("catalog", &self.catalog)
            .field("session_mode", &self.session_mode)
            .field("session_capacity", &self.session_capacity)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("public_domain", &self.public_domain)
            .field("port", &self.port)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl BotConfig {
    /// The bot token, from the flag, `TELEGRAM_BOT_TOKEN` or `BOT_TOKEN`
    pub fn resolve_token(&self) -> Result<String> {
        self.bot_token
            .clone()
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN (or BOT_TOKEN) must be set"))
    }

    pub fn session_limits(&self) -> Result<SessionLimits> {
        let capacity = NonZeroUsize::new(self.session_capacity)
            .ok_or_else(|| anyhow!("BUILDUP_SESSION_CAPACITY must be greater than zero"))?;
        if self.session_ttl_secs == 0 {
            return Err(anyhow!("BUILDUP_SESSION_TTL_SECS must be greater than zero"));
        }
        Ok(SessionLimits {
            capacity,
            idle_ttl: Duration::from_secs(self.session_ttl_secs),
        })
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Configured catalog file, or the built-in catalog
    pub fn load_catalog(&self) -> Result<ExerciseCatalog> {
        match &self.catalog {
            Some(path) => ExerciseCatalog::from_path(path)
                .with_context(|| format!("Failed to load catalog {}", path.display())),
            None => ExerciseCatalog::builtin().context("Built-in catalog is invalid"),
        }
    }

    pub fn build_dispatcher(&self, catalog: Arc<ExerciseCatalog>) -> Result<Dispatcher> {
        let strategy = match self.session_mode {
            SessionMode::Stateless => StateStrategy::Stateless,
            SessionMode::Stateful => {
                let store = MemorySessionStore::new(self.session_limits()?);
                StateStrategy::Stateful(Arc::new(store))
            }
        };
        Ok(Dispatcher::new(catalog, strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> BotConfig {
        let mut argv = vec!["buildup-bot"];
        argv.extend_from_slice(args);
        BotConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--bot-token", "t"]);
        assert_eq!(config.session_capacity, 10_000);
        assert_eq!(config.session_ttl_secs, 86_400);
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_stateful_mode_builds_session_store() {
        let config = parse(&[
            "--bot-token",
            "t",
            "--session-mode",
            "stateful",
            "--session-capacity",
            "5",
        ]);
        assert_eq!(config.session_mode, SessionMode::Stateful);
        let catalog = Arc::new(config.load_catalog().unwrap());
        let dispatcher = config.build_dispatcher(catalog).unwrap();
        assert_eq!(dispatcher.strategy().name(), "stateful");
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = parse(&["--bot-token", "t", "--session-capacity", "0"]);
        assert!(config.session_limits().is_err());
        let config = parse(&["--bot-token", "t", "--session-ttl-secs", "0"]);
        assert!(config.session_limits().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = parse(&["--bot-token", "123:very-secret"]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(config.resolve_token().unwrap(), "123:very-secret");
    }

    #[test]
    fn test_missing_catalog_file_is_an_error() {
        let config = parse(&["--bot-token", "t", "--catalog", "/nonexistent/catalog.yaml"]);
        assert!(config.load_catalog().is_err());
    }
}
