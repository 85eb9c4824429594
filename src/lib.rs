//! buildup-bot: grammar drill chat bot.
//!
//! One sentence, many grammatical forms. Learners pick an exercise group, then
//! step through its examples with inline buttons until the completion screen.
//!
//! - [`catalog`]: immutable exercise content loaded from YAML
//! - [`navigation`]: action tokens, navigation state and the transition rules
//! - [`view`]: screen rendering with per-screen buttons
//! - [`session`]: per-user state for the stateful strategy
//! - [`dispatcher`]: one interaction in, one render instruction out
//! - [`transport`]: Telegram Bot API adapter and the in-memory test transport
//! - [`bot`]: event loop tying transport and dispatcher together

pub mod bot;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod navigation;
pub mod session;
pub mod transport;
pub mod view;

pub use catalog::ExerciseCatalog;
pub use dispatcher::{Dispatcher, RenderInstruction, StateStrategy};
pub use error::{CatalogError, DecodeError, NavError};
