//! Error types for the grammar bot
//!
//! Catalog errors are fatal at startup. Decode and navigation errors are never
//! fatal: the dispatcher turns every one of them into a rendered fallback view.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the lesson catalog, detected while loading it
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Catalog defines no groups")]
    NoGroups,

    #[error("Blank identifier in {context}")]
    BlankId { context: String },

    #[error("Duplicate group id '{0}'")]
    DuplicateGroup(String),

    #[error("Group '{0}' has no exercises")]
    EmptyGroup(String),

    #[error("Duplicate exercise id '{exercise}' in group '{group}'")]
    DuplicateExercise { group: String, exercise: String },

    #[error("Exercise '{exercise}' in group '{group}' has no examples")]
    EmptyExercise { group: String, exercise: String },

    #[error(
        "Action token for '{group}/{exercise}' needs {len} bytes, over the {limit}-byte button limit"
    )]
    TokenTooLong {
        group: String,
        exercise: String,
        len: usize,
        limit: usize,
    },
}

/// Why an action token could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty token")]
    Empty,

    #[error("token is {0} bytes long")]
    TooLong(usize),

    #[error("unsupported token version in '{0}'")]
    UnsupportedVersion(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' cannot take {found} fields")]
    FieldCount { action: &'static str, found: usize },

    #[error("empty field in token")]
    BlankField,

    #[error("invalid escape sequence in '{0}'")]
    BadEscape(String),

    #[error("invalid example index '{0}'")]
    BadIndex(String),

    #[error("action '{0}' carries no navigation state")]
    MissingState(&'static str),
}

/// Navigation failures the user can run into.
///
/// Every variant is recovered locally: the dispatcher renders the main menu
/// with the error as a notice line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("invalid action: {0}")]
    Malformed(#[from] DecodeError),

    #[error("group '{0}' not found")]
    GroupNotFound(String),

    #[error("exercise '{exercise}' not found in group '{group}'")]
    ExerciseNotFound { group: String, exercise: String },

    #[error("no active session")]
    SessionMissing,

    #[error("'{action}' is not available from the {screen}")]
    UnexpectedAction {
        action: &'static str,
        screen: &'static str,
    },
}

impl NavError {
    /// Short text for a callback acknowledgement
    pub fn toast(&self) -> &'static str {
        match self {
            NavError::Malformed(_) => "Invalid action, please restart",
            NavError::GroupNotFound(_) | NavError::ExerciseNotFound { .. } => {
                "That exercise is no longer available"
            }
            NavError::SessionMissing => "Session expired, please start again",
            NavError::UnexpectedAction { .. } => "That button is out of date",
        }
    }

    /// True for references to catalog entries that do not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NavError::GroupNotFound(_) | NavError::ExerciseNotFound { .. }
        )
    }
}
