//! Views: what a screen looks like, independent of any chat markup.
//!
//! The renderer emits structured bodies (labels, sentences, positions) and
//! button descriptors. Turning a `View` into chat text is the transport's job.

mod renderer;

pub use renderer::{TokenScope, ViewRenderer};

use lesson_types::{ExerciseSummary, GroupSummary};
use serde::Serialize;

use crate::error::NavError;

/// One rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub body: ViewBody,
    /// Button rows, top to bottom
    pub rows: Vec<Vec<Button>>,
    /// Recovered error to show above the body
    pub notice: Option<NavError>,
}

impl View {
    /// All buttons, row by row
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn button(&self, kind: ButtonKind) -> Option<&Button> {
        self.buttons().find(|b| b.kind == kind)
    }

    pub fn has_button(&self, kind: ButtonKind) -> bool {
        self.button(kind).is_some()
    }

    /// Short text for the callback acknowledgement, set only when the press
    /// could not be honoured
    pub fn toast(&self) -> Option<&'static str> {
        self.notice.as_ref().map(NavError::toast)
    }
}

/// Structured content of a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewBody {
    MainMenu {
        /// Present only on the `/start` reply
        welcome: Option<Welcome>,
        groups: Vec<GroupSummary>,
    },
    GroupMenu {
        name: String,
        description: String,
        exercises: Vec<ExerciseSummary>,
    },
    Example {
        exercise_title: String,
        label: String,
        sentence: String,
        /// 1-based
        position: usize,
        total: usize,
    },
    Completed {
        exercise_title: String,
        total: usize,
    },
}

/// Greeting shown on `/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Welcome {
    pub first_name: Option<String>,
}

/// What a button does, independent of its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    OpenGroup,
    OpenExercise,
    Back,
    Next,
    Finish,
    Restart,
    GroupMenu,
    MainMenu,
}

/// Label plus action token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub kind: ButtonKind,
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(kind: ButtonKind, label: impl Into<String>, token: String) -> Self {
        Self {
            kind,
            label: label.into(),
            token,
        }
    }
}
