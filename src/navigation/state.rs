//! Where a user is in the catalog.
//!
//! `NavigationState` is the storage form (what a token or a session holds);
//! `Screen` is the validated form the state machine works on.
//!
//! ```text
//! NavigationState { group: None,    exercise: None,    index: 0 }  => MainMenu
//! NavigationState { group: Some(g), exercise: None,    index: 0 }  => GroupMenu(g)
//! NavigationState { group: Some(g), exercise: Some(e), index: i }  => Example(g, e, i)   i <  len
//!                                                                  => Completed(g, e)    i >= len
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NavigationState
// ---------------------------------------------------------------------------

/// Raw navigation position, as carried by a token or held in a session.
///
/// An exercise is only ever set together with its group. The index is not
/// trusted: it is clamped against the catalog when resolved into a `Screen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    group_id: Option<String>,
    exercise_id: Option<String>,
    example_index: usize,
}

impl NavigationState {
    pub fn main_menu() -> Self {
        Self::default()
    }

    pub fn group_menu(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            exercise_id: None,
            example_index: 0,
        }
    }

    /// Position inside an exercise. `index == len(examples)` means completed.
    pub fn at_example(
        group_id: impl Into<String>,
        exercise_id: impl Into<String>,
        example_index: usize,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            exercise_id: Some(exercise_id.into()),
            example_index,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn exercise_id(&self) -> Option<&str> {
        self.exercise_id.as_deref()
    }

    pub fn example_index(&self) -> usize {
        self.example_index
    }

    pub fn is_main_menu(&self) -> bool {
        self.group_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// State machine state. Only produced by resolving against the catalog or by
/// a transition, so every reference in it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    MainMenu,
    GroupMenu {
        group: String,
    },
    Example {
        group: String,
        exercise: String,
        index: usize,
    },
    /// Every example of the exercise has been shown; `total` is its length.
    Completed {
        group: String,
        exercise: String,
        total: usize,
    },
}

impl Screen {
    pub fn is_completed(&self) -> bool {
        matches!(self, Screen::Completed { .. })
    }

    /// Group the screen belongs to, if any
    pub fn group(&self) -> Option<&str> {
        match self {
            Screen::MainMenu => None,
            Screen::GroupMenu { group }
            | Screen::Example { group, .. }
            | Screen::Completed { group, .. } => Some(group),
        }
    }

    /// Storage form of this screen
    pub fn to_state(&self) -> NavigationState {
        match self {
            Screen::MainMenu => NavigationState::main_menu(),
            Screen::GroupMenu { group } => NavigationState::group_menu(group),
            Screen::Example {
                group,
                exercise,
                index,
            } => NavigationState::at_example(group, exercise, *index),
            Screen::Completed {
                group,
                exercise,
                total,
            } => NavigationState::at_example(group, exercise, *total),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::MainMenu => "main menu",
            Screen::GroupMenu { .. } => "group menu",
            Screen::Example { .. } => "example",
            Screen::Completed { .. } => "completion screen",
        }
    }
}
