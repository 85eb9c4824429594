//! User intents carried by buttons.

use serde::{Deserialize, Serialize};

/// Direction of a `Navigate` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// `Navigate(+1)`: Next, or Finish on the last example
    Forward,
    /// `Navigate(-1)`: Back, never offered on the first example
    Back,
}

/// A decoded button intent.
///
/// `OpenGroup`, `OpenExercise`, `ShowExample` and `ReturnToMainMenu` name their
/// target outright. `Navigate` and `ReturnToGroupMenu` are relative to the
/// state the button was rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavAction {
    OpenGroup {
        group: String,
    },
    OpenExercise {
        group: String,
        exercise: String,
    },
    ShowExample {
        group: String,
        exercise: String,
        index: usize,
    },
    Navigate {
        step: Step,
    },
    ReturnToGroupMenu,
    ReturnToMainMenu,
}

impl NavAction {
    pub fn next() -> Self {
        NavAction::Navigate {
            step: Step::Forward,
        }
    }

    pub fn back() -> Self {
        NavAction::Navigate { step: Step::Back }
    }

    /// Whether the action can only be applied to a known prior state
    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            NavAction::Navigate { .. } | NavAction::ReturnToGroupMenu
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            NavAction::OpenGroup { .. } => "open group",
            NavAction::OpenExercise { .. } => "open exercise",
            NavAction::ShowExample { .. } => "show example",
            NavAction::Navigate {
                step: Step::Forward,
            } => "next",
            NavAction::Navigate { step: Step::Back } => "back",
            NavAction::ReturnToGroupMenu => "exercise menu",
            NavAction::ReturnToMainMenu => "main menu",
        }
    }
}
