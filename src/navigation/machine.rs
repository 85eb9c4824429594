//! Navigation state machine.
//!
//! ## States
//!
//! ```text
//!              OpenGroup(g)            OpenExercise(g, e)
//!  MainMenu ────────────────► GroupMenu(g) ─────────────────► Example(g, e, 0)
//!     ▲                          ▲   ▲                          │   ▲
//!     │ ReturnToMainMenu         │   │ ReturnToGroupMenu    Next│   │Back
//!     │ (from anywhere)          │   │                          ▼   │
//!     │                          │   └──────────────────── Example(g, e, i)
//!     │                          │                              │ Next at i = len - 1
//!     │                          └─────────────────────────     ▼
//!     └──────────────────────────────────────────────────── Completed(g, e)
//!                                  OpenExercise restarts at index 0
//! ```
//!
//! - Absolute actions (`OpenGroup`, `OpenExercise`, `ShowExample`,
//!   `ReturnToMainMenu`) name their target and apply from any screen.
//! - `Navigate` and `ReturnToGroupMenu` need the screen they were pressed on.
//! - `Completed` is re-enterable: further `Navigate` presses keep it there.
//! - Anything invalid lands on `MainMenu` with the error attached as a notice.

use crate::catalog::ExerciseCatalog;
use crate::error::NavError;

use super::action::{NavAction, Step};
use super::state::{NavigationState, Screen};

/// Outcome of applying an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub screen: Screen,
    /// Set when the requested transition was invalid and a fallback was taken
    pub notice: Option<NavError>,
}

impl Transition {
    pub fn to(screen: Screen) -> Self {
        Self {
            screen,
            notice: None,
        }
    }

    /// Safe landing for any invalid request
    pub fn fallback(error: NavError) -> Self {
        Self {
            screen: Screen::MainMenu,
            notice: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.screen.is_completed()
    }
}

/// Pure transition function over a catalog
#[derive(Debug, Clone, Copy)]
pub struct StateMachine<'a> {
    catalog: &'a ExerciseCatalog,
}

impl<'a> StateMachine<'a> {
    pub fn new(catalog: &'a ExerciseCatalog) -> Self {
        Self { catalog }
    }

    /// Entry point for `/start`
    pub fn start(&self) -> Transition {
        Transition::to(Screen::MainMenu)
    }

    /// Validate a stored or token-carried state against the catalog.
    ///
    /// Indices past the end are clamped to the completion sentinel; they are
    /// never used to index examples.
    pub fn resolve(&self, state: &NavigationState) -> Result<Screen, NavError> {
        let Some(group) = state.group_id() else {
            return Ok(Screen::MainMenu);
        };
        let Some(exercise) = state.exercise_id() else {
            self.catalog.group(group)?;
            return Ok(Screen::GroupMenu {
                group: group.to_string(),
            });
        };

        let total = self.catalog.get(group, exercise)?.len();
        let index = state.example_index();
        if index > total {
            tracing::warn!(group, exercise, index, total, "Clamping out-of-range example index");
        }
        Ok(position(group, exercise, index, total))
    }

    /// Apply an action to a prior state that may be unknown.
    ///
    /// Absolute actions ignore `prior`. Relative ones need it, and fall back
    /// with `missing` when it is absent.
    pub fn apply_to_state(
        &self,
        prior: Option<&NavigationState>,
        action: &NavAction,
        missing: NavError,
    ) -> Transition {
        if !action.is_relative() {
            return self.apply(&Screen::MainMenu, action);
        }
        let Some(state) = prior else {
            return Transition::fallback(missing);
        };
        match self.resolve(state) {
            Ok(screen) => self.apply(&screen, action),
            Err(e) => Transition::fallback(e),
        }
    }

    /// Apply an action to a known screen
    pub fn apply(&self, current: &Screen, action: &NavAction) -> Transition {
        match action {
            NavAction::ReturnToMainMenu => Transition::to(Screen::MainMenu),

            NavAction::OpenGroup { group } => match self.catalog.group(group) {
                Ok(_) => Transition::to(Screen::GroupMenu {
                    group: group.clone(),
                }),
                Err(e) => Transition::fallback(e),
            },

            NavAction::OpenExercise { group, exercise } => {
                match self.catalog.get(group, exercise) {
                    Ok(_) => Transition::to(Screen::Example {
                        group: group.clone(),
                        exercise: exercise.clone(),
                        index: 0,
                    }),
                    Err(e) => Transition::fallback(e),
                }
            }

            NavAction::ShowExample {
                group,
                exercise,
                index,
            } => match self.catalog.get(group, exercise) {
                Ok(found) => Transition::to(position(group, exercise, *index, found.len())),
                Err(e) => Transition::fallback(e),
            },

            NavAction::Navigate { step } => self.navigate(current, *step, action),

            NavAction::ReturnToGroupMenu => match current.group() {
                Some(group) => Transition::to(Screen::GroupMenu {
                    group: group.to_string(),
                }),
                None => unexpected(action, current),
            },
        }
    }

    fn navigate(&self, current: &Screen, step: Step, action: &NavAction) -> Transition {
        match current {
            Screen::Example {
                group,
                exercise,
                index,
            } => {
                let total = match self.catalog.get(group, exercise) {
                    Ok(found) => found.len(),
                    Err(e) => return Transition::fallback(e),
                };
                let target = match step {
                    Step::Forward => index.saturating_add(1),
                    Step::Back => index.saturating_sub(1),
                };
                Transition::to(position(group, exercise, target, total))
            }
            // Completed is sticky for Next and Back alike
            Screen::Completed { .. } => Transition::to(current.clone()),
            Screen::MainMenu | Screen::GroupMenu { .. } => unexpected(action, current),
        }
    }
}

/// Screen for a 0-based index; `index >= total` is the completion signal
fn position(group: &str, exercise: &str, index: usize, total: usize) -> Screen {
    if index >= total {
        Screen::Completed {
            group: group.to_string(),
            exercise: exercise.to_string(),
            total,
        }
    } else {
        Screen::Example {
            group: group.to_string(),
            exercise: exercise.to_string(),
            index,
        }
    }
}

fn unexpected(action: &NavAction, current: &Screen) -> Transition {
    Transition::fallback(NavError::UnexpectedAction {
        action: action.name(),
        screen: current.name(),
    })
}
