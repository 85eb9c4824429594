//! Screen -> View.
//!
//! | screen            | buttons                                            |
//! |-------------------|----------------------------------------------------|
//! | MainMenu          | one per group                                      |
//! | GroupMenu(g)      | one per exercise, Main Menu                        |
//! | Example(g, e, i)  | Back (i > 0), Next / Finish, Exercise Menu, Main   |
//! | Completed(g, e)   | Start Again, Exercise Menu, Main Menu              |

use std::sync::Arc;

use crate::catalog::ExerciseCatalog;
use crate::error::NavError;
use crate::navigation::{codec, NavAction, Screen, Transition};

use super::{Button, ButtonKind, View, ViewBody, Welcome};

/// How much state relative tokens carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenScope {
    /// Tokens embed the screen they were rendered on (stateless dispatcher)
    #[default]
    Full,
    /// Tokens carry the intent only; state lives in the session store
    IntentOnly,
}

#[derive(Debug, Clone)]
pub struct ViewRenderer {
    catalog: Arc<ExerciseCatalog>,
    scope: TokenScope,
}

impl ViewRenderer {
    pub fn new(catalog: Arc<ExerciseCatalog>, scope: TokenScope) -> Self {
        Self { catalog, scope }
    }

    /// Render a transition, notice included
    pub fn render_transition(&self, transition: &Transition) -> View {
        let mut view = self.render(&transition.screen);
        if transition.notice.is_some() {
            view.notice = transition.notice.clone();
        }
        view
    }

    /// Main menu with the `/start` greeting
    pub fn render_welcome(&self, first_name: Option<&str>) -> View {
        let mut view = self.main_menu();
        if let ViewBody::MainMenu { welcome, .. } = &mut view.body {
            *welcome = Some(Welcome {
                first_name: first_name.map(str::to_string),
            });
        }
        view
    }

    /// Render a screen. A screen whose references vanished renders as the
    /// main menu with a notice.
    pub fn render(&self, screen: &Screen) -> View {
        match self.try_render(screen) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(error = %e, "Rendering fallback main menu");
                let mut view = self.main_menu();
                view.notice = Some(e);
                view
            }
        }
    }

    fn try_render(&self, screen: &Screen) -> Result<View, NavError> {
        match screen {
            Screen::MainMenu => Ok(self.main_menu()),
            Screen::GroupMenu { group } => self.group_menu(group),
            Screen::Example {
                group,
                exercise,
                index,
            } => self.example(screen, group, exercise, *index),
            Screen::Completed {
                group, exercise, ..
            } => self.completed(screen, group, exercise),
        }
    }

    fn main_menu(&self) -> View {
        let groups = self.catalog.list_groups();
        let rows = groups
            .iter()
            .map(|g| {
                vec![Button::new(
                    ButtonKind::OpenGroup,
                    format!("📝 {}", g.name),
                    codec::encode(&NavAction::OpenGroup { group: g.id.clone() }, None),
                )]
            })
            .collect();

        View {
            body: ViewBody::MainMenu {
                welcome: None,
                groups,
            },
            rows,
            notice: None,
        }
    }

    fn group_menu(&self, group_id: &str) -> Result<View, NavError> {
        let group = self.catalog.group(group_id)?;
        let exercises = self.catalog.list_exercises(group_id)?;

        let mut rows: Vec<Vec<Button>> = exercises
            .iter()
            .map(|e| {
                vec![Button::new(
                    ButtonKind::OpenExercise,
                    format!("▶️ {}", e.title),
                    codec::encode(
                        &NavAction::OpenExercise {
                            group: group_id.to_string(),
                            exercise: e.id.clone(),
                        },
                        None,
                    ),
                )]
            })
            .collect();
        rows.push(vec![self.main_menu_button()]);

        Ok(View {
            body: ViewBody::GroupMenu {
                name: group.name.clone(),
                description: group.description.clone(),
                exercises,
            },
            rows,
            notice: None,
        })
    }

    fn example(
        &self,
        screen: &Screen,
        group_id: &str,
        exercise_id: &str,
        index: usize,
    ) -> Result<View, NavError> {
        let exercise = self.catalog.get(group_id, exercise_id)?;
        let total = exercise.len();
        let Some(example) = exercise.example(index) else {
            // Screens are built clamped; reaching this means a stale screen
            return self.completed(screen, group_id, exercise_id);
        };

        let mut nav_row = Vec::with_capacity(2);
        if index > 0 {
            nav_row.push(Button::new(
                ButtonKind::Back,
                "◀️ Back",
                self.relative(&NavAction::back(), screen),
            ));
        }
        let (kind, label) = if index + 1 < total {
            (ButtonKind::Next, "Next ▶️")
        } else {
            (ButtonKind::Finish, "Finish ✅")
        };
        nav_row.push(Button::new(
            kind,
            label,
            self.relative(&NavAction::next(), screen),
        ));

        Ok(View {
            body: ViewBody::Example {
                exercise_title: exercise.title.clone(),
                label: example.label.clone(),
                sentence: example.sentence.clone(),
                position: index + 1,
                total,
            },
            rows: vec![
                nav_row,
                vec![self.group_menu_button(screen), self.main_menu_button()],
            ],
            notice: None,
        })
    }

    fn completed(
        &self,
        screen: &Screen,
        group_id: &str,
        exercise_id: &str,
    ) -> Result<View, NavError> {
        let exercise = self.catalog.get(group_id, exercise_id)?;
        let restart = Button::new(
            ButtonKind::Restart,
            "🔄 Start Again",
            codec::encode(
                &NavAction::OpenExercise {
                    group: group_id.to_string(),
                    exercise: exercise_id.to_string(),
                },
                None,
            ),
        );

        Ok(View {
            body: ViewBody::Completed {
                exercise_title: exercise.title.clone(),
                total: exercise.len(),
            },
            rows: vec![
                vec![restart],
                vec![self.group_menu_button(screen)],
                vec![self.main_menu_button()],
            ],
            notice: None,
        })
    }

    fn group_menu_button(&self, screen: &Screen) -> Button {
        Button::new(
            ButtonKind::GroupMenu,
            "📚 Exercise Menu",
            self.relative(&NavAction::ReturnToGroupMenu, screen),
        )
    }

    fn main_menu_button(&self) -> Button {
        Button::new(
            ButtonKind::MainMenu,
            "🏠 Main Menu",
            codec::encode(&NavAction::ReturnToMainMenu, None),
        )
    }

    fn relative(&self, action: &NavAction, screen: &Screen) -> String {
        match self.scope {
            TokenScope::Full => codec::encode(action, Some(&screen.to_state())),
            TokenScope::IntentOnly => codec::encode(action, None),
        }
    }
}
