//! Dispatcher: one inbound interaction in, one render instruction out.
//!
//! ```text
//! token ──► codec::decode ──► prior state ──► StateMachine ──► ViewRenderer
//!                              (token or session)                   │
//!                                                   session write ◄─┘ (stateful)
//! ```
//!
//! The two strategies never mix: the stateless dispatcher reads state only from
//! the token, the stateful one only from its `SessionStore`.

use std::sync::Arc;

use crate::catalog::ExerciseCatalog;
use crate::error::{DecodeError, NavError};
use crate::navigation::{codec, DecodedToken, NavigationState, Screen, StateMachine, Transition};
use crate::session::{SessionStore, UserId};
use crate::view::{TokenScope, View, ViewRenderer};

/// Where prior navigation state comes from
#[derive(Clone)]
pub enum StateStrategy {
    /// State travels in the action token; nothing is kept server-side
    Stateless,
    /// State is kept per user in a session store
    Stateful(Arc<dyn SessionStore>),
}

impl StateStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            StateStrategy::Stateless => "stateless",
            StateStrategy::Stateful(_) => "stateful",
        }
    }

    fn token_scope(&self) -> TokenScope {
        match self {
            StateStrategy::Stateless => TokenScope::Full,
            StateStrategy::Stateful(_) => TokenScope::IntentOnly,
        }
    }
}

impl std::fmt::Debug for StateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What the transport should show in response to one interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInstruction {
    /// Screen the user is on after the interaction
    pub screen: Screen,
    pub view: View,
}

#[derive(Debug)]
pub struct Dispatcher {
    catalog: Arc<ExerciseCatalog>,
    renderer: ViewRenderer,
    strategy: StateStrategy,
}

impl Dispatcher {
    pub fn new(catalog: Arc<ExerciseCatalog>, strategy: StateStrategy) -> Self {
        let renderer = ViewRenderer::new(Arc::clone(&catalog), strategy.token_scope());
        Self {
            catalog,
            renderer,
            strategy,
        }
    }

    pub fn stateless(catalog: Arc<ExerciseCatalog>) -> Self {
        Self::new(catalog, StateStrategy::Stateless)
    }

    pub fn stateful(catalog: Arc<ExerciseCatalog>, store: Arc<dyn SessionStore>) -> Self {
        Self::new(catalog, StateStrategy::Stateful(store))
    }

    pub fn strategy(&self) -> &StateStrategy {
        &self.strategy
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    /// `/start`: always the main menu, with the welcome greeting.
    /// Resets the user's session in the stateful strategy.
    pub async fn start(&self, user: UserId, first_name: Option<&str>) -> RenderInstruction {
        let transition = self.machine().start();
        if let StateStrategy::Stateful(store) = &self.strategy {
            store.set(user, transition.screen.to_state()).await;
        }
        tracing::info!(user, strategy = self.strategy.name(), "Session started");

        RenderInstruction {
            view: self.renderer.render_welcome(first_name),
            screen: transition.screen,
        }
    }

    /// Handle a button press carrying `token`
    pub async fn handle(&self, user: UserId, token: &str) -> RenderInstruction {
        let transition = match codec::decode(token) {
            Ok(decoded) => match &self.strategy {
                StateStrategy::Stateless => self.resolve_stateless(&decoded),
                StateStrategy::Stateful(store) => {
                    self.resolve_stateful(store.as_ref(), user, &decoded).await
                }
            },
            Err(e) => {
                tracing::warn!(user, token, error = %e, "Malformed action token");
                let transition = Transition::fallback(NavError::Malformed(e));
                if let StateStrategy::Stateful(store) = &self.strategy {
                    store.set(user, transition.screen.to_state()).await;
                }
                transition
            }
        };

        if let Some(notice) = &transition.notice {
            tracing::warn!(user, token, notice = %notice, "Recovered navigation error");
        }
        tracing::debug!(
            user,
            token,
            screen = transition.screen.name(),
            complete = transition.is_complete(),
            "Handled button press"
        );

        RenderInstruction {
            view: self.renderer.render_transition(&transition),
            screen: transition.screen,
        }
    }

    fn machine(&self) -> StateMachine<'_> {
        StateMachine::new(&self.catalog)
    }

    fn resolve_stateless(&self, decoded: &DecodedToken) -> Transition {
        let missing = NavError::Malformed(DecodeError::MissingState(decoded.action.name()));
        self.machine()
            .apply_to_state(decoded.state.as_ref(), &decoded.action, missing)
    }

    async fn resolve_stateful(
        &self,
        store: &dyn SessionStore,
        user: UserId,
        decoded: &DecodedToken,
    ) -> Transition {
        if decoded.state.is_some() {
            tracing::debug!(user, "Ignoring state carried by token in stateful mode");
        }

        let machine = self.machine();
        let mut outcome: Option<Transition> = None;
        store
            .update(user, &mut |prior: Option<&NavigationState>| {
                let transition =
                    machine.apply_to_state(prior, &decoded.action, NavError::SessionMissing);
                let next = transition.screen.to_state();
                outcome = Some(transition);
                next
            })
            .await;

        outcome.unwrap_or_else(|| Transition::fallback(NavError::SessionMissing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavAction;
    use crate::session::MemorySessionStore;
    use crate::view::{ButtonKind, ViewBody};

    fn catalog() -> Arc<ExerciseCatalog> {
        Arc::new(ExerciseCatalog::builtin().unwrap())
    }

    fn token_for(instruction: &RenderInstruction, kind: ButtonKind) -> String {
        instruction
            .view
            .button(kind)
            .unwrap_or_else(|| panic!("no {kind:?} button on {:?}", instruction.screen))
            .token
            .clone()
    }

    #[tokio::test]
    async fn test_stateless_walkthrough() {
        let dispatcher = Dispatcher::stateless(catalog());

        let start = dispatcher.start(1, Some("Ada")).await;
        assert_eq!(start.screen, Screen::MainMenu);

        let group = dispatcher
            .handle(1, &token_for(&start, ButtonKind::OpenGroup))
            .await;
        let first = dispatcher
            .handle(1, &token_for(&group, ButtonKind::OpenExercise))
            .await;
        assert!(matches!(
            first.view.body,
            ViewBody::Example {
                position: 1,
                total: 50,
                ..
            }
        ));

        let second = dispatcher
            .handle(1, &token_for(&first, ButtonKind::Next))
            .await;
        assert!(matches!(
            second.view.body,
            ViewBody::Example { position: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_stateless_replay_is_idempotent() {
        let dispatcher = Dispatcher::stateless(catalog());
        let token = codec::encode(
            &NavAction::next(),
            Some(&NavigationState::at_example(
                "grammar_variations",
                "paint_the_house",
                3,
            )),
        );
        let a = dispatcher.handle(1, &token).await;
        let b = dispatcher.handle(2, &token).await;
        let c = dispatcher.handle(1, &token).await;
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(matches!(a.screen, Screen::Example { index: 4, .. }));
    }

    #[tokio::test]
    async fn test_malformed_token_renders_main_menu() {
        let dispatcher = Dispatcher::stateless(catalog());
        for token in ["", "nav_3", "v1_n_a_b", "v1_n_a_b_c", "v1_q", "v1_g_%zz"] {
            let result = dispatcher.handle(1, token).await;
            assert_eq!(result.screen, Screen::MainMenu, "token {token:?}");
            assert!(
                matches!(result.view.notice, Some(NavError::Malformed(_))),
                "token {token:?}"
            );
            assert_eq!(result.view.toast(), Some("Invalid action, please restart"));
        }
    }

    #[tokio::test]
    async fn test_stateless_relative_token_without_state() {
        let dispatcher = Dispatcher::stateless(catalog());
        let result = dispatcher.handle(1, "v1_n").await;
        assert_eq!(result.screen, Screen::MainMenu);
        assert_eq!(
            result.view.notice,
            Some(NavError::Malformed(DecodeError::MissingState("next")))
        );
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let dispatcher = Dispatcher::stateless(catalog());
        let result = dispatcher.handle(1, "v1_g_phrasal%5Fverbs").await;
        assert_eq!(result.screen, Screen::MainMenu);
        assert_eq!(
            result.view.notice,
            Some(NavError::GroupNotFound("phrasal_verbs".into()))
        );
    }

    #[tokio::test]
    async fn test_stateful_walkthrough_uses_session() {
        let store = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::stateful(catalog(), store.clone());

        let start = dispatcher.start(9, None).await;
        assert_eq!(store.get(9).await, Some(NavigationState::main_menu()));

        let group = dispatcher
            .handle(9, &token_for(&start, ButtonKind::OpenGroup))
            .await;
        let first = dispatcher
            .handle(9, &token_for(&group, ButtonKind::OpenExercise))
            .await;
        let next_token = token_for(&first, ButtonKind::Next);
        assert_eq!(next_token, "v1_n");

        dispatcher.handle(9, &next_token).await;
        let third = dispatcher.handle(9, &next_token).await;
        assert!(matches!(third.screen, Screen::Example { index: 2, .. }));
        assert_eq!(store.get(9).await.unwrap().example_index(), 2);
    }

    #[tokio::test]
    async fn test_stateful_ignores_token_state() {
        let store = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::stateful(catalog(), store.clone());
        store
            .set(
                5,
                NavigationState::at_example("grammar_variations", "paint_the_house", 10),
            )
            .await;

        let token = codec::encode(
            &NavAction::next(),
            Some(&NavigationState::at_example(
                "grammar_variations",
                "paint_the_house",
                40,
            )),
        );
        let result = dispatcher.handle(5, &token).await;
        assert!(matches!(result.screen, Screen::Example { index: 11, .. }));
    }

    #[tokio::test]
    async fn test_stateful_without_session() {
        let store = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::stateful(catalog(), store.clone());

        let result = dispatcher.handle(3, "v1_n").await;
        assert_eq!(result.screen, Screen::MainMenu);
        assert_eq!(result.view.notice, Some(NavError::SessionMissing));
        assert_eq!(store.get(3).await, Some(NavigationState::main_menu()));

        // Absolute actions work without a prior /start
        let result = dispatcher.handle(4, "v1_g_grammar%5Fvariations").await;
        assert!(result.view.notice.is_none());
        assert!(matches!(result.screen, Screen::GroupMenu { .. }));
    }

    #[tokio::test]
    async fn test_stateful_malformed_resets_session() {
        let store = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::stateful(catalog(), store.clone());
        store
            .set(
                6,
                NavigationState::at_example("grammar_variations", "paint_the_house", 3),
            )
            .await;

        let result = dispatcher.handle(6, "garbage").await;
        assert_eq!(result.screen, Screen::MainMenu);
        assert_eq!(store.get(6).await, Some(NavigationState::main_menu()));
    }
}
