//! End-to-end navigation through the bot runner and the recording transport.
//!
//! Flow:
//! 1. `/start` sends the welcome + main menu
//! 2. Group and exercise buttons open the first example
//! 3. "Next" walks every example, the last one offers "Finish"
//! 4. "Finish" shows the completion screen, "Main Menu" returns home

use std::sync::Arc;

use buildup_bot::bot::BotRunner;
use buildup_bot::navigation::{decode, encode, NavAction, NavigationState, Screen};
use buildup_bot::session::MemorySessionStore;
use buildup_bot::transport::{InboundEvent, RecordingTransport, TransportCall};
use buildup_bot::view::{ButtonKind, View, ViewBody};
use buildup_bot::{Dispatcher, ExerciseCatalog, NavError};

const CHAT: i64 = 100;
const USER: i64 = 7;

const FIVE_ITEM_CATALOG: &str = r#"
groups:
  - id: tenses
    name: Tenses
    description: Five tenses of one sentence.
    exercises:
      - id: paint_house
        title: Paint the house
        examples:
          - { label: "Present Simple", sentence: "She paints her house every summer." }
          - { label: "Present Continuous", sentence: "She is painting her house right now." }
          - { label: "Present Perfect", sentence: "She has just painted her house." }
          - { label: "Past Simple", sentence: "She painted her house last summer." }
          - { label: "Future Simple", sentence: "She will paint her house next month." }
"#;

struct Harness {
    runner: Arc<BotRunner>,
    transport: RecordingTransport,
    message: i64,
}

impl Harness {
    fn new(dispatcher: Dispatcher) -> Self {
        let transport = RecordingTransport::new();
        let runner = Arc::new(BotRunner::new(
            Arc::new(dispatcher),
            Arc::new(transport.clone()),
        ));
        Self {
            runner,
            transport,
            message: 0,
        }
    }

    async fn start(&mut self) -> View {
        self.runner
            .handle_event(InboundEvent::Start {
                chat: CHAT,
                user: USER,
                first_name: Some("Ada".into()),
            })
            .await
            .unwrap();
        let calls = self.transport.take().await;
        match calls.as_slice() {
            [TransportCall::Send { message, view, .. }] => {
                self.message = *message;
                view.clone()
            }
            other => panic!("unexpected calls after /start: {other:?}"),
        }
    }

    async fn press_token(&self, token: &str) -> View {
        self.runner
            .handle_event(InboundEvent::ButtonPress {
                callback_id: format!("cb-{token}"),
                chat: CHAT,
                message: self.message,
                user: USER,
                token: token.to_string(),
            })
            .await
            .unwrap();
        let calls = self.transport.take().await;
        match calls.as_slice() {
            [TransportCall::Ack { .. }, TransportCall::Edit { message, view, .. }] => {
                assert_eq!(*message, self.message);
                view.clone()
            }
            other => panic!("unexpected calls after press: {other:?}"),
        }
    }

    async fn press(&self, view: &View, kind: ButtonKind) -> View {
        let button = view
            .button(kind)
            .unwrap_or_else(|| panic!("no {kind:?} button in {view:?}"));
        self.press_token(&button.token).await
    }
}

fn example_position(view: &View) -> Option<(usize, usize)> {
    match view.body {
        ViewBody::Example {
            position, total, ..
        } => Some((position, total)),
        _ => None,
    }
}

async fn walk_to_completion(harness: &mut Harness, expected_total: usize) {
    let menu = harness.start().await;
    assert!(matches!(
        menu.body,
        ViewBody::MainMenu {
            welcome: Some(_),
            ..
        }
    ));

    let group = harness.press(&menu, ButtonKind::OpenGroup).await;
    assert!(matches!(group.body, ViewBody::GroupMenu { .. }));

    let mut view = harness.press(&group, ButtonKind::OpenExercise).await;
    assert_eq!(example_position(&view), Some((1, expected_total)));
    assert!(view.has_button(ButtonKind::Next));
    assert!(!view.has_button(ButtonKind::Back));

    for step in 2..=expected_total {
        view = harness.press(&view, ButtonKind::Next).await;
        assert_eq!(example_position(&view), Some((step, expected_total)));
        assert!(view.has_button(ButtonKind::Back));
    }
    assert!(view.has_button(ButtonKind::Finish));
    assert!(!view.has_button(ButtonKind::Next));

    let done = harness.press(&view, ButtonKind::Finish).await;
    assert_eq!(
        done.body,
        ViewBody::Completed {
            exercise_title: match &view.body {
                ViewBody::Example { exercise_title, .. } => exercise_title.clone(),
                _ => unreachable!(),
            },
            total: expected_total,
        }
    );

    let home = harness.press(&done, ButtonKind::MainMenu).await;
    assert!(matches!(
        home.body,
        ViewBody::MainMenu { welcome: None, .. }
    ));
    assert!(home.notice.is_none());
}

#[tokio::test]
async fn test_full_walkthrough_stateless() {
    let catalog = Arc::new(ExerciseCatalog::builtin().unwrap());
    let total = catalog.example_count();
    let mut harness = Harness::new(Dispatcher::stateless(catalog));
    walk_to_completion(&mut harness, total).await;
}

#[tokio::test]
async fn test_full_walkthrough_stateful() {
    let catalog = Arc::new(ExerciseCatalog::builtin().unwrap());
    let total = catalog.example_count();
    let store = Arc::new(MemorySessionStore::default());
    let mut harness = Harness::new(Dispatcher::stateful(catalog, store));
    walk_to_completion(&mut harness, total).await;
}

#[tokio::test]
async fn test_five_item_catalog_visits_each_index_once() {
    let catalog = Arc::new(ExerciseCatalog::from_yaml_str(FIVE_ITEM_CATALOG).unwrap());
    let dispatcher = Dispatcher::stateless(catalog);

    let mut token = encode(
        &NavAction::ShowExample {
            group: "tenses".into(),
            exercise: "paint_house".into(),
            index: 0,
        },
        None,
    );
    let mut screens = Vec::new();
    let first = dispatcher.handle(USER, &token).await;
    assert!(matches!(
        &first.view.body,
        ViewBody::Example { label, .. } if label == "Present Simple"
    ));
    let mut current = first;
    for _ in 0..5 {
        let next = current
            .view
            .button(ButtonKind::Next)
            .or_else(|| current.view.button(ButtonKind::Finish))
            .expect("forward button")
            .token
            .clone();
        token = next;
        current = dispatcher.handle(USER, &token).await;
        screens.push(current.screen.clone());
    }

    let indices: Vec<Option<usize>> = screens
        .iter()
        .map(|screen| match screen {
            Screen::Example { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![Some(1), Some(2), Some(3), Some(4), None]);
    assert!(screens[4].is_completed());

    // Completed is sticky under further forward presses
    let again = encode(&NavAction::next(), Some(&screens[4].to_state()));
    let still = dispatcher.handle(USER, &again).await;
    assert!(still.screen.is_completed());
}

#[tokio::test]
async fn test_render_shows_every_example_in_order() {
    let catalog = Arc::new(ExerciseCatalog::from_yaml_str(FIVE_ITEM_CATALOG).unwrap());
    let exercise = catalog.get("tenses", "paint_house").unwrap().clone();
    let dispatcher = Dispatcher::stateless(catalog);

    for (i, example) in exercise.examples.iter().enumerate() {
        let token = encode(
            &NavAction::ShowExample {
                group: "tenses".into(),
                exercise: "paint_house".into(),
                index: i,
            },
            None,
        );
        let result = dispatcher.handle(USER, &token).await;
        match result.view.body {
            ViewBody::Example {
                label,
                sentence,
                position,
                total,
                ..
            } => {
                assert_eq!(label, example.label);
                assert_eq!(sentence, example.sentence);
                assert_eq!((position, total), (i + 1, 5));
            }
            other => panic!("expected example view, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_malformed_tokens_never_break_the_session() {
    let catalog = Arc::new(ExerciseCatalog::builtin().unwrap());
    let mut harness = Harness::new(Dispatcher::stateless(catalog));
    harness.start().await;

    for token in ["", "nav_", "nav_abc", "v1_s_a_b", "v1_s_a_b_-1", "v2_m", "v1_n_a_b_99999999999999999999999"] {
        let view = harness.press_token(token).await;
        assert!(
            matches!(view.body, ViewBody::MainMenu { .. }),
            "token {token:?} rendered {view:?}"
        );
        assert!(
            matches!(view.notice, Some(NavError::Malformed(_))),
            "token {token:?}"
        );
    }
}

#[tokio::test]
async fn test_out_of_range_index_is_clamped_to_completed() {
    let catalog = Arc::new(ExerciseCatalog::builtin().unwrap());
    let total = catalog.example_count();
    let dispatcher = Dispatcher::stateless(catalog);

    let token = encode(
        &NavAction::back(),
        Some(&NavigationState::at_example(
            "grammar_variations",
            "paint_the_house",
            total + 40,
        )),
    );
    assert!(decode(&token).is_ok());
    let result = dispatcher.handle(USER, &token).await;
    assert!(result.screen.is_completed());
}
