//! Action token codec
//!
//! Every button carries an opaque token of at most [`MAX_TOKEN_BYTES`] bytes.
//!
//! ## Grammar (version 1)
//!
//! ```text
//! token    := "v1" "_" tag ( "_" field )*
//! tag      := "m" | "g" | "x" | "s" | "n" | "b" | "r"
//! field    := identifier | index
//! ```
//!
//! | tag | action              | fields                         |
//! |-----|---------------------|--------------------------------|
//! | `m` | ReturnToMainMenu    | none                           |
//! | `g` | OpenGroup           | group                          |
//! | `x` | OpenExercise        | group, exercise                |
//! | `s` | ShowExample         | group, exercise, index         |
//! | `n` | Navigate(+1)        | state: none / group / g, e, i  |
//! | `b` | Navigate(-1)        | state: none / group / g, e, i  |
//! | `r` | ReturnToGroupMenu   | state: none / group / g, e, i  |
//!
//! Identifiers are escaped (`%` -> `%25`, `_` -> `%5F`), so the separator never
//! appears inside a field no matter what the catalog ids look like.
//!
//! Decoding never panics; anything outside the grammar is a [`DecodeError`].

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, value},
    multi::separated_list1,
    IResult,
};

use super::action::{NavAction, Step};
use super::state::NavigationState;
use crate::error::DecodeError;

/// Version prefix of every token this codec emits
pub const TOKEN_VERSION: &str = "v1";

/// Largest button payload the chat transport accepts (Telegram `callback_data`)
pub const MAX_TOKEN_BYTES: usize = 64;

const SEPARATOR: char = '_';

/// Result of decoding a token: the intent plus whatever state it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub action: NavAction,
    /// Present only for relative actions rendered by a stateless dispatcher
    pub state: Option<NavigationState>,
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode an action, plus the state it is relative to, into a token.
///
/// `state` is only written for relative actions (`Navigate`,
/// `ReturnToGroupMenu`); a main-menu state is written as no state at all.
pub fn encode(action: &NavAction, state: Option<&NavigationState>) -> String {
    let mut fields: Vec<String> = vec![TOKEN_VERSION.to_string(), action_tag(action).to_string()];

    match action {
        NavAction::OpenGroup { group } => fields.push(escape(group)),
        NavAction::OpenExercise { group, exercise } => {
            fields.push(escape(group));
            fields.push(escape(exercise));
        }
        NavAction::ShowExample {
            group,
            exercise,
            index,
        } => {
            fields.push(escape(group));
            fields.push(escape(exercise));
            fields.push(index.to_string());
        }
        NavAction::Navigate { .. } | NavAction::ReturnToGroupMenu => {
            if let Some(state) = state {
                push_state(&mut fields, state);
            }
        }
        NavAction::ReturnToMainMenu => {}
    }

    fields.join("_")
}

fn push_state(fields: &mut Vec<String>, state: &NavigationState) {
    let Some(group) = state.group_id() else {
        return;
    };
    fields.push(escape(group));
    if let Some(exercise) = state.exercise_id() {
        fields.push(escape(exercise));
        fields.push(state.example_index().to_string());
    }
}

fn action_tag(action: &NavAction) -> &'static str {
    match action {
        NavAction::ReturnToMainMenu => "m",
        NavAction::OpenGroup { .. } => "g",
        NavAction::OpenExercise { .. } => "x",
        NavAction::ShowExample { .. } => "s",
        NavAction::Navigate {
            step: Step::Forward,
        } => "n",
        NavAction::Navigate { step: Step::Back } => "b",
        NavAction::ReturnToGroupMenu => "r",
    }
}

/// Escape an identifier so it can be embedded as a single field
pub fn escape(identifier: &str) -> String {
    identifier.replace('%', "%25").replace(SEPARATOR, "%5F")
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a token received from a button press
pub fn decode(token: &str) -> Result<DecodedToken, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    if token.len() > MAX_TOKEN_BYTES {
        return Err(DecodeError::TooLong(token.len()));
    }

    let fields = split_fields(token)?;
    let (version, kind, rest) = match fields.as_slice() {
        [version, kind, rest @ ..] => (*version, *kind, rest),
        [version] if *version == TOKEN_VERSION => {
            return Err(DecodeError::UnknownAction(String::new()))
        }
        _ => return Err(DecodeError::UnsupportedVersion(token.to_string())),
    };
    if version != TOKEN_VERSION {
        return Err(DecodeError::UnsupportedVersion(token.to_string()));
    }

    let absolute = |action| DecodedToken {
        action,
        state: None,
    };

    match (kind, rest) {
        ("m", []) => Ok(absolute(NavAction::ReturnToMainMenu)),
        ("g", [group]) => Ok(absolute(NavAction::OpenGroup {
            group: identifier(group)?,
        })),
        ("x", [group, exercise]) => Ok(absolute(NavAction::OpenExercise {
            group: identifier(group)?,
            exercise: identifier(exercise)?,
        })),
        ("s", [group, exercise, index]) => Ok(absolute(NavAction::ShowExample {
            group: identifier(group)?,
            exercise: identifier(exercise)?,
            index: example_index(index)?,
        })),
        ("n" | "b" | "r", state_fields) => {
            let action = match kind {
                "n" => NavAction::next(),
                "b" => NavAction::back(),
                _ => NavAction::ReturnToGroupMenu,
            };
            let state = decode_state(action.name(), state_fields)?;
            Ok(DecodedToken { action, state })
        }
        ("m", fields) => Err(field_count("main menu", fields)),
        ("g", fields) => Err(field_count("open group", fields)),
        ("x", fields) => Err(field_count("open exercise", fields)),
        ("s", fields) => Err(field_count("show example", fields)),
        (other, _) => Err(DecodeError::UnknownAction(other.to_string())),
    }
}

fn field_count(action: &'static str, fields: &[&str]) -> DecodeError {
    DecodeError::FieldCount {
        action,
        found: fields.len(),
    }
}

fn decode_state(
    action: &'static str,
    fields: &[&str],
) -> Result<Option<NavigationState>, DecodeError> {
    match fields {
        [] => Ok(None),
        [group] => Ok(Some(NavigationState::group_menu(identifier(group)?))),
        [group, exercise, index] => Ok(Some(NavigationState::at_example(
            identifier(group)?,
            identifier(exercise)?,
            example_index(index)?,
        ))),
        _ => Err(field_count(action, fields)),
    }
}

fn split_fields(token: &str) -> Result<Vec<&str>, DecodeError> {
    let result: IResult<&str, Vec<&str>> =
        all_consuming(separated_list1(char(SEPARATOR), take_while(|c| c != SEPARATOR)))(token);
    result
        .map(|(_, fields)| fields)
        .map_err(|_| DecodeError::UnsupportedVersion(token.to_string()))
}

fn identifier(raw: &str) -> Result<String, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::BlankField);
    }
    let result: IResult<&str, String> = all_consuming(escaped_transform(
        is_not("%"),
        '%',
        alt((value("%", tag("25")), value("_", tag_no_case("5F")))),
    ))(raw);
    result
        .map(|(_, unescaped)| unescaped)
        .map_err(|_| DecodeError::BadEscape(raw.to_string()))
}

fn example_index(raw: &str) -> Result<usize, DecodeError> {
    let result: IResult<&str, usize> =
        all_consuming(map_res(digit1, |digits: &str| digits.parse::<usize>()))(raw);
    result
        .map(|(_, index)| index)
        .map_err(|_| DecodeError::BadIndex(raw.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
