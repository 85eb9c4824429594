//! Load-time catalog checks.
//!
//! After these pass, every exercise has at least one example, ids are unique
//! where they are looked up, and every token the renderer can emit fits in a
//! button payload.

use std::collections::HashSet;

use lesson_types::{Exercise, Group};

use crate::error::CatalogError;
use crate::navigation::codec::{self, MAX_TOKEN_BYTES};
use crate::navigation::{NavAction, NavigationState};

pub(super) fn validate_groups(groups: &[Group]) -> Result<(), CatalogError> {
    if groups.is_empty() {
        return Err(CatalogError::NoGroups);
    }

    let mut group_ids = HashSet::new();
    for group in groups {
        if group.id.trim().is_empty() {
            return Err(CatalogError::BlankId {
                context: format!("group '{}'", group.name),
            });
        }
        if !group_ids.insert(group.id.as_str()) {
            return Err(CatalogError::DuplicateGroup(group.id.clone()));
        }
        if group.exercises.is_empty() {
            return Err(CatalogError::EmptyGroup(group.id.clone()));
        }

        let mut exercise_ids = HashSet::new();
        for exercise in &group.exercises {
            if exercise.id.trim().is_empty() {
                return Err(CatalogError::BlankId {
                    context: format!("exercise '{}' of group '{}'", exercise.title, group.id),
                });
            }
            if !exercise_ids.insert(exercise.id.as_str()) {
                return Err(CatalogError::DuplicateExercise {
                    group: group.id.clone(),
                    exercise: exercise.id.clone(),
                });
            }
            if exercise.is_empty() {
                return Err(CatalogError::EmptyExercise {
                    group: group.id.clone(),
                    exercise: exercise.id.clone(),
                });
            }
            check_token_budget(group, exercise)?;
        }
    }

    Ok(())
}

/// The longest tokens for an exercise are the state-carrying ones at its last
/// positions; if those fit, every token for it fits.
fn check_token_budget(group: &Group, exercise: &Exercise) -> Result<(), CatalogError> {
    let total = exercise.len();
    let candidates = [
        codec::encode(
            &NavAction::next(),
            Some(&NavigationState::at_example(&group.id, &exercise.id, total)),
        ),
        codec::encode(
            &NavAction::ShowExample {
                group: group.id.clone(),
                exercise: exercise.id.clone(),
                index: total,
            },
            None,
        ),
    ];

    let longest = candidates.iter().map(String::len).max().unwrap_or(0);
    if longest > MAX_TOKEN_BYTES {
        return Err(CatalogError::TokenTooLong {
            group: group.id.clone(),
            exercise: exercise.id.clone(),
            len: longest,
            limit: MAX_TOKEN_BYTES,
        });
    }
    Ok(())
}
