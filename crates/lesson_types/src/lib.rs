//! Lesson Types - Foundation Types for the Grammar Catalog
//!
//! This crate contains the pure data structures the lesson catalog is made of.
//! The catalog file deserializes straight into these types; everything that
//! interprets them (lookup, validation, navigation) lives in the bot crate.
//!
//! ## Hierarchy
//!
//! ```text
//! Group ──► Exercise ──► Example (label, sentence)
//! ```
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - Only data structures, constructors and accessors
//! 2. **NO WORKSPACE DEPENDENCIES** - Cannot depend on other workspace crates
//! 3. **SERIALIZABLE** - All types support serde

use serde::{Deserialize, Serialize};

// ============================================================================
// EXAMPLES
// ============================================================================

/// One grammatical form of the base sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Name of the grammatical form, e.g. "Present Perfect"
    pub label: String,
    /// The illustrative sentence written in that form
    pub sentence: String,
}

impl Example {
    pub fn new(label: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sentence: sentence.into(),
        }
    }
}

// ============================================================================
// EXERCISES
// ============================================================================

/// A named, ordered walk through examples.
///
/// The order of `examples` is the traversal order; indices are 0-based and dense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub examples: Vec<Example>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, title: impl Into<String>, examples: Vec<Example>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            examples,
        }
    }

    /// Attach a description shown on the group menu
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Number of examples in the exercise
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Example at a 0-based position, if in range
    pub fn example(&self, index: usize) -> Option<&Example> {
        self.examples.get(index)
    }

    pub fn summary(&self) -> ExerciseSummary {
        ExerciseSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            example_count: self.examples.len(),
        }
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// A named collection of exercises. Exercise order is menu order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub exercises: Vec<Exercise>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            exercises,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Look up an exercise by id
    pub fn exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            exercise_count: self.exercises.len(),
        }
    }
}

// ============================================================================
// MENU SUMMARIES
// ============================================================================

/// What the main menu needs to know about a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub exercise_count: usize,
}

/// What the group menu needs to know about an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub example_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> Group {
        Group::new(
            "grammar",
            "Grammar",
            vec![Exercise::new(
                "house",
                "House",
                vec![
                    Example::new("Present Simple", "She paints her house."),
                    Example::new("Past Simple", "She painted her house."),
                ],
            )],
        )
    }

    #[test]
    fn test_exercise_lookup_and_summary() {
        let group = sample_group();
        let exercise = group.exercise("house").unwrap();
        assert_eq!(exercise.len(), 2);
        assert_eq!(exercise.example(1).unwrap().label, "Past Simple");
        assert!(exercise.example(2).is_none());
        assert!(group.exercise("garden").is_none());

        let summary = exercise.summary();
        assert_eq!(summary.example_count, 2);
        assert_eq!(summary.description, exercise.description);
        assert_eq!(group.summary().exercise_count, 1);
    }

    #[test]
    fn test_description_defaults_to_empty() {
        let json = r#"{"id":"g","name":"G","exercises":[]}"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert!(group.description.is_empty());
    }
}
