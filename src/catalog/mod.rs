//! Exercise catalog
//!
//! Static registry of groups -> exercises -> ordered examples. Loaded once at
//! startup from YAML (the built-in `data/catalog.yaml` or an operator file),
//! validated, then shared read-only behind an `Arc`.
//!
//! Lookups return `NavError` for missing references instead of failing hard;
//! callers render a "not found" notice.

mod validate;

use std::path::Path;

use lesson_types::{Exercise, ExerciseSummary, Group, GroupSummary};
use serde::Deserialize;

use crate::error::{CatalogError, NavError};

/// The built-in lesson content
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// On-disk schema of a catalog file
#[derive(Debug, Deserialize)]
struct CatalogFile {
    groups: Vec<Group>,
}

/// Read-only lesson registry
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    groups: Vec<Group>,
}

impl ExerciseCatalog {
    /// Build a catalog from groups, rejecting anything the navigator could not
    /// serve (empty exercises, duplicate ids, ids too long for a button)
    pub fn new(groups: Vec<Group>) -> Result<Self, CatalogError> {
        validate::validate_groups(&groups)?;
        Ok(Self { groups })
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.groups)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        tracing::info!(
            path = %path.display(),
            groups = catalog.groups.len(),
            "Loaded catalog file"
        );
        Ok(catalog)
    }

    /// Look up a group by id
    pub fn group(&self, group_id: &str) -> Result<&Group, NavError> {
        self.groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| NavError::GroupNotFound(group_id.to_string()))
    }

    /// Look up an exercise by group and exercise id
    pub fn get(&self, group_id: &str, exercise_id: &str) -> Result<&Exercise, NavError> {
        self.group(group_id)?
            .exercise(exercise_id)
            .ok_or_else(|| NavError::ExerciseNotFound {
                group: group_id.to_string(),
                exercise: exercise_id.to_string(),
            })
    }

    /// Main-menu listing, in catalog order
    pub fn list_groups(&self) -> Vec<GroupSummary> {
        self.groups.iter().map(Group::summary).collect()
    }

    /// Group-menu listing, in catalog order
    pub fn list_exercises(&self, group_id: &str) -> Result<Vec<ExerciseSummary>, NavError> {
        Ok(self
            .group(group_id)?
            .exercises
            .iter()
            .map(Exercise::summary)
            .collect())
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Total number of examples across every exercise
    pub fn example_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.exercises.iter())
            .map(Exercise::len)
            .sum()
    }
}
