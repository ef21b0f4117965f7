//! Task list model.
//!
//! # Invariants
//! - `name` is non-blank after trim.
//! - A list is owned by exactly one user.

use crate::model::task::{ListId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name given to the list created for a user who has none.
pub const DEFAULT_LIST_NAME: &str = "My Tasks";

/// Named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: ListId,
    pub name: String,
    pub user_id: UserId,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Validation failures for list rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    NilId,
    BlankName,
}

impl Display for ListValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "list id must not be nil"),
            Self::BlankName => write!(f, "list name must not be blank"),
        }
    }
}

impl Error for ListValidationError {}

impl TaskList {
    pub fn validate(&self) -> Result<(), ListValidationError> {
        if self.id.is_nil() {
            return Err(ListValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ListValidationError::BlankName);
        }
        Ok(())
    }
}

/// Trims a list name, rejecting blank input.
pub fn normalize_list_name(name: &str) -> Result<String, ListValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ListValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Drops repeated ids, keeping the first occurrence and the input order.
pub fn dedupe_lists(lists: Vec<TaskList>) -> Vec<TaskList> {
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .filter(|list| seen.insert(list.id))
        .collect()
}
