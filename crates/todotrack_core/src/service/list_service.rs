//! List use-case service.
//!
//! # Invariants
//! - A signed-in user always ends up with at least one list.
//! - Fetched lists are de-duplicated by id, first occurrence wins.

use crate::clock::Clock;
use crate::model::list::{dedupe_lists, ListValidationError, TaskList, DEFAULT_LIST_NAME};
use crate::repo::list_repo::ListRepository;
use crate::repo::todo_repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for list use-cases.
#[derive(Debug)]
pub enum ListServiceError {
    InvalidName(ListValidationError),
    Repo(RepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListValidation(err) => Self::InvalidName(err),
            other => Self::Repo(other),
        }
    }
}

/// List service facade over a list table and a clock.
pub struct ListService<R: ListRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: ListRepository, C: Clock> ListService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Lists in creation order without duplicates.
    pub fn fetch_lists(&self) -> Result<Vec<TaskList>, ListServiceError> {
        Ok(dedupe_lists(self.repo.list_lists()?))
    }

    /// Fetches lists, creating the default list when none exist.
    pub fn ensure_default_list(&self) -> Result<Vec<TaskList>, ListServiceError> {
        let lists = self.fetch_lists()?;
        if !lists.is_empty() {
            return Ok(lists);
        }

        let created = self
            .repo
            .insert_list(DEFAULT_LIST_NAME, self.clock.now_ms())?;
        info!(
            "event=list_default_create module=service status=ok list_id={}",
            created.id
        );
        Ok(vec![created])
    }

    /// Creates a list named `name` (trimmed, non-blank).
    pub fn create_list(&self, name: &str) -> Result<TaskList, ListServiceError> {
        Ok(self.repo.insert_list(name, self.clock.now_ms())?)
    }
}
