//! Todo use-case service.
//!
//! # Responsibility
//! - Run lifecycle transitions against the todo table.
//! - Guard add-task submission against re-entrant double submits.
//!
//! # Invariants
//! - Every transition uses the service clock for `now`.
//! - At most one add-task submission is outstanding at a time.

use crate::clock::Clock;
use crate::model::task::{ListId, Task, TaskId, TaskPatch, TransitionError};
use crate::repo::todo_repo::{RepoError, RepoResult, TodoQuery, TodoRepository};
use crate::service::draft::TaskDraft;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Transition input rejected before reaching the backend.
    Transition(TransitionError),
    /// Target todo does not exist for the current user.
    TodoNotFound(TaskId),
    Repo(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transition(err) => write!(f, "{err}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TodoNotFound(_) => None,
        }
    }
}

impl From<TransitionError> for TodoServiceError {
    fn from(value: TransitionError) -> Self {
        Self::Transition(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                table: "todos",
                id,
            } => Self::TodoNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Result of an add-task submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(Task),
    /// Nothing was sent to the backend.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlankTitle,
    SubmitInFlight,
}

/// Marks an add-task submission as outstanding until dropped.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Todo service facade over a todo table and a clock.
pub struct TodoService<R: TodoRepository, C: Clock> {
    repo: R,
    clock: C,
    submitting: Cell<bool>,
}

impl<R: TodoRepository, C: Clock> TodoService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self {
            repo,
            clock,
            submitting: Cell::new(false),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Whether an add-task submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    /// Claims the submission slot, or `None` when one is already held.
    pub fn begin_submit(&self) -> Option<SubmitGuard<'_>> {
        if self.submitting.replace(true) {
            return None;
        }
        Some(SubmitGuard {
            flag: &self.submitting,
        })
    }

    /// Fetches all todos of one list in backend order.
    pub fn fetch_todos(&self, list_id: ListId) -> RepoResult<Vec<Task>> {
        self.repo.list_todos(&TodoQuery::for_list(list_id))
    }

    pub fn get_todo(&self, id: TaskId) -> Result<Task, TodoServiceError> {
        self.repo
            .get_todo(id)?
            .ok_or(TodoServiceError::TodoNotFound(id))
    }

    /// Submits a draft to `list_id`.
    ///
    /// Blank titles and submissions made while another one is outstanding
    /// are skipped without contacting the backend.
    pub fn add_task(
        &self,
        list_id: ListId,
        draft: &TaskDraft,
    ) -> Result<AddOutcome, TodoServiceError> {
        let Some(new_task) = draft.to_new_task(list_id, self.now_ms()) else {
            return Ok(AddOutcome::Skipped(SkipReason::BlankTitle));
        };
        let Some(_guard) = self.begin_submit() else {
            return Ok(AddOutcome::Skipped(SkipReason::SubmitInFlight));
        };

        let created = self.repo.insert_todo(new_task)?;
        Ok(AddOutcome::Created(created))
    }

    /// Flips completion and returns the applied patch.
    pub fn toggle_complete(&self, task: &Task) -> Result<TaskPatch, TodoServiceError> {
        let patch = task.toggle_complete(self.now_ms());
        self.repo.update_todo(task.id, &patch)?;
        Ok(patch)
    }

    /// Snoozes for `days` (1..=365) and returns the applied patch.
    pub fn snooze(&self, task: &Task, days: u32) -> Result<TaskPatch, TodoServiceError> {
        let patch = task.snooze(days, self.now_ms())?;
        self.repo.update_todo(task.id, &patch)?;
        Ok(patch)
    }

    pub fn unsnooze(&self, task: &Task) -> Result<TaskPatch, TodoServiceError> {
        let patch = task.unsnooze();
        self.repo.update_todo(task.id, &patch)?;
        Ok(patch)
    }

    /// Permanently deletes one todo.
    pub fn delete(&self, id: TaskId) -> Result<(), TodoServiceError> {
        self.repo.delete_todo(id)?;
        Ok(())
    }
}
