//! Change notifications for the `todos` table.
//!
//! # Invariants
//! - Every successful todo insert/update/delete emits exactly one event.
//! - Subscribers filter by `list_id`; events carry no row payload, callers
//!   re-fetch the list.

use crate::feed::listeners::{ListenerSet, Subscription};
use crate::model::task::{ListId, TaskId};

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// One change on the `todos` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoChange {
    pub kind: ChangeKind,
    pub list_id: ListId,
    pub todo_id: TaskId,
}

/// Push channel for todo changes, shared by writers and subscribers.
#[derive(Default)]
pub struct TodoChangeFeed {
    listeners: ListenerSet<TodoChange>,
}

impl TodoChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every change on todos of `list_id`.
    pub fn subscribe_list(
        &self,
        list_id: ListId,
        listener: impl Fn(&TodoChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners
            .subscribe_filtered(move |change: &TodoChange| change.list_id == list_id, listener)
    }

    pub fn publish(&self, change: TodoChange) {
        log::debug!(
            "event=todo_change module=feed kind={} list_id={} todo_id={}",
            change.kind.as_str(),
            change.list_id,
            change.todo_id
        );
        self.listeners.emit(&change);
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}
