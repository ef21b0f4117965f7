//! Signed-in application state.
//!
//! # Responsibility
//! - Hold session, lists, active list selection, the active list snapshot
//!   and the add-task draft as one explicit state value.
//! - Apply the client failure policy: log, keep prior state, stay usable.
//! - Reconcile with the backend by full re-fetch on change notifications.
//!
//! # Invariants
//! - `snapshot` only ever holds todos of `active_list_id`.
//! - The change subscription always targets `active_list_id`.
//! - Active list selection is never persisted.

use crate::auth::session::Session;
use crate::clock::Clock;
use crate::feed::listeners::Subscription;
use crate::feed::todo_changes::{TodoChange, TodoChangeFeed};
use crate::model::buckets::TaskBuckets;
use crate::model::list::TaskList;
use crate::model::task::{ListId, Task, TaskId};
use crate::repo::list_repo::ListRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::service::draft::TaskDraft;
use crate::service::list_service::ListService;
use crate::service::todo_service::{AddOutcome, SkipReason, TodoService, TodoServiceError};
use log::{debug, error, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// Client state for one signed-in session.
pub struct TodoApp<'feed, L, T, C>
where
    L: ListRepository,
    T: TodoRepository,
    C: Clock,
{
    session: Session,
    list_service: ListService<L, C>,
    todo_service: TodoService<T, C>,
    feed: &'feed TodoChangeFeed,
    lists: Vec<TaskList>,
    active_list_id: Option<ListId>,
    snapshot: Vec<Task>,
    draft: TaskDraft,
    change_sender: Sender<TodoChange>,
    changes: Receiver<TodoChange>,
    subscription: Option<Subscription>,
}

impl<'feed, L, T, C> TodoApp<'feed, L, T, C>
where
    L: ListRepository,
    T: TodoRepository,
    C: Clock,
{
    pub fn new(
        session: Session,
        list_service: ListService<L, C>,
        todo_service: TodoService<T, C>,
        feed: &'feed TodoChangeFeed,
    ) -> Self {
        let (change_sender, changes) = channel();
        Self {
            session,
            list_service,
            todo_service,
            feed,
            lists: Vec::new(),
            active_list_id: None,
            snapshot: Vec::new(),
            draft: TaskDraft::default(),
            change_sender,
            changes,
            subscription: None,
        }
    }

    /// Loads lists (creating the default one) and opens the first list.
    pub fn bootstrap(&mut self) {
        match self.list_service.ensure_default_list() {
            Ok(lists) => {
                self.lists = lists;
                if let Some(first) = self.lists.first().map(|list| list.id) {
                    self.open_list(first);
                }
            }
            Err(err) => {
                error!("event=lists_fetch module=app status=error error={err}");
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub fn active_list(&self) -> Option<&TaskList> {
        let active = self.active_list_id?;
        self.lists.iter().find(|list| list.id == active)
    }

    pub fn active_list_id(&self) -> Option<ListId> {
        self.active_list_id
    }

    /// Todos of the active list in backend order.
    pub fn todos(&self) -> &[Task] {
        &self.snapshot
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.snapshot.iter().find(|task| task.id == id)
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.todo_service.is_submitting()
    }

    pub fn now_ms(&self) -> i64 {
        self.todo_service.now_ms()
    }

    /// Partitions the snapshot as of the service clock.
    pub fn buckets(&self) -> TaskBuckets {
        TaskBuckets::partition(&self.snapshot, self.now_ms())
    }

    /// Switches the active list. Returns `false` for unknown ids.
    pub fn select_list(&mut self, list_id: ListId) -> bool {
        if !self.lists.iter().any(|list| list.id == list_id) {
            warn!("event=list_select module=app status=rejected list_id={list_id}");
            return false;
        }
        self.open_list(list_id);
        true
    }

    /// Switches to the first list whose name matches, ignoring case.
    pub fn select_list_by_name(&mut self, name: &str) -> bool {
        let wanted = name.trim();
        let found = self
            .lists
            .iter()
            .find(|list| list.name.eq_ignore_ascii_case(wanted))
            .map(|list| list.id);
        match found {
            Some(list_id) => self.select_list(list_id),
            None => {
                warn!("event=list_select module=app status=rejected reason=unknown_name");
                false
            }
        }
    }

    /// Creates a list, appends it and makes it active.
    pub fn create_list(&mut self, name: &str) -> Option<ListId> {
        match self.list_service.create_list(name) {
            Ok(list) => {
                let list_id = list.id;
                self.lists.push(list);
                self.open_list(list_id);
                Some(list_id)
            }
            Err(err) => {
                error!("event=list_create module=app status=error error={err}");
                None
            }
        }
    }

    /// Submits the draft to the active list.
    ///
    /// On success the draft resets and the list is re-fetched. Skipped and
    /// failed submissions keep the draft as typed.
    pub fn submit_draft(&mut self) -> Option<Task> {
        let list_id = self.active_list_id?;
        match self.todo_service.add_task(list_id, &self.draft) {
            Ok(AddOutcome::Created(task)) => {
                self.draft.reset();
                self.refresh();
                Some(task)
            }
            Ok(AddOutcome::Skipped(reason)) => {
                debug!(
                    "event=todo_add module=app status=skipped reason={}",
                    skip_reason_label(reason)
                );
                None
            }
            Err(err) => {
                error!("event=todo_add module=app status=error error={err}");
                None
            }
        }
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        self.mutate("todo_toggle", id, |service, task| {
            service.toggle_complete(task).map(|_| ())
        })
    }

    /// Snoozes an open, unsnoozed task. Completed or already snoozed tasks
    /// are rejected without a write.
    pub fn snooze(&mut self, id: TaskId, days: u32) -> bool {
        if let Some(task) = self.find_task(id) {
            let blocked = if task.is_completed {
                Some("completed")
            } else if task.is_snoozed {
                Some("already_snoozed")
            } else {
                None
            };
            if let Some(reason) = blocked {
                warn!("event=todo_snooze module=app status=rejected reason={reason} todo_id={id}");
                return false;
            }
        }
        self.mutate("todo_snooze", id, |service, task| {
            service.snooze(task, days).map(|_| ())
        })
    }

    pub fn unsnooze(&mut self, id: TaskId) -> bool {
        self.mutate("todo_unsnooze", id, |service, task| {
            service.unsnooze(task).map(|_| ())
        })
    }

    /// Deletes a todo and drops it from the snapshot without re-fetching.
    pub fn delete(&mut self, id: TaskId) -> bool {
        match self.todo_service.delete(id) {
            Ok(()) => {
                self.snapshot.retain(|task| task.id != id);
                true
            }
            Err(err) => {
                error!("event=todo_delete module=app status=error todo_id={id} error={err}");
                false
            }
        }
    }

    /// Re-fetches the active list; on failure the snapshot is kept.
    pub fn refresh(&mut self) {
        let Some(list_id) = self.active_list_id else {
            return;
        };
        match self.todo_service.fetch_todos(list_id) {
            Ok(todos) => self.snapshot = todos,
            Err(err) => {
                error!("event=todos_fetch module=app status=error list_id={list_id} error={err}");
            }
        }
    }

    /// Drains change notifications and re-fetches once if any concern the
    /// active list. Returns the number of notifications drained.
    pub fn pump_changes(&mut self) -> usize {
        let mut drained = 0;
        let mut stale = false;
        while let Ok(change) = self.changes.try_recv() {
            drained += 1;
            stale |= Some(change.list_id) == self.active_list_id;
        }
        if stale {
            self.refresh();
        }
        drained
    }

    fn open_list(&mut self, list_id: ListId) {
        self.active_list_id = Some(list_id);
        self.draft.reset();
        self.snapshot.clear();

        self.subscription = None;
        let sender = Mutex::new(self.change_sender.clone());
        self.subscription = Some(self.feed.subscribe_list(list_id, move |change| {
            if let Ok(sender) = sender.lock() {
                let _ = sender.send(*change);
            }
        }));
        self.refresh();
    }

    fn mutate(
        &mut self,
        event: &str,
        id: TaskId,
        apply: impl FnOnce(&TodoService<T, C>, &Task) -> Result<(), TodoServiceError>,
    ) -> bool {
        let Some(task) = self.find_task(id).cloned() else {
            warn!("event={event} module=app status=rejected reason=unknown_todo todo_id={id}");
            return false;
        };
        match apply(&self.todo_service, &task) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                error!("event={event} module=app status=error todo_id={id} error={err}");
                false
            }
        }
    }
}

fn skip_reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::BlankTitle => "blank_title",
        SkipReason::SubmitInFlight => "submit_in_flight",
    }
}
