//! Core domain logic for the todo tracker.
//! This crate is the single source of truth for task lifecycle rules.

pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use app::auth_state::{sign_in, sign_out, AuthState};
pub use app::todo_app::TodoApp;
pub use auth::gateway::{AuthError, AuthGateway, AuthResult, SqliteAuthGateway};
pub use auth::session::{AuthEvent, OAuthRequest, Session, SignInValidationError};
pub use clock::{Clock, ManualClock, SystemClock, DAY_MS};
pub use config::ClientConfig;
pub use feed::listeners::{ListenerSet, Subscription};
pub use feed::todo_changes::{ChangeKind, TodoChange, TodoChangeFeed};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status, LogLevel};
pub use model::buckets::TaskBuckets;
pub use model::list::{ListValidationError, TaskList, DEFAULT_LIST_NAME};
pub use model::period::{period_label, PeriodType};
pub use model::task::{
    ListId, NewTask, Task, TaskId, TaskPatch, TaskValidationError, TransitionError, UserId,
    MAX_SNOOZE_DAYS, MIN_SNOOZE_DAYS,
};
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoQuery, TodoRepository};
pub use service::draft::TaskDraft;
pub use service::list_service::{ListService, ListServiceError};
pub use service::todo_service::{
    AddOutcome, SkipReason, SubmitGuard, TodoService, TodoServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
