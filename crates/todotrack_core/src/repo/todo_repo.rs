//! Todo table contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide select/insert/update/delete over the `todos` table.
//! - Publish one change event per successful write.
//!
//! # Invariants
//! - Rows are only visible to, and writable by, their owning user.
//! - Updates are applied column-wise by id; last write wins.
//! - Deletes are permanent.

use crate::db::{ensure_schema_ready, DbError};
use crate::feed::todo_changes::{ChangeKind, TodoChange, TodoChangeFeed};
use crate::model::list::ListValidationError;
use crate::model::period::PeriodType;
use crate::model::task::{ListId, NewTask, Task, TaskId, TaskPatch, TaskValidationError, UserId};
use crate::repo::sql::{bool_to_int, read_bool, read_uuid};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    list_id,
    user_id,
    is_completed,
    completed_at,
    created_at,
    is_periodic,
    period_type,
    period_days,
    is_snoozed,
    snoozed_until
FROM todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by list and todo tables.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    ListValidation(ListValidationError),
    Db(DbError),
    NotFound { table: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ListValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ListValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ListValidationError> for RepoError {
    fn from(value: ListValidationError) -> Self {
        Self::ListValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter for todo selects.
///
/// Results are ordered `is_completed ASC, created_at DESC, id ASC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQuery {
    pub list_id: ListId,
    /// Restrict to completed (`Some(true)`) or open (`Some(false)`) rows.
    pub completed: Option<bool>,
}

impl TodoQuery {
    pub fn for_list(list_id: ListId) -> Self {
        Self {
            list_id,
            completed: None,
        }
    }
}

/// Table interface for todos.
pub trait TodoRepository {
    fn list_todos(&self, query: &TodoQuery) -> RepoResult<Vec<Task>>;
    fn get_todo(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Inserts a row and returns it as stored.
    fn insert_todo(&self, new_task: NewTask) -> RepoResult<Task>;
    /// Applies `patch` to the row with `id`.
    fn update_todo(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()>;
    /// Permanently removes the row with `id`.
    fn delete_todo(&self, id: TaskId) -> RepoResult<()>;
}

impl<R: TodoRepository + ?Sized> TodoRepository for &R {
    fn list_todos(&self, query: &TodoQuery) -> RepoResult<Vec<Task>> {
        (**self).list_todos(query)
    }

    fn get_todo(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_todo(id)
    }

    fn insert_todo(&self, new_task: NewTask) -> RepoResult<Task> {
        (**self).insert_todo(new_task)
    }

    fn update_todo(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        (**self).update_todo(id, patch)
    }

    fn delete_todo(&self, id: TaskId) -> RepoResult<()> {
        (**self).delete_todo(id)
    }
}

/// SQLite-backed todo table scoped to one user.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
    feed: Option<&'conn TodoChangeFeed>,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Builds a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection, owner: UserId) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            owner,
            feed: None,
        })
    }

    /// Publishes change events for every successful write to `feed`.
    pub fn with_change_feed(mut self, feed: &'conn TodoChangeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    fn publish(&self, kind: ChangeKind, list_id: ListId, todo_id: TaskId) {
        if let Some(feed) = self.feed {
            feed.publish(TodoChange {
                kind,
                list_id,
                todo_id,
            });
        }
    }

    fn ensure_list_owned(&self, list_id: ListId) -> RepoResult<()> {
        let owned: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?1 AND user_id = ?2);",
            params![list_id.to_string(), self.owner.to_string()],
            |row| row.get(0),
        )?;
        if !owned {
            return Err(RepoError::NotFound {
                table: "lists",
                id: list_id,
            });
        }
        Ok(())
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn list_todos(&self, query: &TodoQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE user_id = ? AND list_id = ?");
        let mut bind_values = vec![
            Value::Text(self.owner.to_string()),
            Value::Text(query.list_id.to_string()),
        ];

        if let Some(completed) = query.completed {
            sql.push_str(" AND is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        sql.push_str(" ORDER BY is_completed ASC, created_at DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn get_todo(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn insert_todo(&self, new_task: NewTask) -> RepoResult<Task> {
        let mut task = new_task.into_task(Uuid::new_v4(), self.owner);
        task.title = task.title.trim().to_string();
        task.validate()?;
        self.ensure_list_owned(task.list_id)?;

        self.conn.execute(
            "INSERT INTO todos (
                id,
                title,
                list_id,
                user_id,
                is_completed,
                completed_at,
                created_at,
                is_periodic,
                period_type,
                period_days,
                is_snoozed,
                snoozed_until
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.list_id.to_string(),
                task.user_id.to_string(),
                bool_to_int(task.is_completed),
                task.completed_at,
                task.created_at,
                bool_to_int(task.is_periodic),
                task.period_type.map(PeriodType::as_str),
                task.period_days,
                bool_to_int(task.is_snoozed),
                task.snoozed_until,
            ],
        )?;

        self.publish(ChangeKind::Insert, task.list_id, task.id);
        Ok(task)
    }

    fn update_todo(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        let mut current = self.get_todo(id)?.ok_or(RepoError::NotFound {
            table: "todos",
            id,
        })?;
        if patch.is_empty() {
            return Ok(());
        }
        current.apply_patch(patch);
        current.validate()?;

        let mut assignments = Vec::new();
        let mut bind_values = Vec::new();
        if let Some(value) = patch.is_completed {
            assignments.push("is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(value)));
        }
        if let Some(value) = patch.completed_at {
            assignments.push("completed_at = ?");
            bind_values.push(value.map_or(Value::Null, Value::Integer));
        }
        if let Some(value) = patch.created_at {
            assignments.push("created_at = ?");
            bind_values.push(Value::Integer(value));
        }
        if let Some(value) = patch.is_snoozed {
            assignments.push("is_snoozed = ?");
            bind_values.push(Value::Integer(bool_to_int(value)));
        }
        if let Some(value) = patch.snoozed_until {
            assignments.push("snoozed_until = ?");
            bind_values.push(value.map_or(Value::Null, Value::Integer));
        }
        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Text(self.owner.to_string()));

        let sql = format!(
            "UPDATE todos SET {} WHERE id = ? AND user_id = ?;",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound { table: "todos", id });
        }

        self.publish(ChangeKind::Update, current.list_id, id);
        Ok(())
    }

    fn delete_todo(&self, id: TaskId) -> RepoResult<()> {
        let list_id: Option<String> = self
            .conn
            .query_row(
                "DELETE FROM todos WHERE id = ?1 AND user_id = ?2 RETURNING list_id;",
                params![id.to_string(), self.owner.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(list_id) = list_id else {
            return Err(RepoError::NotFound { table: "todos", id });
        };
        let list_id = Uuid::parse_str(&list_id).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{list_id}` in todos.list_id"))
        })?;

        self.publish(ChangeKind::Delete, list_id, id);
        Ok(())
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Task> {
    let period_type = match row.get::<_, Option<String>>("period_type")? {
        Some(value) => Some(PeriodType::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid period type `{value}` in todos.period_type"))
        })?),
        None => None,
    };

    let period_days = match row.get::<_, Option<i64>>("period_days")? {
        Some(value) => Some(u16::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid period days `{value}` in todos.period_days"))
        })?),
        None => None,
    };

    let task = Task {
        id: read_uuid(row, "id", "todos")?,
        title: row.get("title")?,
        list_id: read_uuid(row, "list_id", "todos")?,
        user_id: read_uuid(row, "user_id", "todos")?,
        is_completed: read_bool(row, "is_completed", "todos")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
        is_periodic: read_bool(row, "is_periodic", "todos")?,
        period_type,
        period_days,
        is_snoozed: read_bool(row, "is_snoozed", "todos")?,
        snoozed_until: row.get("snoozed_until")?,
    };
    task.validate()?;
    Ok(task)
}
