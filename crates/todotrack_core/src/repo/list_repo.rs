//! List table contracts and SQLite implementation.
//!
//! # Invariants
//! - Lists are returned in `created_at ASC` order.
//! - Names are trimmed and non-blank before insert.

use crate::db::ensure_schema_ready;
use crate::model::list::{normalize_list_name, TaskList};
use crate::model::task::{ListId, UserId};
use crate::repo::sql::read_uuid;
use crate::repo::todo_repo::RepoResult;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Table interface for lists.
pub trait ListRepository {
    fn list_lists(&self) -> RepoResult<Vec<TaskList>>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<TaskList>>;
    /// Inserts a list and returns it as stored.
    fn insert_list(&self, name: &str, created_at: i64) -> RepoResult<TaskList>;
}

impl<R: ListRepository + ?Sized> ListRepository for &R {
    fn list_lists(&self) -> RepoResult<Vec<TaskList>> {
        (**self).list_lists()
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<TaskList>> {
        (**self).get_list(id)
    }

    fn insert_list(&self, name: &str, created_at: i64) -> RepoResult<TaskList> {
        (**self).insert_list(name, created_at)
    }
}

/// SQLite-backed list table scoped to one user.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, owner: UserId) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn, owner })
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn list_lists(&self) -> RepoResult<Vec<TaskList>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, user_id, created_at
             FROM lists
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([self.owner.to_string()])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<TaskList>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, user_id, created_at
             FROM lists
             WHERE id = ?1 AND user_id = ?2;",
        )?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn insert_list(&self, name: &str, created_at: i64) -> RepoResult<TaskList> {
        let list = TaskList {
            id: Uuid::new_v4(),
            name: normalize_list_name(name)?,
            user_id: self.owner,
            created_at,
        };
        list.validate()?;

        self.conn.execute(
            "INSERT INTO lists (id, name, user_id, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![
                list.id.to_string(),
                list.name.as_str(),
                list.user_id.to_string(),
                list.created_at,
            ],
        )?;
        Ok(list)
    }
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<TaskList> {
    let list = TaskList {
        id: read_uuid(row, "id", "lists")?,
        name: row.get("name")?,
        user_id: read_uuid(row, "user_id", "lists")?,
        created_at: row.get("created_at")?,
    };
    list.validate()?;
    Ok(list)
}
