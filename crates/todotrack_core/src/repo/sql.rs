//! Column conversion helpers shared by SQLite repositories.

use crate::repo::todo_repo::{RepoError, RepoResult};
use rusqlite::Row;
use uuid::Uuid;

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn read_bool(row: &Row<'_>, column: &str, table: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn read_uuid(row: &Row<'_>, column: &str, table: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}
