//! Detects commits made through other connections to the same database.
//!
//! # Invariants
//! - `PRAGMA data_version` only moves when another connection commits, so
//!   writes through the watched connection itself are never reported.

use super::DbResult;
use log::debug;
use rusqlite::Connection;

/// Polls `PRAGMA data_version` on one connection.
pub struct DataVersionWatch<'conn> {
    conn: &'conn Connection,
    seen: i64,
}

impl<'conn> DataVersionWatch<'conn> {
    /// Starts watching from the current version.
    pub fn try_new(conn: &'conn Connection) -> DbResult<Self> {
        let seen = read_data_version(conn)?;
        Ok(Self { conn, seen })
    }

    /// Returns `true` once per batch of foreign commits since the last call.
    pub fn poll(&mut self) -> DbResult<bool> {
        let current = read_data_version(self.conn)?;
        if current == self.seen {
            return Ok(false);
        }
        debug!(
            "event=db_external_write module=db status=ok from={} to={current}",
            self.seen
        );
        self.seen = current;
        Ok(true)
    }
}

fn read_data_version(conn: &Connection) -> DbResult<i64> {
    Ok(conn.pragma_query_value(None, "data_version", |row| row.get(0))?)
}
