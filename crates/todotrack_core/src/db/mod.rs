//! SQLite storage for the bundled backend.
//!
//! # Responsibility
//! - Open connections with the pragmas the repositories rely on.
//! - Bring the schema to the version this build expects.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Repositories and the auth gateway refuse connections that are not fully
//!   migrated.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod data_version;
pub mod migrations;
mod open;

pub use data_version::DataVersionWatch;
pub use open::{open_db, open_db_in_memory};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// The connection skipped `open_db` and was never migrated.
    SchemaBehind { found: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "schema version {found} is newer than this build supports ({supported})"
            ),
            Self::SchemaBehind { found, expected } => {
                write!(f, "schema version {found} needs migrating to {expected}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Fails unless `conn` sits exactly at [`migrations::latest_version`].
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let found = migrations::current_user_version(conn)?;
    let expected = migrations::latest_version();
    if found == expected {
        return Ok(());
    }
    if found > expected {
        return Err(DbError::SchemaTooNew {
            found,
            supported: expected,
        });
    }
    Err(DbError::SchemaBehind { found, expected })
}
