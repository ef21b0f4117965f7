//! Ordered schema steps.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - All pending steps commit together or not at all.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Step {
        version: 2,
        name: "lookup_indexes",
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Runs every step above the connection's current version in one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let pending = pending_steps(from)?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={}",
        latest_version()
    );
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

fn pending_steps(from: u32) -> DbResult<Vec<&'static Step>> {
    let latest = latest_version();
    if from > latest {
        return Err(DbError::SchemaTooNew {
            found: from,
            supported: latest,
        });
    }
    Ok(STEPS.iter().filter(|step| step.version > from).collect())
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, STEPS};
    use crate::db::DbError;

    #[test]
    fn versions_are_contiguous_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).expect("known version").len(), STEPS.len());
        assert_eq!(pending_steps(1).expect("known version").len(), STEPS.len() - 1);
        assert!(pending_steps(latest_version()).expect("known version").is_empty());
        assert!(matches!(
            pending_steps(latest_version() + 1),
            Err(DbError::SchemaTooNew { .. })
        ));
    }
}
