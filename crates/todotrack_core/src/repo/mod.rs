//! Table access contracts and the bundled SQLite backend.
//!
//! # Responsibility
//! - Define the table-level interface the client needs from its backend
//!   (select with filter and order, insert returning rows, update-by-id,
//!   delete-by-id).
//! - Enforce row-level ownership: every query is scoped to one user.
//!
//! # Invariants
//! - Writes validate rows before persistence.
//! - Reads reject invalid persisted rows instead of masking them.

pub mod list_repo;
mod sql;
pub mod todo_repo;
