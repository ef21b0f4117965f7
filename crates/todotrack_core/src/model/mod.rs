//! Domain model for lists, tasks and their derived views.
//!
//! # Responsibility
//! - Define the rows exchanged with the backend (`Task`, `TaskList`).
//! - Keep lifecycle rules and derivations pure and clock-explicit.
//!
//! # Invariants
//! - Every row is identified by a stable UUID.
//! - Deletion is a hard delete; there are no tombstones.

pub mod buckets;
pub mod list;
pub mod period;
pub mod task;
