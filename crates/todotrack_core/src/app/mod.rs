//! Client application state.
//!
//! # Responsibility
//! - Model what a front end shows and mutates, passed explicitly instead of
//!   living in globals.
//! - Apply the uniform failure policy: log and keep prior state.
//!
//! # Invariants
//! - No operation failure is fatal; state stays usable after any error.
//! - Reconciliation is last-write-wins with full list refresh.

pub mod auth_state;
pub mod todo_app;
