//! Identity: sessions, OAuth sign-in and auth state notifications.
//!
//! # Responsibility
//! - Define the session contract the client depends on.
//! - Ship a SQLite-backed gateway that plays the hosted identity service.
//!
//! # Invariants
//! - At most one active session exists per backend store.
//! - The same `(provider, account)` pair always maps to the same `UserId`.

pub mod gateway;
pub mod session;
