//! In-process push notifications.
//!
//! # Responsibility
//! - Deliver auth and todo change events to registered listeners.
//! - Tie listener lifetime to a `Subscription` handle.

pub mod listeners;
pub mod todo_changes;
