//! Use-case services over backend contracts.
//!
//! # Responsibility
//! - Turn lifecycle transitions into backend exchanges.
//! - Keep front ends decoupled from storage details.

pub mod draft;
pub mod list_service;
pub mod todo_service;
