//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod conversation_memory;
pub mod dispatch;
pub mod session_registry;
