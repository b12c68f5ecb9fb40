//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the board persists through.
//! - Isolate JSON and SQLite details from service orchestration.
//!
//! # Invariants
//! - Write paths report failure instead of silently dropping data.
//! - Read paths repair or skip malformed records instead of failing.

pub mod kv_repo;
pub mod note_store;
