//! Board domain model.
//!
//! # Responsibility
//! - Define the canonical note record used by core business logic.
//! - Keep lifecycle timestamp rules next to the data they protect.
//!
//! # Invariants
//! - Every note is identified by a unique `NoteId`.
//! - Deletion is a hard removal; history lives only on surviving notes.

pub mod note;
