//! Elapsed-time tracking for in-progress notes.
//!
//! # Responsibility
//! - Track which notes have a running timer and since when.
//! - Drive one periodic refresh tick for the whole board.
//! - Render running and frozen durations for display.
//!
//! # Invariants
//! - One update loop per engine, never one per note.
//! - The engine never writes note state; it only answers elapsed queries.

pub mod engine;
pub mod format;
pub mod update_loop;
