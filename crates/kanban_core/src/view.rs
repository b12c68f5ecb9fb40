//! Read-only projections handed to the presentation layer.
//!
//! # Responsibility
//! - Turn canonical notes into display-ready cards.
//! - Carry the per-tick timer readings for in-progress cards.
//!
//! # Invariants
//! - Views are snapshots; mutating them never touches board state.

use crate::model::note::{Column, Note, NoteId, Priority};
use crate::timer::format::{format_completed_time, format_elapsed_time, format_timestamp};

/// Prefix shown before a running timer.
pub const TIMER_GLYPH: &str = "⏱";

/// Column-specific footer line of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardFooter {
    /// Todo cards show when they were created.
    Created { at: String },
    /// In-progress cards show a live timer.
    Timer { elapsed: String },
    /// Done cards show the frozen duration and completion time.
    Completed { duration: String, on: Option<String> },
    /// In-progress card without a recorded start.
    Empty,
}

/// One rendered note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteId,
    pub text: String,
    pub description: String,
    pub has_description: bool,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub column: Column,
    pub last_edited: Option<String>,
    pub footer: CardFooter,
}

impl NoteCard {
    /// Builds a card. `live_elapsed_ms` is the running total for an
    /// in-progress note, `None` when it has no timer.
    pub fn from_note(note: &Note, live_elapsed_ms: Option<i64>) -> Self {
        let footer = match note.column {
            Column::Todo => CardFooter::Created {
                at: format_timestamp(note.created_at),
            },
            Column::InProgress => match live_elapsed_ms {
                Some(elapsed_ms) => CardFooter::Timer {
                    elapsed: timer_display(elapsed_ms),
                },
                None => CardFooter::Empty,
            },
            Column::Done => CardFooter::Completed {
                duration: format!("Completed in {}", format_completed_time(note.time_spent)),
                on: note
                    .completed_at
                    .map(|at| format!("on {}", format_timestamp(at))),
            },
        };

        Self {
            id: note.id,
            text: note.text.clone(),
            description: note.description.clone(),
            has_description: note.has_description(),
            priority: note.priority,
            priority_label: note.priority.badge_label(),
            column: note.column,
            last_edited: note.last_edited_at.map(format_timestamp),
            footer,
        }
    }
}

/// Cards of one column in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: Column,
    pub cards: Vec<NoteCard>,
}

/// Full board projection for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Always three entries, in `Column::ALL` order.
    pub columns: Vec<ColumnView>,
    pub is_empty: bool,
    pub storage_warning: Option<&'static str>,
}

impl BoardSnapshot {
    pub fn column(&self, column: Column) -> Option<&ColumnView> {
        self.columns.iter().find(|view| view.column == column)
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|view| view.cards.len()).sum()
    }
}

/// Live elapsed time for one running timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerReading {
    pub note_id: NoteId,
    pub elapsed_ms: i64,
    pub display: String,
}

impl TimerReading {
    pub fn new(note_id: NoteId, elapsed_ms: i64) -> Self {
        Self {
            note_id,
            elapsed_ms,
            display: timer_display(elapsed_ms),
        }
    }
}

fn timer_display(elapsed_ms: i64) -> String {
    format!("{TIMER_GLYPH} {}", format_elapsed_time(elapsed_ms))
}
