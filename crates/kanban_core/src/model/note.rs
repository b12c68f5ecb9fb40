//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical board record and its column/priority enums.
//! - Own the column transition rules that move lifecycle timestamps.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `started_at` is set on first entry into `InProgress` and never cleared.
//! - `time_spent` only grows when an in-progress run is closed, and never
//!   changes while the note sits in `Done`.
//! - `resumed_at` is `Some` only while `column == InProgress`.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one note.
///
/// Allocated at creation from wall-clock milliseconds, bumped to stay unique.
pub type NoteId = i64;

/// Board column, i.e. the lifecycle stage of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    /// All columns in board order.
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    /// Wire/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    /// Parses a wire label. Accepts `in_progress` as an alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "inprogress" | "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Note priority. Declaration order is display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Wire/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Short badge label shown on cards.
    pub fn badge_label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MED",
            Self::Low => "LOW",
        }
    }

    /// Parses a wire label; unknown values fall back to `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(Priority::parse_lenient)
            .unwrap_or_default())
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timer state derived from a note's column and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Never started, or paused back in `Todo`.
    Idle,
    /// In progress; the current run began at `since_ms`.
    Running { since_ms: i64 },
    /// Done; `time_spent_ms` is frozen.
    Completed { time_spent_ms: i64 },
}

/// What the timer engine must do after a column transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerAction {
    Start { started_at: i64 },
    Stop,
}

/// Validation errors for note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Text is empty after trimming whitespace.
    EmptyText,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical board record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub description: String,
    pub column: Column,
    pub priority: Priority,
    /// Unix epoch milliseconds, set once.
    pub created_at: i64,
    pub last_edited_at: Option<i64>,
    /// First entry into `InProgress`.
    pub started_at: Option<i64>,
    /// Start of the current in-progress run.
    pub resumed_at: Option<i64>,
    /// Most recent entry into `Done`.
    pub completed_at: Option<i64>,
    /// Accumulated milliseconds over all closed runs.
    pub time_spent: i64,
}

impl Note {
    /// Creates a todo note with all lifecycle timestamps absent.
    pub fn new(id: NoteId, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            text: text.into(),
            description: String::new(),
            column: Column::Todo,
            priority: Priority::Medium,
            created_at,
            last_edited_at: None,
            started_at: None,
            resumed_at: None,
            completed_at: None,
            time_spent: 0,
        }
    }

    /// Validates content invariants.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_text(&self.text)
    }

    /// Returns whether the description has visible content.
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Start of the running in-progress run, if any.
    ///
    /// Records written before `resumed_at` existed fall back to `started_at`.
    pub fn run_started_at(&self) -> Option<i64> {
        if self.column != Column::InProgress {
            return None;
        }
        self.resumed_at.or(self.started_at)
    }

    /// Derives the single timer state for this note.
    pub fn timer_state(&self) -> TimerState {
        match self.column {
            Column::Done => TimerState::Completed {
                time_spent_ms: self.time_spent,
            },
            Column::InProgress => match self.run_started_at() {
                Some(since_ms) => TimerState::Running { since_ms },
                None => TimerState::Idle,
            },
            Column::Todo => TimerState::Idle,
        }
    }

    /// Moves this note into `column` at `now_ms`.
    ///
    /// Returns `None` when the note is already in `column`.
    pub(crate) fn transition_to(&mut self, column: Column, now_ms: i64) -> Option<TimerAction> {
        if self.column == column {
            return None;
        }

        self.close_run(now_ms);
        self.column = column;
        Some(self.enter_column(now_ms))
    }

    /// Applies entry rules for the current column. Used on creation.
    pub(crate) fn enter_column(&mut self, now_ms: i64) -> TimerAction {
        match self.column {
            Column::InProgress => {
                if self.started_at.is_none() {
                    self.started_at = Some(now_ms);
                }
                self.resumed_at = Some(now_ms);
                TimerAction::Start { started_at: now_ms }
            }
            Column::Done => {
                self.completed_at = Some(now_ms);
                TimerAction::Stop
            }
            Column::Todo => TimerAction::Stop,
        }
    }

    /// Folds the open in-progress run, if any, into `time_spent`.
    fn close_run(&mut self, now_ms: i64) {
        if let Some(run_start) = self.run_started_at() {
            self.time_spent = self
                .time_spent
                .saturating_add(now_ms.saturating_sub(run_start).max(0));
        }
        self.resumed_at = None;
    }
}

pub(crate) fn validate_text(text: &str) -> Result<(), NoteValidationError> {
    if text.trim().is_empty() {
        return Err(NoteValidationError::EmptyText);
    }
    Ok(())
}
