//! Board lifecycle service.
//!
//! # Responsibility
//! - Own the canonical note collection for one board.
//! - Apply create/edit/move/delete use-cases and keep timers in step.
//! - Persist after every mutation and report how the save went.
//!
//! # Invariants
//! - This service is the only writer of lifecycle timestamps.
//! - Rejected operations (`Validation`, `NotFound`) leave state untouched.
//! - A failed save never rolls back the in-memory change.
//! - Every `InProgress` note with a run start has an active timer; no other
//!   note does.

use crate::clock::Clock;
use crate::model::note::{
    validate_text, Column, Note, NoteId, NoteValidationError, Priority, TimerAction,
};
use crate::repo::kv_repo::RepoError;
use crate::repo::note_store::NoteStore;
use crate::timer::engine::TimerEngine;
use crate::view::{BoardSnapshot, ColumnView, NoteCard, TimerReading};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Persistent warning shown while storage is unavailable.
pub const STORAGE_UNAVAILABLE_WARNING: &str = "Warning: Your notes will not be saved.";
/// One-time alert shown when a write fails.
pub const STORAGE_WRITE_FAILED_ALERT: &str = "Could not save notes. Storage might be full.";

pub type BoardResult<T> = Result<T, BoardError>;

/// Rejections surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    Validation(NoteValidationError),
    NotFound(NoteId),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<NoteValidationError> for BoardError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Outcome of the save that follows a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// Nothing changed, nothing written.
    Unchanged,
    /// Storage is unavailable for this session.
    SkippedUnavailable,
    /// The write failed. `alert` is set on the first failure after a
    /// successful save.
    Failed { alert: bool },
}

impl SaveStatus {
    pub fn is_saved(self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    pub value: T,
    pub save: SaveStatus,
}

/// Create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub text: String,
    pub column: Column,
    pub priority: Priority,
    pub description: String,
}

impl NewNote {
    /// A todo note with medium priority and no description.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            column: Column::Todo,
            priority: Priority::Medium,
            description: String::new(),
        }
    }

    pub fn in_column(mut self, column: Column) -> Self {
        self.column = column;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial field edit. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEdit {
    pub text: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

/// Lifecycle manager for one board.
pub struct BoardService<S: NoteStore, C: Clock> {
    store: S,
    timers: TimerEngine<C>,
    notes: Vec<Note>,
    last_id: NoteId,
    write_failure_alerted: bool,
}

impl<S: NoteStore, C: Clock> BoardService<S, C> {
    /// Loads the stored board and resumes timers for in-progress notes.
    pub fn open(store: S, clock: C) -> Self {
        let notes = store.load();
        let mut timers = TimerEngine::new(clock);
        for note in &notes {
            if let Some(run_start) = note.run_started_at() {
                timers.start_timer(note.id, run_start);
            }
        }
        let last_id = notes.iter().map(|note| note.id).max().unwrap_or(0);

        if store.is_available() {
            info!(
                "event=board_open module=board status=ok count={} running={}",
                notes.len(),
                timers.active_timer_ids().len()
            );
        } else {
            warn!("event=board_open module=board status=degraded error_code=storage_unavailable");
        }

        Self {
            store,
            timers,
            notes,
            last_id,
            write_failure_alerted: false,
        }
    }

    /// Creates one note and applies the entry rules of its column.
    ///
    /// # Errors
    /// - `Validation` when the trimmed text is empty.
    pub fn create(&mut self, request: NewNote) -> BoardResult<Mutation<Note>> {
        let text = request.text.trim().to_string();
        validate_text(&text)?;

        let now = self.timers.clock().now_ms();
        let id = self.allocate_id(now);
        let mut note = Note::new(id, text, now);
        note.description = request.description.trim().to_string();
        note.priority = request.priority;
        note.column = request.column;
        let action = note.enter_column(now);
        self.apply_timer_action(id, action);

        self.notes.push(note.clone());
        info!(
            "event=note_create module=board status=ok note_id={id} column={} priority={}",
            note.column, note.priority
        );
        let save = self.persist();
        Ok(Mutation { value: note, save })
    }

    /// Edits text, description or priority.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    /// - `Validation` when the resulting text is empty.
    pub fn edit(&mut self, id: NoteId, edit: NoteEdit) -> BoardResult<Mutation<Note>> {
        let now = self.timers.clock().now_ms();
        let index = self.index_of(id).ok_or(BoardError::NotFound(id))?;

        let text = edit.text.map(|text| text.trim().to_string());
        if let Some(text) = text.as_deref() {
            validate_text(text)?;
        }

        let note = &mut self.notes[index];
        if let Some(text) = text {
            note.text = text;
        }
        if let Some(description) = edit.description {
            note.description = description.trim().to_string();
        }
        if let Some(priority) = edit.priority {
            note.priority = priority;
        }
        note.last_edited_at = Some(now);
        let updated = note.clone();

        info!("event=note_edit module=board status=ok note_id={id}");
        let save = self.persist();
        Ok(Mutation {
            value: updated,
            save,
        })
    }

    /// Moves a note to `column`, updating timestamps and timers.
    ///
    /// Moving to the current column is a no-op reported as `Unchanged`.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    pub fn move_column(&mut self, id: NoteId, column: Column) -> BoardResult<Mutation<Note>> {
        let now = self.timers.clock().now_ms();
        let index = self.index_of(id).ok_or(BoardError::NotFound(id))?;

        let note = &mut self.notes[index];
        let from = note.column;
        let Some(action) = note.transition_to(column, now) else {
            return Ok(Mutation {
                value: note.clone(),
                save: SaveStatus::Unchanged,
            });
        };
        let updated = note.clone();
        self.apply_timer_action(id, action);

        info!(
            "event=note_move module=board status=ok note_id={id} from={from} to={column} time_spent_ms={}",
            updated.time_spent
        );
        let save = self.persist();
        Ok(Mutation {
            value: updated,
            save,
        })
    }

    /// Deletes a note and cancels its timer. Unknown ids are a no-op.
    pub fn delete(&mut self, id: NoteId) -> Mutation<Option<Note>> {
        self.timers.stop_timer(id);
        let Some(index) = self.index_of(id) else {
            return Mutation {
                value: None,
                save: SaveStatus::Unchanged,
            };
        };

        let removed = self.notes.remove(index);
        info!("event=note_delete module=board status=ok note_id={id}");
        let save = self.persist();
        Mutation {
            value: Some(removed),
            save,
        }
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// All notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// All notes in display order: priority, then insertion order.
    pub fn ordered_notes(&self) -> Vec<&Note> {
        let mut ordered: Vec<&Note> = self.notes.iter().collect();
        ordered.sort_by_key(|note| note.priority);
        ordered
    }

    /// Notes of one column in display order.
    pub fn column_notes(&self, column: Column) -> Vec<&Note> {
        self.ordered_notes()
            .into_iter()
            .filter(|note| note.column == column)
            .collect()
    }

    pub fn timers(&self) -> &TimerEngine<C> {
        &self.timers
    }

    /// Accumulated time plus the open run, for in-progress notes with a
    /// running timer.
    pub fn live_elapsed_ms(&self, id: NoteId) -> Option<i64> {
        let run_ms = self.timers.elapsed_ms(id)?;
        let note = self.get(id)?;
        Some(note.time_spent.saturating_add(run_ms))
    }

    /// One reading per active timer, ascending by id.
    pub fn timer_readings(&self) -> Vec<TimerReading> {
        self.timers
            .active_timer_ids()
            .into_iter()
            .filter_map(|id| {
                self.live_elapsed_ms(id)
                    .map(|elapsed_ms| TimerReading::new(id, elapsed_ms))
            })
            .collect()
    }

    /// Builds the full render projection.
    pub fn snapshot(&self) -> BoardSnapshot {
        let columns = Column::ALL
            .iter()
            .map(|column| ColumnView {
                column: *column,
                cards: self
                    .column_notes(*column)
                    .into_iter()
                    .map(|note| NoteCard::from_note(note, self.live_elapsed_ms(note.id)))
                    .collect(),
            })
            .collect();

        BoardSnapshot {
            columns,
            is_empty: self.notes.is_empty(),
            storage_warning: self.storage_warning(),
        }
    }

    pub fn is_storage_available(&self) -> bool {
        self.store.is_available()
    }

    /// Persistent warning while running without storage.
    pub fn storage_warning(&self) -> Option<&'static str> {
        if self.store.is_available() {
            None
        } else {
            Some(STORAGE_UNAVAILABLE_WARNING)
        }
    }

    /// Starts the board-wide refresh tick. See [`TimerEngine::start_update_loop`].
    pub fn start_update_loop<F>(&mut self, interval: Duration, callback: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        self.timers.start_update_loop(interval, callback)
    }

    pub fn stop_update_loop(&mut self) -> bool {
        self.timers.stop_update_loop()
    }

    fn allocate_id(&mut self, now_ms: i64) -> NoteId {
        let id = now_ms.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn index_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn apply_timer_action(&mut self, id: NoteId, action: TimerAction) {
        match action {
            TimerAction::Start { started_at } => {
                self.timers.start_timer(id, started_at);
            }
            TimerAction::Stop => {
                self.timers.stop_timer(id);
            }
        }
    }

    fn persist(&mut self) -> SaveStatus {
        match self.store.save(&self.notes) {
            Ok(()) => {
                self.write_failure_alerted = false;
                SaveStatus::Saved
            }
            Err(RepoError::Unavailable) => SaveStatus::SkippedUnavailable,
            Err(err) => {
                error!(
                    "event=notes_save module=board status=error error_code=write_failed count={} error={err}",
                    self.notes.len()
                );
                let alert = !self.write_failure_alerted;
                self.write_failure_alerted = true;
                SaveStatus::Failed { alert }
            }
        }
    }
}
