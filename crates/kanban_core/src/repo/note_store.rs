//! Note list persistence adapter.
//!
//! # Responsibility
//! - Read and write the whole note list as one JSON value under
//!   `kanbanNotes`.
//! - Detect unusable storage once and degrade to in-memory operation.
//! - Back-fill fields missing from records written by older versions.
//!
//! # Invariants
//! - `load` never fails; unreadable data yields an empty or partial list.
//! - Loaded ids are unique; later duplicates are dropped.
//! - An unavailable store never touches its backend again.

use crate::model::note::{validate_text, Column, Note, NoteId, Priority};
use crate::repo::kv_repo::{KeyValueStore, RepoError, RepoResult};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;

/// Storage key holding the serialized note list.
pub const NOTES_STORAGE_KEY: &str = "kanbanNotes";

const WRITE_CHECK_KEY: &str = "__kanban_write_check__";

/// Persistence contract consumed by the lifecycle service.
pub trait NoteStore {
    fn is_available(&self) -> bool;
    /// Loads the stored list with defaults back-filled.
    fn load(&self) -> Vec<Note>;
    /// Replaces the stored list.
    ///
    /// # Errors
    /// - `Unavailable` when storage was detected as unusable.
    /// - Backend or serialization errors on write failure.
    fn save(&mut self, notes: &[Note]) -> RepoResult<()>;
}

/// `NoteStore` over any key-value backend.
pub struct KvNoteStore<K: KeyValueStore> {
    backend: Option<K>,
}

impl<K: KeyValueStore> KvNoteStore<K> {
    /// Wraps `backend` after a trial write.
    ///
    /// A backend that fails the trial write is discarded and the store reports
    /// itself unavailable.
    pub fn new(mut backend: K) -> Self {
        let trial = backend
            .set(WRITE_CHECK_KEY, WRITE_CHECK_KEY)
            .and_then(|()| backend.remove(WRITE_CHECK_KEY));
        match trial {
            Ok(()) => Self {
                backend: Some(backend),
            },
            Err(err) => {
                warn!(
                    "event=store_write_check module=repo status=error error_code=storage_unavailable error={err}"
                );
                Self::unavailable()
            }
        }
    }

    /// A store that keeps nothing; every save is skipped.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Gives back the backend, if storage is available.
    pub fn into_backend(self) -> Option<K> {
        self.backend
    }
}

impl<K: KeyValueStore> NoteStore for KvNoteStore<K> {
    fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn load(&self) -> Vec<Note> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };

        let raw = match backend.get(NOTES_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("event=notes_load module=repo status=error error_code=read_failed error={err}");
                return Vec::new();
            }
        };

        let notes = decode_notes(&raw);
        info!(
            "event=notes_load module=repo status=ok count={}",
            notes.len()
        );
        notes
    }

    fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Err(RepoError::Unavailable);
        };
        let payload = serde_json::to_string(notes)?;
        backend.set(NOTES_STORAGE_KEY, &payload)
    }
}

/// Decodes a stored note list, dropping records that cannot be repaired.
///
/// A payload that is not a JSON array decodes to an empty list.
pub fn decode_notes(raw: &str) -> Vec<Note> {
    let records = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(records)) => records,
        Ok(_) => {
            warn!("event=notes_decode module=repo status=error error_code=not_an_array");
            return Vec::new();
        }
        Err(err) => {
            warn!("event=notes_decode module=repo status=error error_code=invalid_json error={err}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let stored = match serde_json::from_value::<StoredNote>(record) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("event=notes_decode module=repo status=skip index={index} reason=invalid_record error={err}");
                continue;
            }
        };
        let Some(note) = stored.into_note() else {
            warn!("event=notes_decode module=repo status=skip index={index} reason=invalid_fields");
            continue;
        };
        if !seen.insert(note.id) {
            warn!(
                "event=notes_decode module=repo status=skip index={index} reason=duplicate_id note_id={}",
                note.id
            );
            continue;
        }
        notes.push(note);
    }
    notes
}

/// Lenient on-disk shape. Every field added after the first release is
/// optional here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNote {
    id: NoteId,
    text: String,
    #[serde(default)]
    description: Option<String>,
    column: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    last_edited_at: Option<i64>,
    #[serde(default)]
    started_at: Option<i64>,
    #[serde(default)]
    resumed_at: Option<i64>,
    #[serde(default)]
    completed_at: Option<i64>,
    #[serde(default)]
    time_spent: Option<i64>,
}

impl StoredNote {
    fn into_note(self) -> Option<Note> {
        let column = Column::parse(&self.column)?;
        validate_text(&self.text).ok()?;

        Some(Note {
            id: self.id,
            text: self.text,
            description: self.description.unwrap_or_default(),
            column,
            priority: self.priority,
            // Ids were allocated from the creation clock.
            created_at: self.created_at.unwrap_or(self.id),
            last_edited_at: self.last_edited_at,
            started_at: self.started_at,
            resumed_at: self.resumed_at.filter(|_| column == Column::InProgress),
            completed_at: self.completed_at,
            time_spent: self.time_spent.unwrap_or(0).max(0),
        })
    }
}
