//! Core domain logic for the kanban board.
//! This crate is the single source of truth for note lifecycle invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod timer;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BoardConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Column, Note, NoteId, NoteValidationError, Priority, TimerState};
pub use repo::kv_repo::{KeyValueStore, MemoryKvStore, RepoError, RepoResult, SqliteKvStore};
pub use repo::note_store::{KvNoteStore, NoteStore, NOTES_STORAGE_KEY};
pub use service::board_service::{
    BoardError, BoardResult, BoardService, Mutation, NewNote, NoteEdit, SaveStatus,
    STORAGE_UNAVAILABLE_WARNING, STORAGE_WRITE_FAILED_ALERT,
};
pub use service::theme_service::{Theme, ThemeService, THEME_STORAGE_KEY};
pub use session::{BoardEvent, EventSender, Intent, Presenter, Session, SessionExit};
pub use timer::engine::TimerEngine;
pub use timer::format::{format_completed_time, format_elapsed_time, format_timestamp};
pub use view::{BoardSnapshot, CardFooter, ColumnView, NoteCard, TimerReading};

/// Board backed by the SQLite key-value store.
pub type SqliteBoard<C = SystemClock> = BoardService<KvNoteStore<SqliteKvStore>, C>;

/// Opens the board stored at `config.store_path`.
///
/// Falls back to an in-memory-only board when the database cannot be opened;
/// the returned board then reports a storage warning.
pub fn open_board<C: Clock>(config: &BoardConfig, clock: C) -> SqliteBoard<C> {
    let store = match SqliteKvStore::open(&config.store_path) {
        Ok(backend) => KvNoteStore::new(backend),
        Err(err) => {
            log::warn!(
                "event=board_store_open module=core status=error error_code=storage_unavailable error={err}"
            );
            KvNoteStore::unavailable()
        }
    };
    BoardService::open(store, clock)
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
