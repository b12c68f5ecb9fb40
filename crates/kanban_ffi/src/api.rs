//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board lifecycle use-cases to Dart via FRB.
//! - Flatten core views into plain string/number envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One board instance per process; every call is serialized by its lock.
//! - The UI drives the refresh cadence by polling `board_timer_readings`
//!   every `board_refresh_interval_ms`.

use kanban_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_board,
    ping as ping_inner, BoardConfig, BoardError, CardFooter, Column, ColumnView, Mutation, NewNote,
    NoteCard, NoteEdit, Priority, SaveStatus, SqliteBoard, SqliteKvStore, SystemClock, Theme,
    ThemeService, TimerReading, STORAGE_WRITE_FAILED_ALERT,
};
use log::warn;
use std::sync::{Mutex, OnceLock};

static BOARD_CONFIG: OnceLock<BoardConfig> = OnceLock::new();
static BOARD: OnceLock<Mutex<SqliteBoard>> = OnceLock::new();
static THEME: OnceLock<Mutex<ThemeService<SqliteKvStore>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One rendered note card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    pub note_id: i64,
    pub text: String,
    pub description: String,
    pub has_description: bool,
    /// `high|medium|low`.
    pub priority: String,
    /// Badge text, e.g. `MED`.
    pub priority_label: String,
    /// `todo|inprogress|done`.
    pub column: String,
    /// Formatted last-edit time, when the note was ever edited.
    pub last_edited: Option<String>,
    /// Primary footer line; empty for an in-progress card without a timer.
    pub footer: String,
    /// Completion time line of done cards.
    pub footer_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub column: String,
    pub cards: Vec<BoardCard>,
}

/// Full board projection for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
    /// Drives the empty-state message.
    pub is_empty: bool,
    /// Persistent banner while notes are not being saved.
    pub storage_warning: Option<String>,
    /// Set when the board could not be reached.
    pub error: Option<String>,
}

/// Live timer value for one in-progress card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTimerTick {
    pub note_id: i64,
    pub elapsed_ms: i64,
    pub display: String,
}

/// Generic action response envelope for board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether the operation was accepted.
    pub ok: bool,
    /// Affected note ID.
    pub note_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Blocking alert the UI must show once.
    pub alert: Option<String>,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, note_id: i64, save: SaveStatus) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id),
            message: message.into(),
            alert: save_alert(save),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
            alert: None,
        }
    }
}

/// Returns the current board projection.
///
/// # FFI contract
/// - Sync call, in-memory read.
/// - Never panics; lock failures are reported in `error`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardView {
    match with_board(|board| board.snapshot()) {
        Ok(snapshot) => BoardView {
            columns: snapshot.columns.into_iter().map(to_board_column).collect(),
            is_empty: snapshot.is_empty,
            storage_warning: snapshot.storage_warning.map(str::to_owned),
            error: None,
        },
        Err(err) => BoardView {
            columns: Vec::new(),
            is_empty: true,
            storage_warning: None,
            error: Some(err),
        },
    }
}

/// Creates a note.
///
/// Input semantics:
/// - `column`: `todo|inprogress|done`; `None` means `todo`.
/// - `priority`: `high|medium|low`; anything else means `medium`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns operation result and created note ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn board_create_note(
    text: String,
    column: Option<String>,
    priority: Option<String>,
    description: Option<String>,
) -> BoardActionResponse {
    let column = match column.as_deref().map(parse_column).transpose() {
        Ok(column) => column.unwrap_or(Column::Todo),
        Err(err) => return BoardActionResponse::failure(format!("board_create_note failed: {err}")),
    };
    let request = NewNote::new(text)
        .in_column(column)
        .with_priority(priority.as_deref().map_or(Priority::Medium, Priority::parse_lenient))
        .with_description(description.unwrap_or_default());

    respond("board_create_note", "Note created.", |board| {
        board.create(request).map(|done| note_outcome(done, |note| note.id))
    })
}

/// Edits text, description or priority. `None` leaves a field unchanged.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_edit_note(
    note_id: i64,
    text: Option<String>,
    description: Option<String>,
    priority: Option<String>,
) -> BoardActionResponse {
    let edit = NoteEdit {
        text,
        description,
        priority: priority.as_deref().map(Priority::parse_lenient),
    };
    respond("board_edit_note", "Note updated.", |board| {
        board
            .edit(note_id, edit)
            .map(|done| note_outcome(done, |note| note.id))
    })
}

/// Moves a note to `column` (`todo|inprogress|done`).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_note(note_id: i64, column: String) -> BoardActionResponse {
    let column = match parse_column(&column) {
        Ok(column) => column,
        Err(err) => return BoardActionResponse::failure(format!("board_move_note failed: {err}")),
    };
    respond("board_move_note", "Note moved.", |board| {
        board
            .move_column(note_id, column)
            .map(|done| note_outcome(done, |note| note.id))
    })
}

/// Deletes a note. Deleting an unknown ID succeeds without changes.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_note(note_id: i64) -> BoardActionResponse {
    respond("board_delete_note", "Note deleted.", |board| {
        let done = board.delete(note_id);
        Ok((note_id, done.save))
    })
}

/// Returns live readings for every running timer.
///
/// # FFI contract
/// - Sync call, in-memory read; meant to be polled about once per second.
/// - Never panics; returns an empty list when the board is unreachable.
#[flutter_rust_bridge::frb(sync)]
pub fn board_timer_readings() -> Vec<BoardTimerTick> {
    with_board(|board| board.timer_readings())
        .map(|readings| readings.into_iter().map(to_timer_tick).collect())
        .unwrap_or_default()
}

/// Refresh cadence the UI should poll `board_timer_readings` at.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; reflects `KANBAN_REFRESH_MS` when set and valid.
#[flutter_rust_bridge::frb(sync)]
pub fn board_refresh_interval_ms() -> u64 {
    u64::try_from(board_config().refresh_interval.as_millis()).unwrap_or(u64::MAX)
}

/// Returns the active theme (`light|dark`).
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_current(system_prefers_dark: bool) -> String {
    with_theme(|theme| theme.current(system_prefers_dark))
        .unwrap_or(Theme::Light)
        .as_str()
        .to_owned()
}

/// Switches to the other theme, persists it, and returns it.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_toggle(system_prefers_dark: bool) -> String {
    with_theme(|theme| theme.toggle(system_prefers_dark))
        .unwrap_or(Theme::Light)
        .as_str()
        .to_owned()
}

fn board_config() -> &'static BoardConfig {
    BOARD_CONFIG.get_or_init(BoardConfig::from_env)
}

fn with_board<T>(f: impl FnOnce(&mut SqliteBoard) -> T) -> Result<T, String> {
    let board = BOARD.get_or_init(|| Mutex::new(open_board(board_config(), SystemClock)));
    let mut guard = board
        .lock()
        .map_err(|_| "board state is unavailable after an earlier failure".to_string())?;
    Ok(f(&mut guard))
}

fn with_theme<T>(f: impl FnOnce(&mut ThemeService<SqliteKvStore>) -> T) -> Result<T, String> {
    let theme = THEME.get_or_init(|| {
        let service = match SqliteKvStore::open(&board_config().store_path) {
            Ok(store) => ThemeService::new(store),
            Err(err) => {
                warn!("event=theme_store_open module=ffi status=error error={err}");
                ThemeService::in_memory()
            }
        };
        Mutex::new(service)
    });
    let mut guard = theme
        .lock()
        .map_err(|_| "theme state is unavailable after an earlier failure".to_string())?;
    Ok(f(&mut guard))
}

fn respond(
    operation: &str,
    message: &str,
    f: impl FnOnce(&mut SqliteBoard) -> Result<(i64, SaveStatus), BoardError>,
) -> BoardActionResponse {
    match with_board(f) {
        Ok(Ok((note_id, save))) => BoardActionResponse::success(message, note_id, save),
        Ok(Err(err)) => BoardActionResponse::failure(format!("{operation} failed: {err}")),
        Err(err) => BoardActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn note_outcome<T>(done: Mutation<T>, id: impl FnOnce(&T) -> i64) -> (i64, SaveStatus) {
    (id(&done.value), done.save)
}

fn save_alert(save: SaveStatus) -> Option<String> {
    match save {
        SaveStatus::Failed { alert: true } => Some(STORAGE_WRITE_FAILED_ALERT.to_owned()),
        _ => None,
    }
}

fn parse_column(raw: &str) -> Result<Column, String> {
    Column::parse(raw.trim()).ok_or_else(|| format!("unknown column `{}`", raw.trim()))
}

fn to_board_column(view: ColumnView) -> BoardColumn {
    BoardColumn {
        column: view.column.as_str().to_owned(),
        cards: view.cards.into_iter().map(to_board_card).collect(),
    }
}

fn to_board_card(card: NoteCard) -> BoardCard {
    let (footer, footer_detail) = match card.footer {
        CardFooter::Created { at } => (format!("Created {at}"), None),
        CardFooter::Timer { elapsed } => (elapsed, None),
        CardFooter::Completed { duration, on } => (duration, on),
        CardFooter::Empty => (String::new(), None),
    };
    BoardCard {
        note_id: card.id,
        text: card.text,
        description: card.description,
        has_description: card.has_description,
        priority: card.priority.as_str().to_owned(),
        priority_label: card.priority_label.to_owned(),
        column: card.column.as_str().to_owned(),
        last_edited: card.last_edited,
        footer,
        footer_detail,
    }
}

fn to_timer_tick(reading: TimerReading) -> BoardTimerTick {
    BoardTimerTick {
        note_id: reading.note_id,
        elapsed_ms: reading.elapsed_ms,
        display: reading.display,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_create_note, board_delete_note, board_edit_note, board_move_note,
        board_refresh_interval_ms, board_snapshot, board_timer_readings, core_version,
        init_logging, ping, theme_current, theme_toggle, BoardCard,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_move_and_delete_round_trip() {
        let token = unique_token("ffi-lifecycle");
        let created = board_create_note(
            token.clone(),
            None,
            Some("HIGH".to_string()),
            Some("details".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let note_id = created.note_id.expect("create should return note_id");

        let card = find_card(note_id).expect("created note should be rendered");
        assert_eq!(card.text, token);
        assert_eq!(card.column, "todo");
        assert_eq!(card.priority, "high");
        assert_eq!(card.priority_label, "HIGH");
        assert!(card.has_description);
        assert!(card.footer.starts_with("Created "));

        let moved = board_move_note(note_id, "inprogress".to_string());
        assert!(moved.ok, "{}", moved.message);
        assert!(board_timer_readings()
            .iter()
            .any(|tick| tick.note_id == note_id));

        let done = board_move_note(note_id, "done".to_string());
        assert!(done.ok, "{}", done.message);
        let card = find_card(note_id).expect("done note should be rendered");
        assert_eq!(card.column, "done");
        assert!(card.footer.starts_with("Completed in "));
        assert!(card.footer_detail.is_some());
        assert!(!board_timer_readings()
            .iter()
            .any(|tick| tick.note_id == note_id));

        let deleted = board_delete_note(note_id);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(find_card(note_id).is_none());
    }

    #[test]
    fn edit_rejects_blank_text_and_keeps_note() {
        let token = unique_token("ffi-edit");
        let created = board_create_note(token.clone(), Some("todo".to_string()), None, None);
        let note_id = created.note_id.expect("create should return note_id");

        let rejected = board_edit_note(note_id, Some("   ".to_string()), None, None);
        assert!(!rejected.ok);
        assert!(rejected.message.contains("board_edit_note failed"));

        let edited = board_edit_note(note_id, None, None, Some("low".to_string()));
        assert!(edited.ok, "{}", edited.message);
        let card = find_card(note_id).expect("edited note should be rendered");
        assert_eq!(card.text, token);
        assert_eq!(card.priority, "low");
        assert!(card.last_edited.is_some());

        board_delete_note(note_id);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let blank = board_create_note("  ".to_string(), None, None, None);
        assert!(!blank.ok);
        assert_eq!(blank.note_id, None);

        let bad_column = board_create_note("x".to_string(), Some("archived".to_string()), None, None);
        assert!(!bad_column.ok);
        assert!(bad_column.message.contains("unknown column"));

        let missing = board_move_note(-1, "done".to_string());
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    #[test]
    fn refresh_interval_is_positive() {
        assert!(board_refresh_interval_ms() > 0);
    }

    #[test]
    fn theme_toggle_flips_current_theme() {
        let before = theme_current(false);
        let after = theme_toggle(false);
        assert_ne!(before, after);
        assert_eq!(theme_current(false), after);
        theme_toggle(false);
    }

    fn find_card(note_id: i64) -> Option<BoardCard> {
        board_snapshot()
            .columns
            .into_iter()
            .flat_map(|column| column.cards)
            .find(|card| card.note_id == note_id)
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
