//! Single-threaded event loop between the board and a presentation layer.
//!
//! # Responsibility
//! - Serialize user intents and refresh ticks on one channel.
//! - Dispatch each event to the board, then tell the presenter what to show.
//!
//! # Invariants
//! - At most one event is handled at a time; a tick never interleaves with
//!   an intent.
//! - Board state is only touched from the thread that calls `run`.

use crate::clock::Clock;
use crate::model::note::{Column, NoteId};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::note_store::NoteStore;
use crate::service::board_service::{
    BoardError, BoardService, NewNote, NoteEdit, SaveStatus, STORAGE_WRITE_FAILED_ALERT,
};
use crate::service::theme_service::{Theme, ThemeService};
use crate::view::{BoardSnapshot, TimerReading};
use log::{debug, info};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// User intent emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(NewNote),
    Edit { id: NoteId, edit: NoteEdit },
    Move { id: NoteId, column: Column },
    Delete { id: NoteId },
    ToggleTheme,
}

/// Everything the loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    Intent(Intent),
    Tick,
    Shutdown,
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    Shutdown,
    /// Every sender was dropped.
    Disconnected,
}

/// Presentation seam driven by the session.
pub trait Presenter {
    /// Full re-render after a state change.
    fn render(&mut self, snapshot: &BoardSnapshot);
    /// Per-tick update of running timers only.
    fn refresh_timers(&mut self, readings: &[TimerReading]);
    /// Transient signal for a rejected intent; no state changed.
    fn reject(&mut self, error: &BoardError);
    /// Blocking user-visible message.
    fn alert(&mut self, message: &str);
    fn apply_theme(&mut self, theme: Theme);
}

/// Cloneable handle for feeding events into a session.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<BoardEvent>,
}

impl EventSender {
    /// Returns `false` once the session is gone.
    pub fn send(&self, event: BoardEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn intent(&self, intent: Intent) -> bool {
        self.send(BoardEvent::Intent(intent))
    }

    pub fn shutdown(&self) -> bool {
        self.send(BoardEvent::Shutdown)
    }
}

/// Owns the board and drives one presenter.
pub struct Session<S: NoteStore, C: Clock, K: KeyValueStore, P: Presenter> {
    board: BoardService<S, C>,
    theme: ThemeService<K>,
    presenter: P,
    system_prefers_dark: bool,
    events: Receiver<BoardEvent>,
}

impl<S, C, K, P> Session<S, C, K, P>
where
    S: NoteStore,
    C: Clock,
    K: KeyValueStore,
    P: Presenter,
{
    pub fn new(
        board: BoardService<S, C>,
        theme: ThemeService<K>,
        presenter: P,
        system_prefers_dark: bool,
    ) -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel();
        let session = Self {
            board,
            theme,
            presenter,
            system_prefers_dark,
            events: rx,
        };
        (session, EventSender { tx })
    }

    pub fn board(&self) -> &BoardService<S, C> {
        &self.board
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Wires the board's refresh loop to post `Tick` events.
    ///
    /// Returns `false` when a refresh loop is already running.
    pub fn start_refresh(&mut self, interval: Duration, events: EventSender) -> bool {
        self.board.start_update_loop(interval, move || {
            events.send(BoardEvent::Tick);
        })
    }

    /// Renders once, then handles events until shutdown or disconnect.
    ///
    /// The refresh loop is stopped before returning.
    pub fn run(&mut self) -> SessionExit {
        let theme = self.theme.current(self.system_prefers_dark);
        self.presenter.apply_theme(theme);
        self.render();
        info!("event=session_start module=session status=ok theme={theme}");

        let exit = loop {
            match self.events.recv() {
                Ok(event) => {
                    if !self.handle(event) {
                        break SessionExit::Shutdown;
                    }
                }
                Err(_) => break SessionExit::Disconnected,
            }
        };

        self.board.stop_update_loop();
        info!("event=session_stop module=session status=ok exit={exit:?}");
        exit
    }

    /// Handles one event. Returns `false` on `Shutdown`.
    pub fn handle(&mut self, event: BoardEvent) -> bool {
        match event {
            BoardEvent::Intent(intent) => self.handle_intent(intent),
            BoardEvent::Tick => {
                let readings = self.board.timer_readings();
                self.presenter.refresh_timers(&readings);
            }
            BoardEvent::Shutdown => return false,
        }
        true
    }

    fn handle_intent(&mut self, intent: Intent) {
        debug!("event=intent module=session kind={}", intent_kind(&intent));
        let save = match intent {
            Intent::Create(request) => self.board.create(request).map(|done| done.save),
            Intent::Edit { id, edit } => self.board.edit(id, edit).map(|done| done.save),
            Intent::Move { id, column } => self.board.move_column(id, column).map(|done| done.save),
            Intent::Delete { id } => Ok(self.board.delete(id).save),
            Intent::ToggleTheme => {
                let theme = self.theme.toggle(self.system_prefers_dark);
                self.presenter.apply_theme(theme);
                return;
            }
        };

        match save {
            Ok(SaveStatus::Unchanged) => {}
            Ok(status) => {
                if let SaveStatus::Failed { alert: true } = status {
                    self.presenter.alert(STORAGE_WRITE_FAILED_ALERT);
                }
                self.render();
            }
            Err(err) => self.presenter.reject(&err),
        }
    }

    fn render(&mut self) {
        let snapshot = self.board.snapshot();
        self.presenter.render(&snapshot);
    }
}

fn intent_kind(intent: &Intent) -> &'static str {
    match intent {
        Intent::Create(_) => "create",
        Intent::Edit { .. } => "edit",
        Intent::Move { .. } => "move",
        Intent::Delete { .. } => "delete",
        Intent::ToggleTheme => "toggle_theme",
    }
}
