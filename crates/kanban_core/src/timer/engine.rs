//! Timer engine for in-progress notes.
//!
//! # Responsibility
//! - Register and unregister running timers by note id.
//! - Answer elapsed-time queries against an injected clock.
//! - Own the single refresh loop for the board.
//!
//! # Invariants
//! - A duplicate `start_timer` keeps the original reference time.
//! - Elapsed time is never negative.

use crate::clock::Clock;
use crate::model::note::NoteId;
use crate::timer::update_loop::UpdateLoop;
use log::{debug, error};
use std::collections::BTreeMap;
use std::time::Duration;

/// Tracks running timers and the periodic refresh tick.
pub struct TimerEngine<C: Clock> {
    clock: C,
    active: BTreeMap<NoteId, i64>,
    update_loop: Option<UpdateLoop>,
}

impl<C: Clock> TimerEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            active: BTreeMap::new(),
            update_loop: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Registers `note_id` as running since `started_at`.
    ///
    /// Returns `false` and keeps the existing reference time when the id is
    /// already active.
    pub fn start_timer(&mut self, note_id: NoteId, started_at: i64) -> bool {
        if self.active.contains_key(&note_id) {
            return false;
        }
        self.active.insert(note_id, started_at);
        debug!("event=timer_start module=timer status=ok note_id={note_id}");
        true
    }

    /// Unregisters `note_id`. Returns whether it was active.
    pub fn stop_timer(&mut self, note_id: NoteId) -> bool {
        let removed = self.active.remove(&note_id).is_some();
        if removed {
            debug!("event=timer_stop module=timer status=ok note_id={note_id}");
        }
        removed
    }

    pub fn is_active(&self, note_id: NoteId) -> bool {
        self.active.contains_key(&note_id)
    }

    /// Milliseconds since the reference time, or `None` if not active.
    pub fn elapsed_ms(&self, note_id: NoteId) -> Option<i64> {
        self.active
            .get(&note_id)
            .map(|started_at| self.clock.now_ms().saturating_sub(*started_at).max(0))
    }

    /// Active ids in ascending order.
    pub fn active_timer_ids(&self) -> Vec<NoteId> {
        self.active.keys().copied().collect()
    }

    /// Drops every registered timer. The update loop keeps running.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Starts the board-wide refresh loop.
    ///
    /// Returns `false` when a loop is already running or the ticker thread
    /// could not be spawned.
    pub fn start_update_loop<F>(&mut self, interval: Duration, callback: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        if self.update_loop.is_some() {
            return false;
        }
        match UpdateLoop::spawn(interval, callback) {
            Ok(update_loop) => {
                self.update_loop = Some(update_loop);
                true
            }
            Err(err) => {
                error!(
                    "event=update_loop_start module=timer status=error error_code=spawn_failed error={err}"
                );
                false
            }
        }
    }

    /// Stops the refresh loop. Returns whether one was running.
    pub fn stop_update_loop(&mut self) -> bool {
        match self.update_loop.take() {
            Some(mut update_loop) => {
                update_loop.shutdown();
                true
            }
            None => false,
        }
    }

    pub fn is_update_loop_running(&self) -> bool {
        self.update_loop.is_some()
    }
}
