//! Background ticker behind the timer refresh loop.
//!
//! # Responsibility
//! - Invoke one callback at a fixed interval on a dedicated thread.
//! - Stop promptly on request or drop.
//!
//! # Invariants
//! - The callback never runs after `shutdown` returns.

use log::{debug, error};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running ticker thread.
pub struct UpdateLoop {
    interval: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl UpdateLoop {
    /// Spawns the ticker thread.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn<F>(interval: Duration, mut callback: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("kanban-timer-tick".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => callback(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(
            "event=update_loop_start module=timer status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the ticker and waits for its thread to exit.
    pub fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=update_loop_stop module=timer status=error error_code=tick_panicked");
                return;
            }
            debug!("event=update_loop_stop module=timer status=ok");
        }
    }
}

impl Drop for UpdateLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateLoop;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn ticks_until_shutdown() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut ticker = UpdateLoop::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("ticker should spawn");

        thread::sleep(Duration::from_millis(60));
        ticker.shutdown();
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop > 0);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let ticker = UpdateLoop::spawn(Duration::ZERO, || {}).expect("ticker should spawn");
        assert_eq!(ticker.interval(), Duration::from_millis(1));
    }
}
