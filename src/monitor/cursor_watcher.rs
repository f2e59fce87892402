//! Guard-mode cursor watcher.
//!
//! When started, the watcher parks the cursor at a known position and polls
//! it on a worker thread. Any difference from the last observed position is
//! reported once through an [`AlertSink`], and the new position becomes the
//! baseline for the next comparison.

use crate::platform::{CursorControl, Position};
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Receives movement alerts from the polling thread.
///
/// Called synchronously on the polling thread; a slow sink delays the next
/// poll.
pub trait AlertSink: Send + Sync {
    fn cursor_moved(&self, message: &str);
}

impl<F> AlertSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn cursor_moved(&self, message: &str) {
        self(message)
    }
}

/// Alert text for a movement to `position`.
pub fn movement_message(position: Position) -> String {
    format!("Курсор сдвинулся! Новая позиция: {}", position)
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cursor is already being watched")]
    AlreadyWatching,

    #[error("cursor is not being watched")]
    NotWatching,

    #[error("failed to spawn watcher thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Whether guard mode is on after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    Active,
    Inactive,
}

/// Configuration for the cursor watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// How often to sample the cursor.
    pub interval: Duration,

    /// Where the cursor is parked when watching starts.
    pub start_position: Position,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            start_position: Position::new(500, 300),
        }
    }
}

/// Mutable watcher state, guarded by [`CursorWatcher`]'s mutex.
#[derive(Debug, Clone)]
pub struct WatcherState {
    pub running: bool,
    pub interval: Duration,
    pub target: Position,
}

impl WatcherState {
    /// Compares `current` with the baseline.
    ///
    /// On a difference the baseline moves to `current` and the new position
    /// is returned; repeated observations of the same spot return `None`.
    pub fn observe(&mut self, current: Position) -> Option<Position> {
        if current == self.target {
            return None;
        }
        self.target = current;
        Some(current)
    }
}

struct Shared {
    state: Mutex<WatcherState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WatcherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Start/stop state machine around the polling thread.
pub struct CursorWatcher {
    config: WatcherConfig,
    cursor: Arc<dyn CursorControl>,
    sink: Arc<dyn AlertSink>,
    shared: Arc<Shared>,
    /// Held for the whole of every start/stop, so toggles never interleave.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CursorWatcher {
    pub fn new(
        config: WatcherConfig,
        cursor: Arc<dyn CursorControl>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        let state = WatcherState {
            running: false,
            interval: config.interval,
            target: config.start_position,
        };
        Self {
            config,
            cursor,
            sink,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                wake: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// The position the next sample is compared against.
    pub fn baseline(&self) -> Position {
        self.shared.lock().target
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WatcherState {
        self.shared.lock().clone()
    }

    /// Parks the cursor at the start position and begins polling.
    ///
    /// # Returns
    /// `Ok(())` once the polling thread is running. Returns
    /// [`WatchError::AlreadyWatching`] without touching any state if the
    /// watcher is already running, or [`WatchError::Spawn`] if the thread
    /// could not be created. A failure to park the cursor is only logged.
    ///
    /// # Example
    /// ```no_run
    /// use std::sync::Arc;
    /// use desk_guard::monitor::{CursorWatcher, WatcherConfig};
    /// use desk_guard::platform::NativeCursor;
    ///
    /// let cursor = Arc::new(NativeCursor::new().unwrap());
    /// let alerts = Arc::new(|message: &str| println!("{}", message));
    /// let watcher = CursorWatcher::new(WatcherConfig::default(), cursor, alerts);
    ///
    /// watcher.start().unwrap();
    /// assert!(watcher.is_running());
    /// ```
    pub fn start(&self) -> Result<(), WatchError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.shared.lock();

        if state.running {
            tracing::info!("Cursor is already being watched");
            return Err(WatchError::AlreadyWatching);
        }

        let start = self.config.start_position;
        if let Err(e) = self.cursor.move_to(start) {
            tracing::warn!(error = %e, "Failed to park cursor at start position");
        }
        state.target = start;
        state.running = true;
        drop(state);

        let shared = Arc::clone(&self.shared);
        let cursor = Arc::clone(&self.cursor);
        let sink = Arc::clone(&self.sink);
        let spawned = thread::Builder::new()
            .name("cursor-watcher".to_string())
            .spawn(move || poll_loop(&shared, cursor.as_ref(), sink.as_ref()));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                tracing::info!(x = start.x, y = start.y, "Cursor watching started");
                Ok(())
            }
            Err(e) => {
                self.shared.lock().running = false;
                Err(WatchError::Spawn(e))
            }
        }
    }

    /// Stops polling and waits for the polling thread to exit.
    ///
    /// # Returns
    /// `Ok(())` once the polling thread has exited; no further alerts are
    /// delivered after that. Returns [`WatchError::NotWatching`] if the
    /// watcher was not running.
    ///
    /// # Example
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use desk_guard::monitor::{CursorWatcher, WatchError, WatcherConfig};
    /// # use desk_guard::platform::NativeCursor;
    /// # let cursor = Arc::new(NativeCursor::new().unwrap());
    /// # let alerts = Arc::new(|_: &str| {});
    /// let watcher = CursorWatcher::new(WatcherConfig::default(), cursor, alerts);
    /// watcher.start().unwrap();
    ///
    /// watcher.stop().unwrap();
    /// assert!(matches!(watcher.stop(), Err(WatchError::NotWatching)));
    /// ```
    pub fn stop(&self) -> Result<(), WatchError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = self.shared.lock();
            if !state.running {
                tracing::info!("Cursor is not being watched");
                return Err(WatchError::NotWatching);
            }
            state.running = false;
        }
        self.shared.wake.notify_all();

        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                tracing::error!("Cursor watcher thread panicked");
            }
        }

        tracing::info!("Cursor watching stopped");
        Ok(())
    }

    /// Starts the watcher when stopped, stops it when running.
    pub fn toggle(&self) -> Result<GuardMode, WatchError> {
        if self.is_running() {
            self.stop()?;
            Ok(GuardMode::Inactive)
        } else {
            self.start()?;
            Ok(GuardMode::Active)
        }
    }
}

impl Drop for CursorWatcher {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop();
        }
    }
}

/// Streak of failed cursor reads within one watching run.
///
/// A locked session can make every read fail, so only the first failure of
/// a streak is worth a warning.
#[derive(Debug, Default)]
struct ReadFailures {
    streak: u64,
}

impl ReadFailures {
    /// Counts a failure. Returns `true` if it opens a new streak.
    fn record(&mut self) -> bool {
        self.streak += 1;
        self.streak == 1
    }

    /// Ends the streak and returns its length.
    fn clear(&mut self) -> u64 {
        std::mem::take(&mut self.streak)
    }
}

/// Body of the polling thread. Returns once `running` is cleared.
fn poll_loop(shared: &Shared, cursor: &dyn CursorControl, sink: &dyn AlertSink) {
    let interval = shared.lock().interval;
    tracing::debug!(
        interval_ms = interval.as_millis() as u64,
        "Cursor polling thread started"
    );

    let mut failures = ReadFailures::default();

    loop {
        let moved = match cursor.position() {
            Ok(current) => {
                let failed = failures.clear();
                if failed > 0 {
                    tracing::info!(failed, "Cursor position readable again");
                }
                let mut state = shared.lock();
                if !state.running {
                    break;
                }
                state.observe(current)
            }
            Err(e) => {
                if failures.record() {
                    tracing::warn!(error = %e, "Failed to read cursor position");
                } else {
                    tracing::debug!(
                        error = %e,
                        streak = failures.streak,
                        "Cursor position still unreadable"
                    );
                }
                None
            }
        };

        if let Some(position) = moved {
            tracing::warn!(x = position.x, y = position.y, "Cursor moved");
            sink.cursor_moved(&movement_message(position));
        }

        let state = shared.lock();
        let (state, _) = shared
            .wake
            .wait_timeout_while(state, interval, |s| s.running)
            .unwrap_or_else(PoisonError::into_inner);
        if !state.running {
            break;
        }
    }

    tracing::debug!("Cursor polling thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{AlertLog, ScriptedCursor};
    use std::time::Instant;

    fn watcher(
        interval_ms: u64,
        start: Position,
        cursor: &Arc<ScriptedCursor>,
        alerts: &Arc<AlertLog>,
    ) -> CursorWatcher {
        let config = WatcherConfig {
            interval: Duration::from_millis(interval_ms),
            start_position: start,
        };
        CursorWatcher::new(
            config,
            Arc::clone(cursor) as Arc<dyn CursorControl>,
            Arc::clone(alerts) as Arc<dyn AlertSink>,
        )
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting for watcher");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_watcher_config_default() {
        let config = WatcherConfig::default();
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.start_position, Position::new(500, 300));
    }

    #[test]
    fn test_observe_rearms_on_every_move() {
        let mut state = WatcherState {
            running: true,
            interval: Duration::from_millis(100),
            target: Position::new(500, 300),
        };

        assert_eq!(
            state.observe(Position::new(510, 300)),
            Some(Position::new(510, 300))
        );
        assert_eq!(state.target, Position::new(510, 300));

        assert_eq!(state.observe(Position::new(510, 300)), None);

        assert_eq!(
            state.observe(Position::new(520, 300)),
            Some(Position::new(520, 300))
        );
        assert_eq!(state.target, Position::new(520, 300));
    }

    #[test]
    fn test_observe_detects_single_axis_change() {
        let mut state = WatcherState {
            running: true,
            interval: Duration::from_millis(100),
            target: Position::new(0, 0),
        };
        assert!(state.observe(Position::new(0, 1)).is_some());
        assert!(state.observe(Position::new(1, 1)).is_some());
        assert!(state.observe(Position::new(1, 1)).is_none());
    }

    #[test]
    fn test_movement_message_contains_coordinates() {
        let message = movement_message(Position::new(510, 300));
        assert!(message.contains("(510, 300)"));
    }

    #[test]
    fn test_start_parks_cursor_and_sets_baseline() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(500, 300)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(10, Position::new(500, 300), &cursor, &alerts);

        assert!(!watcher.is_running());
        watcher.start().unwrap();

        assert!(watcher.is_running());
        assert_eq!(watcher.baseline(), Position::new(500, 300));
        assert_eq!(cursor.moves(), vec![Position::new(500, 300)]);

        watcher.stop().unwrap();
        assert!(!watcher.is_running());
        assert!(alerts.messages().is_empty());
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(500, 300)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(10, Position::new(500, 300), &cursor, &alerts);

        watcher.start().unwrap();
        cursor.push(Position::new(510, 300));
        wait_until(|| alerts.len() == 1);

        let before = watcher.state();
        let err = watcher.start().unwrap_err();

        assert!(matches!(err, WatchError::AlreadyWatching));
        let after = watcher.state();
        assert!(after.running);
        assert_eq!(after.target, before.target);
        assert_eq!(after.target, Position::new(510, 300));
        // The rejected start must not park the cursor again.
        assert_eq!(cursor.moves().len(), 1);

        watcher.stop().unwrap();
    }

    #[test]
    fn test_stop_while_stopped_is_rejected() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(1, 2)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(10, Position::new(1, 2), &cursor, &alerts);

        let before = watcher.state();
        let err = watcher.stop().unwrap_err();

        assert!(matches!(err, WatchError::NotWatching));
        let after = watcher.state();
        assert!(!after.running);
        assert_eq!(after.target, before.target);
        assert!(cursor.moves().is_empty());
    }

    #[test]
    fn test_scripted_moves_produce_one_alert_each() {
        let cursor = Arc::new(ScriptedCursor::scripted(&[
            Position::new(500, 300),
            Position::new(510, 300),
            Position::new(510, 300),
            Position::new(520, 300),
        ]));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(5, Position::new(500, 300), &cursor, &alerts);

        watcher.start().unwrap();
        wait_until(|| cursor.script_consumed());
        watcher.stop().unwrap();

        let messages = alerts.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("(510, 300)"));
        assert!(messages[1].contains("(520, 300)"));
        assert_eq!(watcher.baseline(), Position::new(520, 300));
    }

    #[test]
    fn test_end_to_end_position_sequence() {
        let cursor = Arc::new(ScriptedCursor::scripted(&[
            Position::new(0, 0),
            Position::new(0, 0),
            Position::new(5, 0),
            Position::new(5, 0),
            Position::new(5, 5),
        ]));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(100, Position::new(0, 0), &cursor, &alerts);

        watcher.start().unwrap();
        wait_until(|| cursor.script_consumed());
        watcher.stop().unwrap();

        let messages = alerts.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("(5, 0)"));
        assert!(messages[1].contains("(5, 5)"));
        assert_eq!(watcher.baseline(), Position::new(5, 5));
    }

    #[test]
    fn test_no_alert_after_stop_returns() {
        let cursor = Arc::new(ScriptedCursor::drifting(Position::new(0, 0)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(5, Position::new(0, 0), &cursor, &alerts);

        watcher.start().unwrap();
        wait_until(|| alerts.len() >= 3);
        watcher.stop().unwrap();

        let count = alerts.len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(alerts.len(), count);
    }

    #[test]
    fn test_stop_wakes_long_interval() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(0, 0)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(60_000, Position::new(0, 0), &cursor, &alerts);

        watcher.start().unwrap();
        wait_until(|| cursor.reads() >= 1);

        let started = Instant::now();
        watcher.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_restart_after_stop() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(500, 300)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(5, Position::new(500, 300), &cursor, &alerts);

        watcher.start().unwrap();
        cursor.push(Position::new(600, 600));
        wait_until(|| alerts.len() == 1);
        watcher.stop().unwrap();
        assert_eq!(watcher.baseline(), Position::new(600, 600));

        // Restarting parks the cursor again and resets the baseline.
        watcher.start().unwrap();
        assert_eq!(watcher.baseline(), Position::new(500, 300));
        assert_eq!(cursor.moves().len(), 2);
        watcher.stop().unwrap();
    }

    #[test]
    fn test_toggle_alternates() {
        let cursor = Arc::new(ScriptedCursor::resting_at(Position::new(500, 300)));
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(10, Position::new(500, 300), &cursor, &alerts);

        assert_eq!(watcher.toggle().unwrap(), GuardMode::Active);
        assert!(watcher.is_running());
        assert_eq!(watcher.toggle().unwrap(), GuardMode::Inactive);
        assert!(!watcher.is_running());
    }

    #[test]
    fn test_read_failures_warn_once_per_streak() {
        let mut failures = ReadFailures::default();

        assert!(failures.record());
        assert!(!failures.record());
        assert!(!failures.record());
        assert_eq!(failures.clear(), 3);

        assert_eq!(failures.clear(), 0);
        assert!(failures.record());
    }

    #[test]
    fn test_position_errors_do_not_alert() {
        let cursor = Arc::new(ScriptedCursor::failing());
        let alerts = Arc::new(AlertLog::default());
        let watcher = watcher(5, Position::new(0, 0), &cursor, &alerts);

        watcher.start().unwrap();
        wait_until(|| cursor.reads() >= 3);
        watcher.stop().unwrap();

        assert!(alerts.messages().is_empty());
        assert_eq!(watcher.baseline(), Position::new(0, 0));
    }
}
