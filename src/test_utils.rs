//! Test doubles for the platform, transport and alert seams.

#![cfg(test)]

use crate::bot::{ChatId, Messenger};
use crate::error::{GuardError, Result};
use crate::monitor::AlertSink;
use crate::platform::{CursorControl, Position, ScreenLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Screen backend with a settable lock flag and optional failures.
pub struct FakeScreen {
    locked: AtomicBool,
    fail_query: bool,
    fail_lock: bool,
    lock_calls: AtomicUsize,
}

impl FakeScreen {
    pub fn new(locked: bool) -> Self {
        Self {
            locked: AtomicBool::new(locked),
            fail_query: false,
            fail_lock: false,
            lock_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_query() -> Self {
        Self {
            fail_query: true,
            ..Self::new(false)
        }
    }

    pub fn failing_lock() -> Self {
        Self {
            fail_lock: true,
            ..Self::new(false)
        }
    }

    pub fn lock_calls(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }
}

impl ScreenLock for FakeScreen {
    fn is_locked(&self) -> Result<bool> {
        if self.fail_query {
            return Err(GuardError::Platform("probe unavailable".to_string()));
        }
        Ok(self.locked.load(Ordering::SeqCst))
    }

    fn lock_now(&self) -> Result<()> {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lock {
            return Err(GuardError::Platform("access denied".to_string()));
        }
        self.locked.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorMode {
    Scripted,
    Drifting,
    Failing,
}

struct CursorScript {
    mode: CursorMode,
    queue: VecDeque<Position>,
    last: Position,
    scripted: usize,
    reads: usize,
    moves: Vec<Position>,
}

/// Cursor that replays queued positions, then rests on the last one.
pub struct ScriptedCursor {
    inner: Mutex<CursorScript>,
}

impl ScriptedCursor {
    fn with_mode(mode: CursorMode, last: Position, queue: &[Position]) -> Self {
        Self {
            inner: Mutex::new(CursorScript {
                mode,
                queue: queue.iter().copied().collect(),
                last,
                scripted: queue.len(),
                reads: 0,
                moves: Vec::new(),
            }),
        }
    }

    pub fn resting_at(position: Position) -> Self {
        Self::with_mode(CursorMode::Scripted, position, &[])
    }

    pub fn scripted(positions: &[Position]) -> Self {
        Self::with_mode(CursorMode::Scripted, Position::default(), positions)
    }

    /// Moves one pixel right on every read.
    pub fn drifting(start: Position) -> Self {
        Self::with_mode(CursorMode::Drifting, start, &[])
    }

    /// Every read fails.
    pub fn failing() -> Self {
        Self::with_mode(CursorMode::Failing, Position::default(), &[])
    }

    pub fn push(&self, position: Position) {
        let mut script = self.inner.lock().unwrap();
        script.queue.push_back(position);
        script.scripted += 1;
    }

    pub fn moves(&self) -> Vec<Position> {
        self.inner.lock().unwrap().moves.clone()
    }

    pub fn reads(&self) -> usize {
        self.inner.lock().unwrap().reads
    }

    /// True once every queued position has been read and the reader has
    /// come back for another, so the last one has been fully processed.
    pub fn script_consumed(&self) -> bool {
        let script = self.inner.lock().unwrap();
        script.queue.is_empty() && script.reads > script.scripted
    }
}

impl CursorControl for ScriptedCursor {
    fn position(&self) -> Result<Position> {
        let mut script = self.inner.lock().unwrap();
        script.reads += 1;
        match script.mode {
            CursorMode::Failing => Err(GuardError::Platform("no input desktop".to_string())),
            CursorMode::Drifting => {
                script.last.x += 1;
                Ok(script.last)
            }
            CursorMode::Scripted => {
                if let Some(next) = script.queue.pop_front() {
                    script.last = next;
                }
                Ok(script.last)
            }
        }
    }

    fn move_to(&self, position: Position) -> Result<()> {
        let mut script = self.inner.lock().unwrap();
        script.moves.push(position);
        script.last = position;
        Ok(())
    }
}

/// Alert sink that keeps every message.
#[derive(Default)]
pub struct AlertLog {
    messages: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl AlertSink for AlertLog {
    fn cursor_moved(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

type SentMenu = (ChatId, String, Vec<Vec<String>>);

/// Messenger that records outgoing messages instead of sending them.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
    menus: Mutex<Vec<SentMenu>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn menus(&self) -> Vec<SentMenu> {
        self.menus.lock().unwrap().clone()
    }
}

impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }

    async fn send_menu(&self, chat: ChatId, text: &str, rows: &[&[&str]]) -> Result<()> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|label| label.to_string()).collect())
            .collect();
        self.menus.lock().unwrap().push((chat, text.to_string(), rows));
        Ok(())
    }
}
