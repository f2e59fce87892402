//! Application context shared by the dispatcher and the cursor watcher.

use crate::bot::{Messenger, NotifyTarget};
use crate::monitor::{AlertSink, CursorWatcher, WatcherConfig};
use crate::platform::{CursorControl, ScreenLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Delivers watcher alerts to the last conversation that sent a command.
///
/// Runs on the watcher thread and blocks it until the message is sent.
/// Alerts raised before any command arrived are dropped.
pub struct ChatAlerts<M: Messenger> {
    messenger: Arc<M>,
    target: Arc<NotifyTarget>,
    runtime: Handle,
}

impl<M: Messenger> ChatAlerts<M> {
    pub fn new(messenger: Arc<M>, target: Arc<NotifyTarget>, runtime: Handle) -> Self {
        Self {
            messenger,
            target,
            runtime,
        }
    }
}

impl<M: Messenger> AlertSink for ChatAlerts<M> {
    fn cursor_moved(&self, message: &str) {
        let Some(chat) = self.target.get() else {
            tracing::debug!("No conversation yet, dropping alert");
            return;
        };

        if let Err(e) = self
            .runtime
            .block_on(self.messenger.send_message(chat, message))
        {
            tracing::warn!(chat_id = chat.0, error = %e, "Failed to deliver alert");
        }
    }
}

/// Everything a command handler needs, passed explicitly instead of globals.
pub struct AppContext<M: Messenger> {
    pub messenger: Arc<M>,
    pub screen: Arc<dyn ScreenLock>,
    pub watcher: Arc<CursorWatcher>,
    pub target: Arc<NotifyTarget>,
    pub lock_grace: Duration,
}

impl<M: Messenger> AppContext<M> {
    /// Wires the watcher's alerts to `messenger` through a fresh notify target.
    ///
    /// `runtime` must belong to a runtime that outlives the watcher; alerts
    /// are sent by blocking on it from the watcher thread.
    pub fn new(
        messenger: Arc<M>,
        screen: Arc<dyn ScreenLock>,
        cursor: Arc<dyn CursorControl>,
        watcher_config: WatcherConfig,
        lock_grace: Duration,
        runtime: Handle,
    ) -> Self {
        let target = Arc::new(NotifyTarget::new());
        let alerts = ChatAlerts::new(Arc::clone(&messenger), Arc::clone(&target), runtime);
        let watcher = Arc::new(CursorWatcher::new(
            watcher_config,
            cursor,
            Arc::new(alerts),
        ));

        Self {
            messenger,
            screen,
            watcher,
            target,
            lock_grace,
        }
    }
}
