//! Messaging transport.
//!
//! The dispatcher only needs the [`Messenger`] capability: send text, send a
//! text with a button menu. [`TelegramBot`] implements it over the Bot API
//! and also produces the inbound command stream.

pub mod telegram;
pub mod types;

pub use telegram::TelegramBot;

use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

/// Opaque conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text command received from a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub chat: ChatId,
    pub sender: Option<String>,
    pub text: String,
}

/// Outbound half of the transport.
pub trait Messenger: Send + Sync + 'static {
    fn send_message(&self, chat: ChatId, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Sends `text` along with a persistent keyboard of labeled buttons.
    fn send_menu(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[&[&str]],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Where watcher alerts are delivered: the most recent sender.
#[derive(Debug, Default)]
pub struct NotifyTarget {
    chat: Mutex<Option<ChatId>>,
}

impl NotifyTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, chat: ChatId) {
        *self.chat.lock().unwrap_or_else(PoisonError::into_inner) = Some(chat);
    }

    pub fn get(&self) -> Option<ChatId> {
        *self.chat.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_target_last_writer_wins() {
        let target = NotifyTarget::new();
        assert_eq!(target.get(), None);

        target.set(ChatId(1));
        target.set(ChatId(2));
        assert_eq!(target.get(), Some(ChatId(2)));
    }
}
