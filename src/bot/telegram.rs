//! Telegram Bot API client.
//!
//! Long-polls `getUpdates` and exposes the text messages as a stream of
//! [`InboundCommand`]s; replies go out through `sendMessage`.

use super::types::{
    ApiResponse, GetUpdatesRequest, ReplyKeyboardMarkup, SendMessageRequest, Update, User,
};
use super::{ChatId, InboundCommand, Messenger};
use crate::error::{GuardError, Result};
use futures::stream::{self, Stream};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay before polling again after a failed `getUpdates`.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

pub struct TelegramBot {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramBot {
    pub fn new(token: &str, api_url: &str, poll_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(http_error)?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(http_error)?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(GuardError::Telegram(format!("{}: {}", method, description)));
        }

        envelope
            .result
            .ok_or_else(|| GuardError::Telegram(format!("{}: empty result", method)))
    }

    /// Returns the bot's own account. Fails on a bad token.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Fetches updates with id `>= offset`, waiting up to the poll timeout.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        reply_markup: Option<ReplyKeyboardMarkup>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup,
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        debug!(chat_id = chat.0, "Message sent");
        Ok(())
    }

    /// Endless stream of inbound text commands.
    ///
    /// Polling errors are logged and retried after a short delay, so the
    /// stream never ends on its own.
    pub fn commands(self: Arc<Self>) -> impl Stream<Item = InboundCommand> + Send {
        let pending: VecDeque<InboundCommand> = VecDeque::new();
        stream::unfold(
            (self, 0_i64, pending),
            |(bot, mut offset, mut pending)| async move {
                loop {
                    if let Some(command) = pending.pop_front() {
                        return Some((command, (bot, offset, pending)));
                    }

                    match bot.get_updates(offset).await {
                        Ok(updates) => {
                            offset = next_offset(offset, &updates);
                            pending.extend(updates.into_iter().filter_map(into_command));
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to fetch updates, retrying");
                            tokio::time::sleep(RETRY_DELAY).await;
                        }
                    }
                }
            },
        )
    }
}

impl Messenger for TelegramBot {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        self.send(chat, text, None).await
    }

    async fn send_menu(&self, chat: ChatId, text: &str, rows: &[&[&str]]) -> Result<()> {
        self.send(chat, text, Some(ReplyKeyboardMarkup::from_rows(rows)))
            .await
    }
}

/// Drops the request URL from a transport error; it contains the bot token.
fn http_error(e: reqwest::Error) -> GuardError {
    GuardError::Http(e.without_url())
}

/// Offset that acknowledges every update in `updates`.
fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .fold(current, i64::max)
}

/// Turns a message update into a command. Non-message updates are skipped;
/// messages without text become an empty command.
fn into_command(update: Update) -> Option<InboundCommand> {
    let message = update.message?;
    Some(InboundCommand {
        chat: ChatId(message.chat.id),
        sender: message.from.map(|user| user.display_name()),
        text: message.text.unwrap_or_default(),
    })
}
