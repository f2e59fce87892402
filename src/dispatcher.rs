//! Routes chat commands to the screen and guard-mode actions.
//!
//! Commands are matched on the exact button text. Every command first makes
//! its conversation the notification target, then runs; blocking platform
//! work happens on the blocking thread pool.

use crate::bot::{InboundCommand, Messenger};
use crate::context::AppContext;
use crate::error::Result;
use crate::monitor::GuardMode;
use crate::screen;
use std::sync::Arc;

pub const BUTTON_CHECK: &str = "Проверка";
pub const BUTTON_LOCK: &str = "Блокировка";
pub const BUTTON_GUARD: &str = "Режим охраны";

/// Keyboard sent in reply to `/start`.
pub const MENU: &[&[&str]] = &[&[BUTTON_CHECK, BUTTON_LOCK], &[BUTTON_GUARD]];

pub const MSG_WELCOME: &str = "Добро пожаловать! Выберите действие:";
pub const MSG_UNKNOWN: &str = "Неизвестная команда. Пожалуйста, используйте кнопки.";
pub const MSG_CHECKING: &str = "Выполняю проверку состояния экрана...";
pub const MSG_ALREADY_LOCKED: &str = "Экран уже заблокирован.";
pub const MSG_LOCKING: &str = "Выполняю блокировку системы...";
pub const MSG_LOCKED: &str = "Система заблокирована.";
pub const MSG_LOCK_FAILED: &str = "Ошибка при блокировке экрана: ";
pub const MSG_GUARD_ON: &str = "Режим охраны активирован. Отслеживаю курсор...";
pub const MSG_GUARD_OFF: &str = "Режим охраны деактивирован.";
pub const MSG_GUARD_FAILED: &str = "Не удалось переключить режим охраны: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`: show the button menu.
    Start,
    Check,
    Lock,
    ToggleGuard,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        if is_start_command(text) {
            return Command::Start;
        }
        match text {
            BUTTON_CHECK => Command::Check,
            BUTTON_LOCK => Command::Lock,
            BUTTON_GUARD => Command::ToggleGuard,
            _ => Command::Unknown,
        }
    }
}

/// Matches `/start`, `/start@botname` and `/start <payload>`.
fn is_start_command(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('/') else {
        return false;
    };
    let word = rest.split_whitespace().next().unwrap_or("");
    let name = word.split('@').next().unwrap_or("");
    name == "start"
}

pub struct Dispatcher<M: Messenger> {
    ctx: Arc<AppContext<M>>,
}

impl<M: Messenger> Dispatcher<M> {
    pub fn new(ctx: Arc<AppContext<M>>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AppContext<M>> {
        &self.ctx
    }

    /// Handles one inbound command. Errors are transport failures only;
    /// platform failures are reported to the conversation.
    pub async fn dispatch(&self, command: &InboundCommand) -> Result<()> {
        tracing::info!(
            chat_id = command.chat.0,
            sender = command.sender.as_deref().unwrap_or("-"),
            text = %command.text,
            "Command received"
        );

        self.ctx.target.set(command.chat);

        match Command::parse(&command.text) {
            Command::Start => {
                self.ctx
                    .messenger
                    .send_menu(command.chat, MSG_WELCOME, MENU)
                    .await
            }
            Command::Check => self.handle_check(command).await,
            Command::Lock => self.handle_lock(command).await,
            Command::ToggleGuard => self.handle_guard(command).await,
            Command::Unknown => {
                self.ctx
                    .messenger
                    .send_message(command.chat, MSG_UNKNOWN)
                    .await
            }
        }
    }

    async fn handle_check(&self, command: &InboundCommand) -> Result<()> {
        let messenger = &self.ctx.messenger;
        messenger.send_message(command.chat, MSG_CHECKING).await?;

        let screen = Arc::clone(&self.ctx.screen);
        let status = tokio::task::spawn_blocking(move || screen::screen_status(screen.as_ref()))
            .await?;

        messenger.send_message(command.chat, status).await
    }

    async fn handle_lock(&self, command: &InboundCommand) -> Result<()> {
        let messenger = &self.ctx.messenger;

        let screen = Arc::clone(&self.ctx.screen);
        let locked =
            tokio::task::spawn_blocking(move || screen::is_screen_locked(screen.as_ref()))
                .await?;
        if locked {
            return messenger
                .send_message(command.chat, MSG_ALREADY_LOCKED)
                .await;
        }

        messenger.send_message(command.chat, MSG_LOCKING).await?;

        let screen = Arc::clone(&self.ctx.screen);
        let grace = self.ctx.lock_grace;
        let outcome =
            tokio::task::spawn_blocking(move || screen::lock_screen(screen.as_ref(), grace))
                .await?;

        let reply = match outcome {
            Ok(()) => MSG_LOCKED.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Screen lock failed");
                format!("{}{}", MSG_LOCK_FAILED, e)
            }
        };
        messenger.send_message(command.chat, &reply).await
    }

    async fn handle_guard(&self, command: &InboundCommand) -> Result<()> {
        let watcher = Arc::clone(&self.ctx.watcher);
        let toggled = tokio::task::spawn_blocking(move || watcher.toggle()).await?;

        let reply = match toggled {
            Ok(GuardMode::Active) => MSG_GUARD_ON.to_string(),
            Ok(GuardMode::Inactive) => MSG_GUARD_OFF.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Guard mode toggle failed");
                format!("{}{}", MSG_GUARD_FAILED, e)
            }
        };
        self.ctx
            .messenger
            .send_message(command.chat, &reply)
            .await
    }
}
