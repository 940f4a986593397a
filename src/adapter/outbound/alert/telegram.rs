//! Telegram delivery for operational alerts.
//!
//! Alerts are queued on a channel and sent by a background worker, so
//! reload paths never wait on the Telegram API.
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::port::{Alert, Alerter};

/// Bot credentials and target chat.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for alerts.
    pub chat_id: i64,
}

impl TelegramConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`. Returns `None` if
    /// either is missing or the chat id is not a number.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|s| s.parse().ok())?;
        Some(Self { bot_token, chat_id })
    }
}

/// Alerter that forwards every alert to a Telegram chat.
pub struct TelegramAlerter {
    sender: mpsc::UnboundedSender<Alert>,
}

impl TelegramAlerter {
    /// Create the alerter and spawn its delivery worker.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(config, receiver));
        Self { sender }
    }
}

impl Alerter for TelegramAlerter {
    fn alert(&self, alert: Alert) {
        if self.sender.send(alert).is_err() {
            warn!("Telegram alert channel closed");
        }
    }
}

async fn telegram_worker(config: TelegramConfig, mut receiver: mpsc::UnboundedReceiver<Alert>) {
    let bot = Bot::new(&config.bot_token);
    let chat_id = ChatId(config.chat_id);

    info!(chat_id = config.chat_id, "Telegram alerter started");

    while let Some(alert) = receiver.recv().await {
        let text = format_alert(&alert);
        if let Err(e) = bot
            .send_message(chat_id, &text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            error!(error = %e, "Failed to send Telegram alert");
        }
    }

    warn!("Telegram alerter worker shutting down");
}

fn format_alert(alert: &Alert) -> String {
    let (title, body) = match alert {
        Alert::QueryFailed { table, error } => (
            "Reload Query Failed",
            format!("📋 Table: `{}`\n🚫 {}", escape_markdown(table), escape_markdown(error)),
        ),
        Alert::RowSkipped { table, key, reason } => (
            "Row Skipped",
            format!(
                "📋 Table: `{}`\n🔑 Key: `{}`\n🚫 {}",
                escape_markdown(table),
                escape_markdown(key),
                escape_markdown(reason)
            ),
        ),
        Alert::ClientFailed { chain, error } => (
            "Chain Client Failed",
            format!("⛓ Chain: `{}`\n🚫 {}", escape_markdown(chain), escape_markdown(error)),
        ),
        Alert::TaskPanicked { task, message } => (
            "Task Panicked",
            format!("⚙️ Task: `{}`\n🚫 {}", escape_markdown(task), escape_markdown(message)),
        ),
    };
    format!("⚠️ *{title}*\n\n{body}")
}

/// Escape the characters MarkdownV2 reserves.
fn escape_markdown(text: &str) -> String {
    const RESERVED: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Mutex to serialize tests that modify environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn from_env_requires_numeric_chat_id() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");
        std::env::set_var("TELEGRAM_CHAT_ID", "not-a-number");
        assert!(TelegramConfig::from_env().is_none());

        std::env::set_var("TELEGRAM_CHAT_ID", "-10042");
        let config = TelegramConfig::from_env().unwrap();
        assert_eq!(config.bot_token, "test-token");
        assert_eq!(config.chat_id, -10042);

        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn from_env_missing_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::set_var("TELEGRAM_CHAT_ID", "1");
        assert!(TelegramConfig::from_env().is_none());
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn alert_text_escapes_markdown() {
        let text = format_alert(&Alert::RowSkipped {
            table: "t_dynamic_dtc",
            key: "usdt/eth-arb".into(),
            reason: "dtc_lv2 not a number (1.2.3)".into(),
        });
        assert!(text.starts_with("⚠️ *Row Skipped*"));
        assert!(text.contains("t\\_dynamic\\_dtc"));
        assert!(text.contains("usdt/eth\\-arb"));
        assert!(text.contains("\\(1\\.2\\.3\\)"));
    }

    #[tokio::test]
    async fn alert_after_worker_exit_does_not_panic() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let alerter = TelegramAlerter { sender };
        alerter.alert(Alert::TaskPanicked {
            task: "reload".into(),
            message: "boom".into(),
        });
    }
}
