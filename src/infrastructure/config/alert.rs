//! Alert delivery configuration.

use serde::Deserialize;

/// Alerts always go to the log. Telegram delivery additionally needs
/// `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` in the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub telegram: bool,
}
