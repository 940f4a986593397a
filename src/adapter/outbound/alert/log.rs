use tracing::error;

use crate::port::{Alert, Alerter};

/// Writes alerts to the log at error level.
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, alert: Alert) {
        match &alert {
            Alert::QueryFailed { table, error } => {
                error!(table, error = %error, "Reload query failed");
            }
            Alert::RowSkipped { table, key, reason } => {
                error!(table, key = %key, reason = %reason, "Row skipped");
            }
            Alert::ClientFailed { chain, error } => {
                error!(chain = %chain, error = %error, "Chain client failed");
            }
            Alert::TaskPanicked { task, message } => {
                error!(task = %task, message = %message, "Task panicked");
            }
        }
    }
}
