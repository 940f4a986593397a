//! Alert port for operational problems that need a human.
//!
//! Reloads never fail loudly: a bad row is skipped and a failed query keeps
//! the previous data live. Both cases are reported through this port so
//! they are not silently lost.

use std::fmt;

/// Things worth waking someone up for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The full-table query of a reload failed; the previous generation stays live.
    QueryFailed { table: &'static str, error: String },
    /// One row could not be decoded and was left out of the new generation.
    RowSkipped {
        table: &'static str,
        key: String,
        reason: String,
    },
    /// A chain client could not be built; the chain row was skipped.
    ClientFailed { chain: String, error: String },
    /// A scheduled task panicked.
    TaskPanicked { task: String, message: String },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::QueryFailed { table, error } => write!(f, "select {table} error: {error}"),
            Alert::RowSkipped { table, key, reason } => {
                write!(f, "skipped {table} row {key}: {reason}")
            }
            Alert::ClientFailed { chain, error } => {
                write!(f, "create client for {chain} error: {error}")
            }
            Alert::TaskPanicked { task, message } => write!(f, "task {task} panicked: {message}"),
        }
    }
}

/// Receiver of alerts.
///
/// `alert` is called from reload paths and must return quickly; slow
/// deliveries belong on a background task.
pub trait Alerter: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Broadcasts each alert to every registered alerter.
#[derive(Default)]
pub struct AlerterRegistry {
    alerters: Vec<Box<dyn Alerter>>,
}

impl AlerterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, alerter: Box<dyn Alerter>) {
        self.alerters.push(alerter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alerters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerters.is_empty()
    }
}

impl Alerter for AlerterRegistry {
    fn alert(&self, alert: Alert) {
        for alerter in &self.alerters {
            alerter.alert(alert.clone());
        }
    }
}

/// Drops every alert.
pub struct NullAlerter;

impl Alerter for NullAlerter {
    fn alert(&self, _alert: Alert) {}
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct CountingAlerter(Arc<AtomicUsize>);

    impl Alerter for CountingAlerter {
        fn alert(&self, _alert: Alert) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registry_fans_out_to_every_alerter() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = AlerterRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(CountingAlerter(count.clone())));
        registry.register(Box::new(CountingAlerter(count.clone())));
        registry.register(Box::new(NullAlerter));
        assert_eq!(registry.len(), 3);

        registry.alert(Alert::QueryFailed {
            table: "t_chain_info",
            error: "down".into(),
        });

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn alerts_render_their_context() {
        let alert = Alert::RowSkipped {
            table: "t_dynamic_dtc",
            key: "usdt/ethereum/arbitrum".into(),
            reason: "dtc_lv2 not a number".into(),
        };
        assert_eq!(
            alert.to_string(),
            "skipped t_dynamic_dtc row usdt/ethereum/arbitrum: dtc_lv2 not a number"
        );
    }
}
