use parking_lot::Mutex;

use crate::port::{Alert, Alerter};

/// Keeps every alert for later assertions.
#[derive(Default)]
pub struct RecordingAlerter {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn clear(&self) {
        self.alerts.lock().clear();
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, alert: Alert) {
        self.alerts.lock().push(alert);
    }
}
