//! Generation-swapped snapshot cells shared by every reference manager.
//!
//! A reload builds a complete index value off-lock and publishes it with a
//! single pointer swap. Readers either clone the current `Arc` or run a
//! lookup under the read lock, so they always see one whole generation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, warn};

use crate::error::{Error, Result};
use crate::port::{Alert, Alerter};

/// A value that is replaced wholesale on reload.
pub struct Snapshot<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The current generation. Holding the `Arc` keeps it alive across a
    /// concurrent publish.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    /// Run a lookup against the current generation under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.read())
    }

    /// Swap in a new generation. The previous one is dropped after the lock
    /// is released.
    pub fn publish(&self, next: T) {
        let next = Arc::new(next);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        drop(previous);
    }
}

impl<T: Clone> Snapshot<T> {
    /// Apply an in-place edit to the live generation. Readers holding an
    /// older `Arc` keep their copy.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.current.write();
        f(Arc::make_mut(&mut guard))
    }
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Outcome of one successful reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// A manager that can refresh itself from the backing store.
pub trait Reload: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rebuild and publish a new generation.
    ///
    /// # Errors
    ///
    /// Returns the query error when the store could not be read. The
    /// previous generation stays live in that case.
    fn reload(&self) -> Result<ReloadReport>;
}

/// Tracks skipped rows while a generation is being built.
pub(crate) struct RowFailures<'a> {
    table: &'static str,
    alerter: &'a dyn Alerter,
    skipped: usize,
}

impl<'a> RowFailures<'a> {
    pub(crate) fn new(table: &'static str, alerter: &'a dyn Alerter) -> Self {
        Self {
            table,
            alerter,
            skipped: 0,
        }
    }

    /// Record a skipped row and raise an alert for it.
    pub(crate) fn skip(&mut self, key: impl Into<String>, reason: impl ToString) {
        let key = key.into();
        let reason = reason.to_string();
        let alert = Alert::RowSkipped {
            table: self.table,
            key: key.clone(),
            reason: reason.clone(),
        };
        self.skip_with(&key, &reason, alert);
    }

    /// Record a skipped row, raising `alert` in place of the generic one.
    pub(crate) fn skip_with(&mut self, key: &str, reason: &str, alert: Alert) {
        warn!(table = self.table, key, reason, "Skipping row");
        self.alerter.alert(alert);
        self.skipped += 1;
    }

    pub(crate) fn report(&self, loaded: usize) -> ReloadReport {
        ReloadReport {
            loaded,
            skipped: self.skipped,
        }
    }
}

/// Log and alert a failed full-table query, then hand the error back.
pub(crate) fn query_failed(table: &'static str, alerter: &dyn Alerter, err: Error) -> Error {
    error!(table, error = %err, "Reload query failed, keeping previous data");
    alerter.alert(Alert::QueryFailed {
        table,
        error: err.to_string(),
    });
    err
}
