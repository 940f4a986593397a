//! Background reload loops.
//!
//! Each manager reloads on its own task. Store access is synchronous, so the
//! reload itself runs on the blocking pool; a panic there is caught by the
//! join handle, logged and alerted, and the loop carries on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::snapshot::Reload;
use crate::port::{Alert, Alerter};

pub struct Scheduler {
    alerter: Arc<dyn Alerter>,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(alerter: Arc<dyn Alerter>, shutdown: watch::Receiver<bool>) -> Self {
        Self { alerter, shutdown }
    }

    /// Reload every `interval` until shutdown. The first reload comes one
    /// interval after start; the initial load is the caller's.
    pub fn spawn_periodic(&self, target: Arc<dyn Reload>, interval: Duration) -> JoinHandle<()> {
        let alerter = Arc::clone(&self.alerter);
        let mut shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let name = target.name();
            info!(task = name, interval_secs = interval.as_secs(), "Periodic reload started");
            while !wait_or_shutdown(&mut shutdown, interval).await {
                run_reload(Arc::clone(&target), alerter.as_ref()).await;
            }
            info!(task = name, "Periodic reload stopped");
        })
    }

    /// Run `task` every day at local time `at` until shutdown.
    pub fn spawn_daily<F>(&self, name: &'static str, at: NaiveTime, task: F) -> JoinHandle<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let alerter = Arc::clone(&self.alerter);
        let mut shutdown = self.shutdown.clone();
        let task = Arc::new(task);
        tokio::spawn(async move {
            loop {
                let wait = until_next(Local::now(), at);
                debug!(task = name, wait_secs = wait.as_secs(), "Daily task sleeping");
                if wait_or_shutdown(&mut shutdown, wait).await {
                    return;
                }
                let task = Arc::clone(&task);
                if let Err(e) = tokio::task::spawn_blocking(move || task()).await {
                    report_join_error(name, &e, alerter.as_ref());
                }
            }
        })
    }
}

async fn run_reload(target: Arc<dyn Reload>, alerter: &dyn Alerter) {
    let name = target.name();
    match tokio::task::spawn_blocking(move || target.reload()).await {
        Ok(Ok(report)) => debug!(task = name, loaded = report.loaded, skipped = report.skipped, "Reload finished"),
        // Already logged and alerted by the manager.
        Ok(Err(e)) => debug!(task = name, error = %e, "Reload failed"),
        Err(e) => report_join_error(name, &e, alerter),
    }
}

fn report_join_error(task: &'static str, err: &tokio::task::JoinError, alerter: &dyn Alerter) {
    if err.is_panic() {
        error!(task, error = %err, "Scheduled task panicked");
        alerter.alert(Alert::TaskPanicked {
            task: task.to_string(),
            message: err.to_string(),
        });
    } else {
        warn!(task, error = %err, "Scheduled task cancelled");
    }
}

/// Sleep for `wait`; returns true when shutdown was requested first. A
/// `false` on the channel does not cut the sleep short.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, wait: Duration) -> bool {
    let sleep = tokio::time::sleep(wait);
    tokio::pin!(sleep);
    loop {
        if *shutdown.borrow_and_update() {
            return true;
        }
        tokio::select! {
            result = shutdown.changed() => {
                if result.is_err() {
                    return true;
                }
            }
            () = &mut sleep => return false,
        }
    }
}

/// Time from `now` to the next occurrence of `at`, strictly in the future.
fn until_next<Tz: TimeZone>(now: DateTime<Tz>, at: NaiveTime) -> Duration {
    let mut next = now.date_naive().and_time(at);
    if next <= now.naive_local() {
        next += chrono::Duration::days(1);
    }
    (next - now.naive_local()).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::application::snapshot::ReloadReport;
    use crate::error::Result;
    use crate::testkit::RecordingAlerter;

    struct Counting {
        calls: AtomicUsize,
        panic_on_first: bool,
    }

    impl Reload for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn reload(&self) -> Result<ReloadReport> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_first && n == 0 {
                panic!("boom");
            }
            Ok(ReloadReport::default())
        }
    }

    #[tokio::test]
    async fn periodic_reload_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Arc::new(RecordingAlerter::new()), rx);
        let target = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            panic_on_first: false,
        });

        let handle = scheduler.spawn_periodic(target.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(55)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let calls = target.calls.load(Ordering::SeqCst);
        assert!(calls >= 2, "expected repeated reloads, got {calls}");
    }

    #[tokio::test]
    async fn first_reload_waits_one_interval() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Arc::new(RecordingAlerter::new()), rx);
        let target = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            panic_on_first: false,
        });

        let handle = scheduler.spawn_periodic(target.clone(), Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn false_signal_keeps_waiting() {
        let (tx, rx) = watch::channel(false);
        let scheduler = Scheduler::new(Arc::new(RecordingAlerter::new()), rx);
        let target = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            panic_on_first: false,
        });

        let handle = scheduler.spawn_periodic(target.clone(), Duration::from_secs(3600));
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(false).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
        assert!(!handle.is_finished());

        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panicking_reload_is_alerted_and_loop_continues() {
        let (tx, rx) = watch::channel(false);
        let alerter = Arc::new(RecordingAlerter::new());
        let scheduler = Scheduler::new(alerter.clone(), rx);
        let target = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            panic_on_first: true,
        });

        let handle = scheduler.spawn_periodic(target.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(55)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(target.calls.load(Ordering::SeqCst) >= 2);
        assert!(alerter
            .alerts()
            .iter()
            .any(|a| matches!(a, Alert::TaskPanicked { task, .. } if task == "counting")));
    }

    #[test]
    fn next_daily_run_is_today_or_tomorrow() {
        let at = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap();
        assert_eq!(until_next(before, at), Duration::from_secs(90 * 60));

        let after = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        assert_eq!(until_next(after, at), Duration::from_secs(24 * 3600));
    }
}
