//! Polling scheduler.
//!
//! A single task drives two timers: the change check (minutes) and the health
//! report (hours). Work runs inline in the select loop, so at most one of them
//! executes at a time and a slow fetch delays the other. The first tick of
//! each timer fires one full period after startup. Missed ticks are skipped.

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::pipeline::Tracker;

/// Timer settings for the loop.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub check_every: Duration,
    pub health_every: Duration,
    /// Send periodic health reports at all
    pub health_enabled: bool,
}

/// Run the polling loop until Ctrl+C.
pub async fn run(tracker: Tracker, schedule: Schedule) {
    run_until(tracker, schedule, async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Cannot listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Run the polling loop until `shutdown` completes.
pub async fn run_until<S>(mut tracker: Tracker, schedule: Schedule, shutdown: S)
where
    S: Future<Output = ()>,
{
    let start = Instant::now();
    let mut check_timer = time::interval_at(start + schedule.check_every, schedule.check_every);
    check_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut health_timer =
        time::interval_at(start + schedule.health_every, schedule.health_every);
    health_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log::info!(
        "Polling started (check every {}s, health every {}s{})",
        schedule.check_every.as_secs(),
        schedule.health_every.as_secs(),
        if schedule.health_enabled { "" } else { ", disabled" }
    );

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = check_timer.tick() => {
                tracker.check().await;
            }

            _ = health_timer.tick(), if schedule.health_enabled => {
                tracker.report_health().await;
            }

            _ = &mut shutdown => {
                log::info!("Shutdown signal received. Stopping polling.");
                break;
            }
        }
    }

    log::info!("Polling stopped cleanly");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::services::mailer::testing::RecordingMailer;
    use crate::services::site_testing::*;
    use crate::services::{ErrorPolicy, Notifier, SiteChecker};
    use crate::storage::LocalStorage;

    /// A tracker whose fetches always fail, so cycles never touch the disk.
    fn offline_tracker(tmp: &TempDir) -> (Tracker, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Arc::new(Notifier::new(
            mailer.clone(),
            vec!["ops@example.com".into()],
            vec!["buyer@example.com".into()],
        ));
        let checker = SiteChecker::new(
            Box::new(Arc::new(StaticFetcher::default())),
            LocalStorage::new(tmp.path()),
            notifier.clone(),
            targets(),
            ErrorPolicy::default(),
        );
        (Tracker::new(checker, notifier), mailer)
    }

    fn count(subjects: &[String], needle: &str) -> usize {
        subjects.iter().filter(|s| s.contains(needle)).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_both_tasks_on_their_periods() {
        let tmp = TempDir::new().unwrap();
        let (tracker, mailer) = offline_tracker(&tmp);
        let schedule = Schedule {
            check_every: Duration::from_secs(60),
            health_every: Duration::from_secs(120),
            health_enabled: true,
        };

        run_until(tracker, schedule, time::sleep(Duration::from_secs(181))).await;

        let subjects = mailer.subjects();
        // Three cycles, each with two failed checks and one change notice.
        assert_eq!(count(&subjects, "EXCEPTION"), 6);
        assert_eq!(count(&subjects, "DATA CHANGE"), 3);
        assert_eq!(count(&subjects, "UNHEALTHY"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_runs_before_first_period() {
        let tmp = TempDir::new().unwrap();
        let (tracker, mailer) = offline_tracker(&tmp);
        let schedule = Schedule {
            check_every: Duration::from_secs(60),
            health_every: Duration::from_secs(3600),
            health_enabled: true,
        };

        run_until(tracker, schedule, time::sleep(Duration::from_secs(59))).await;
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_reports_can_be_disabled() {
        let tmp = TempDir::new().unwrap();
        let (tracker, mailer) = offline_tracker(&tmp);
        let schedule = Schedule {
            check_every: Duration::from_secs(3600),
            health_every: Duration::from_secs(60),
            health_enabled: false,
        };

        run_until(tracker, schedule, time::sleep(Duration::from_secs(600))).await;
        assert!(mailer.sent().is_empty());
    }
}
