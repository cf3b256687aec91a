// src/pipeline/check.rs

//! One check cycle and the periodic health report.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::models::ServiceStatus;
use crate::services::{CycleReport, Notifier, SiteChecker};
use crate::storage::Channel;

/// Runs check cycles and remembers enough about the last one to report
/// service health.
pub struct Tracker {
    checker: SiteChecker,
    notifier: Arc<Notifier>,
    last_failure: Option<(DateTime<Local>, Vec<Channel>)>,
}

impl Tracker {
    pub fn new(checker: SiteChecker, notifier: Arc<Notifier>) -> Self {
        Self {
            checker,
            notifier,
            last_failure: None,
        }
    }

    /// Check both sources and send a change notice if anything moved.
    pub async fn check(&mut self) -> CycleReport {
        let cycle = self.checker.is_page_changed().await;

        self.last_failure = if cycle.failed.is_empty() {
            None
        } else {
            Some((Local::now(), cycle.failed.clone()))
        };

        if cycle.changed() {
            log::info!("Changes detected in this run !");
            self.notifier.send_change_notification(cycle.message()).await;
        } else {
            log::info!("NO changes detected in this run !");
        }
        cycle
    }

    /// Health as of the most recent cycle: unhealthy if any check failed.
    pub fn health(&self) -> (ServiceStatus, Option<String>) {
        match &self.last_failure {
            None => (ServiceStatus::Healthy, None),
            Some((at, channels)) => {
                let names: Vec<&str> = channels.iter().map(Channel::as_str).collect();
                (
                    ServiceStatus::Unhealthy,
                    Some(format!(
                        "Last check at {} failed for: {}",
                        at.format("%Y-%m-%d %H:%M:%S"),
                        names.join(", ")
                    )),
                )
            }
        }
    }

    pub async fn report_health(&self) {
        let (status, info) = self.health();
        log::info!("Service health: {status}");
        self.notifier
            .send_health_notification(status, info.as_deref())
            .await;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::services::mailer::testing::RecordingMailer;
    use crate::services::site_testing::*;
    use crate::services::{CHANGE_SUBJECT, ErrorPolicy, LOTS_CHANGED_MESSAGE};
    use crate::storage::LocalStorage;

    fn tracker(tmp: &TempDir) -> (Tracker, Arc<StaticFetcher>, Arc<RecordingMailer>) {
        let fetcher = Arc::new(StaticFetcher::default());
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Arc::new(Notifier::new(
            mailer.clone(),
            vec!["ops@example.com".into()],
            vec!["buyer@example.com".into()],
        ));
        let checker = SiteChecker::new(
            Box::new(fetcher.clone()),
            LocalStorage::new(tmp.path()),
            notifier.clone(),
            targets(),
            ErrorPolicy::default(),
        );
        (Tracker::new(checker, notifier), fetcher, mailer)
    }

    #[tokio::test]
    async fn test_change_sends_change_notification() {
        let tmp = TempDir::new().unwrap();
        let (mut tracker, fetcher, mailer) = tracker(&tmp);
        fetcher.set(PAGE_URL, &page("3 homes"));
        fetcher.set(API_URL, &lots_json(&["101"]));

        assert!(!tracker.check().await.changed());
        assert!(mailer.sent().is_empty());

        fetcher.set(API_URL, &lots_json(&[]));
        assert!(tracker.check().await.changed());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, CHANGE_SUBJECT);
        assert_eq!(sent[0].body, LOTS_CHANGED_MESSAGE);
    }

    #[tokio::test]
    async fn test_health_is_healthy_before_and_after_clean_cycle() {
        let tmp = TempDir::new().unwrap();
        let (mut tracker, fetcher, mailer) = tracker(&tmp);
        assert_eq!(tracker.health(), (ServiceStatus::Healthy, None));

        fetcher.set(PAGE_URL, &page("3 homes"));
        fetcher.set(API_URL, &lots_json(&["101"]));
        tracker.check().await;
        tracker.report_health().await;

        assert_eq!(
            mailer.subjects(),
            vec!["Service Health Notification: HEALTHY".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_cycle_makes_next_report_unhealthy() {
        let tmp = TempDir::new().unwrap();
        let (mut tracker, fetcher, mailer) = tracker(&tmp);
        fetcher.set(PAGE_URL, &page("3 homes"));

        tracker.check().await;
        let (status, info) = tracker.health();
        assert_eq!(status, ServiceStatus::Unhealthy);
        assert!(info.unwrap().ends_with("failed for: api"));

        tracker.report_health().await;
        assert_eq!(
            mailer.subjects().last().map(String::as_str),
            Some("Service Health Notification: UNHEALTHY")
        );

        fetcher.set(API_URL, &lots_json(&["101"]));
        tracker.check().await;
        assert_eq!(tracker.health().0, ServiceStatus::Healthy);
    }
}
