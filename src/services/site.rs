// src/services/site.rs

//! Availability checks against the builder's listing page and lot API.
//!
//! Both checks run on every cycle. Each one fingerprints what it observed
//! and asks the store whether the fingerprint moved. Errors are contained per
//! check: they are logged, reported as an EXCEPTION health notice, and then
//! mapped to a result by the [`ErrorPolicy`].

use std::sync::Arc;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ChangeReport, Config, LotList, LotRecord, ServiceStatus};
use crate::pipeline::{Fingerprint, HtmlFragment};
use crate::services::Notifier;
use crate::storage::{Channel, LocalStorage};
use crate::utils::http::Fetcher;

/// The selector no longer isolates a single availability block.
pub const STRUCTURE_CHANGED_MESSAGE: &str = "Page HTML has updated ! Unable to parse !!";

pub const PAGE_DATA_CHANGED_MESSAGE: &str = "
Page data has changed, either available number of homes or quick move in houses has changed !
(there's a chance that, page html has changed and this is a false alarm)
";

pub const PAGE_ERROR_MESSAGE: &str = "Something went wrong. See logs for details !";

pub const LOTS_CHANGED_MESSAGE: &str = "House availability has changed !";

pub const API_ERROR_MESSAGE: &str =
    "Something went wrong (Maybe the API has changed!). See logs for details !";

/// Where to look for availability data.
#[derive(Debug, Clone)]
pub struct SiteTargets {
    pub page_url: String,
    pub api_url: String,
    pub availability_selector: String,
}

impl SiteTargets {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_url: config.page_url.clone(),
            api_url: config.api_url.clone(),
            availability_selector: config.availability_selector.clone(),
        }
    }
}

/// How a failed check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicy {
    /// A failed page check reports a change
    pub html_error_as_change: bool,
    /// A failed API check reports a change
    pub api_error_as_change: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            html_error_as_change: true,
            api_error_as_change: false,
        }
    }
}

impl ErrorPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            html_error_as_change: config.html_error_as_change,
            api_error_as_change: config.api_error_as_change,
        }
    }

    fn report_for(&self, channel: Channel) -> ChangeReport {
        match channel {
            Channel::Html if self.html_error_as_change => {
                ChangeReport::changed(PAGE_ERROR_MESSAGE)
            }
            Channel::Api if self.api_error_as_change => ChangeReport::changed(API_ERROR_MESSAGE),
            _ => ChangeReport::unchanged(),
        }
    }
}

/// Result of one full check cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Combined change report; the API message wins when both fire
    pub report: ChangeReport,
    /// Channels whose check ended in an error
    pub failed: Vec<Channel>,
}

impl CycleReport {
    pub fn changed(&self) -> bool {
        self.report.changed
    }

    pub fn message(&self) -> &str {
        &self.report.message
    }
}

/// What the availability selector matched on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Exactly one element, serialized
    Single(HtmlFragment),
    /// Any other number of matches
    Unexpected(usize),
}

/// Select the availability block from a page body.
pub fn extract_fragment(body: &str, selector: &str) -> Result<Extraction> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(body);
    let matches: Vec<_> = document.select(&parsed).collect();

    Ok(match matches.as_slice() {
        [only] => Extraction::Single(HtmlFragment(only.html())),
        other => Extraction::Unexpected(other.len()),
    })
}

/// Parse the lot API payload into the list of available lot IDs.
pub fn parse_lots(body: &str) -> Result<LotList> {
    let records: Vec<LotRecord> = serde_json::from_str(body)?;
    Ok(LotList::available(&records))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Checks both availability sources for changes.
pub struct SiteChecker {
    fetcher: Box<dyn Fetcher>,
    storage: LocalStorage,
    notifier: Arc<Notifier>,
    targets: SiteTargets,
    policy: ErrorPolicy,
}

impl SiteChecker {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        storage: LocalStorage,
        notifier: Arc<Notifier>,
        targets: SiteTargets,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            fetcher,
            storage,
            notifier,
            targets,
            policy,
        }
    }

    /// Run both checks and combine them.
    pub async fn is_page_changed(&self) -> CycleReport {
        let mut failed = Vec::new();

        let html = self.contain(Channel::Html, self.check_html().await, &mut failed).await;
        let api = self.contain(Channel::Api, self.check_api().await, &mut failed).await;

        let report = if api.changed {
            api
        } else if html.changed {
            html
        } else {
            ChangeReport::unchanged()
        };

        CycleReport { report, failed }
    }

    /// Fingerprint the availability block of the listing page.
    pub async fn check_html(&self) -> Result<ChangeReport> {
        let body = self.fetcher.fetch_text(&self.targets.page_url).await?;

        let fragment = match extract_fragment(&body, &self.targets.availability_selector)? {
            Extraction::Single(fragment) => fragment,
            Extraction::Unexpected(count) => {
                log::info!("{STRUCTURE_CHANGED_MESSAGE} ({count} matches)");
                return Ok(ChangeReport::changed(STRUCTURE_CHANGED_MESSAGE));
            }
        };

        let fingerprint = Fingerprint::of(&fragment);
        if self.storage.is_changed(&fingerprint, Channel::Html).await? {
            log::info!("{}", PAGE_DATA_CHANGED_MESSAGE.trim());
            return Ok(ChangeReport::changed(PAGE_DATA_CHANGED_MESSAGE));
        }
        Ok(ChangeReport::unchanged())
    }

    /// Fingerprint the ordered list of available lots from the API.
    pub async fn check_api(&self) -> Result<ChangeReport> {
        let body = self.fetcher.fetch_text(&self.targets.api_url).await?;
        let lots = parse_lots(&body)?;
        if lots.is_empty() {
            log::warn!("The lot API lists no available lots");
        } else {
            log::info!(
                "Available Number of Lots (Including quick move ins): {}",
                lots.len()
            );
        }

        let fingerprint = Fingerprint::of(&lots);
        if self.storage.is_changed(&fingerprint, Channel::Api).await? {
            log::info!("{LOTS_CHANGED_MESSAGE}");
            return Ok(ChangeReport::changed(LOTS_CHANGED_MESSAGE));
        }
        Ok(ChangeReport::unchanged())
    }

    /// Turn a check error into a report, after logging and alerting.
    async fn contain(
        &self,
        channel: Channel,
        result: Result<ChangeReport>,
        failed: &mut Vec<Channel>,
    ) -> ChangeReport {
        match result {
            Ok(report) => report,
            Err(e) => {
                log::error!("{} check failed: {e:?}", channel);
                failed.push(channel);
                let info = e.to_string();
                self.notifier
                    .send_health_notification(ServiceStatus::Exception, Some(info.as_str()))
                    .await;
                self.policy.report_for(channel)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    pub(crate) const PAGE_URL: &str = "https://homes.example.com/arden";
    pub(crate) const API_URL: &str = "https://go.example.com/ws/topo.json";

    /// Serves canned bodies per URL; unknown URLs fail.
    #[derive(Default)]
    pub(crate) struct StaticFetcher {
        bodies: Mutex<HashMap<String, String>>,
    }

    impl StaticFetcher {
        pub(crate) fn set(&self, url: &str, body: &str) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_string());
        }

        pub(crate) fn remove(&self, url: &str) {
            self.bodies.lock().unwrap().remove(url);
        }
    }

    #[async_trait]
    impl Fetcher for Arc<StaticFetcher> {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| {
                    AppError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        format!("no route to {url}"),
                    ))
                })
        }
    }

    pub(crate) fn targets() -> SiteTargets {
        SiteTargets {
            page_url: PAGE_URL.into(),
            api_url: API_URL.into(),
            availability_selector: "div.site-plan-list__right".into(),
        }
    }

    pub(crate) fn page(inner: &str) -> String {
        format!(
            r#"<html><body><div class="site-plan-list"><div class="site-plan-list__right">{inner}</div></div></body></html>"#
        )
    }

    pub(crate) fn lots_json(ids: &[&str]) -> String {
        let records: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"lot_status":"Available","lot_num":"{id}"}}"#))
            .collect();
        format!("[{}]", records.join(","))
    }
}
