//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::Selector;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Keys are PascalCase at the top level of the file, e.g.
///
/// ```toml
/// ServiceHealthNotification = true
/// ServiceHealthNotificationFrequency = 12
/// ServiceHealthNotificationRecipients = "ops@example.com"
/// NotificationFrequency = 15
/// NotificationRecipients = "a@example.com, b@example.com"
/// MailApiToken = "app-password"
/// SenderEmail = "tracker@example.com"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Whether periodic health reports are sent at all
    pub service_health_notification: bool,

    /// Health report period in hours
    pub service_health_notification_frequency: u64,

    /// Recipients of health reports
    #[serde(deserialize_with = "split_recipients")]
    pub service_health_notification_recipients: Vec<String>,

    /// Change check period in minutes
    pub notification_frequency: u64,

    /// Recipients of data change alerts
    #[serde(deserialize_with = "split_recipients")]
    pub notification_recipients: Vec<String>,

    /// SMTP password / app token for the sender account
    pub mail_api_token: String,

    /// Sender identity, also used as the SMTP login
    pub sender_email: String,

    /// Listing page holding the availability fragment
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// Lot query endpoint
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// CSS selector for the availability fragment
    #[serde(default = "defaults::availability_selector")]
    pub availability_selector: String,

    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Directory holding the per-channel digest files
    #[serde(default = "defaults::state_dir")]
    pub state_dir: PathBuf,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub request_timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Report a change when the page check fails
    #[serde(default = "defaults::html_error_as_change")]
    pub html_error_as_change: bool,

    /// Report a change when the lot API check fails
    #[serde(default)]
    pub api_error_as_change: bool,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.service_health_notification_frequency == 0 {
            return Err(AppError::validation(
                "ServiceHealthNotificationFrequency must be > 0",
            ));
        }
        if self.notification_frequency == 0 {
            return Err(AppError::validation("NotificationFrequency must be > 0"));
        }
        if interval_secs(self.notification_frequency, 60).is_none() {
            return Err(AppError::validation(
                "NotificationFrequency must not exceed one year",
            ));
        }
        if interval_secs(self.service_health_notification_frequency, 60 * 60).is_none() {
            return Err(AppError::validation(
                "ServiceHealthNotificationFrequency must not exceed one year",
            ));
        }
        if self.sender_email.trim().is_empty() {
            return Err(AppError::validation("SenderEmail is empty"));
        }
        if self.mail_api_token.trim().is_empty() {
            return Err(AppError::validation("MailApiToken is empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::validation("RequestTimeoutSecs must be > 0"));
        }
        Url::parse(&self.page_url)?;
        Url::parse(&self.api_url)?;
        Selector::parse(&self.availability_selector)
            .map_err(|e| AppError::selector(&self.availability_selector, format!("{e:?}")))?;
        Ok(())
    }

    /// Interval between change checks.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(
            interval_secs(self.notification_frequency, 60).unwrap_or(MAX_INTERVAL_SECS),
        )
    }

    /// Interval between health reports.
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(
            interval_secs(self.service_health_notification_frequency, 60 * 60)
                .unwrap_or(MAX_INTERVAL_SECS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Send Health Notifications = {}", self.service_health_notification)?;
        writeln!(
            f,
            "Health Notification Freq = Every {} hours",
            self.service_health_notification_frequency
        )?;
        writeln!(
            f,
            "Health Notification Recipients = {:?}",
            self.service_health_notification_recipients
        )?;
        writeln!(
            f,
            "NotificationFrequency = Every {} minutes",
            self.notification_frequency
        )?;
        writeln!(f, "Notification Recipients = {:?}", self.notification_recipients)?;
        writeln!(f, "Sender = {} (token redacted)", self.sender_email)?;
        write!(f, "State Dir = {}", self.state_dir.display())
    }
}

/// Longest accepted schedule period.
pub const MAX_INTERVAL_SECS: u64 = 366 * 24 * 60 * 60;

/// `value` periods of `unit_secs` each, or `None` past [`MAX_INTERVAL_SECS`].
fn interval_secs(value: u64, unit_secs: u64) -> Option<u64> {
    value
        .checked_mul(unit_secs)
        .filter(|secs| *secs <= MAX_INTERVAL_SECS)
}

/// Accepts either a comma-separated string or a list of addresses.
fn split_recipients<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

mod defaults {
    use std::path::PathBuf;

    pub fn page_url() -> String {
        "https://www.tollbrothers.com/luxury-homes-for-sale/Virginia/Arden".into()
    }
    pub fn api_url() -> String {
        "https://go.tollbrothers.com/ws/topo.json?action=get_lots&comm_num=13154&id=topomap1"
            .into()
    }
    pub fn availability_selector() -> String {
        "div.site-plan-list__right".into()
    }
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        587
    }
    pub fn state_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; lot-tracker/0.1)".into()
    }
    pub fn html_error_as_change() -> bool {
        true
    }
}
