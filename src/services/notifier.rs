// src/services/notifier.rs

//! Health and change notifications.
//!
//! Delivery is best-effort: failures are logged and never returned, so a
//! broken mail server cannot stop the polling loop.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, ServiceStatus};
use crate::services::mailer::{Email, Mailer};

/// Subject line of data change alerts.
pub const CHANGE_SUBJECT: &str = "Toll Brothers House Tracker | DATA CHANGE !";

/// Composes notices and routes them to the configured recipient lists.
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    health_recipients: Vec<String>,
    change_recipients: Vec<String>,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        health_recipients: Vec<String>,
        change_recipients: Vec<String>,
    ) -> Self {
        Self {
            mailer,
            health_recipients,
            change_recipients,
        }
    }

    pub fn from_config(config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(
            mailer,
            config.service_health_notification_recipients.clone(),
            config.notification_recipients.clone(),
        )
    }

    /// Compose a health notice.
    pub fn health_email(&self, status: ServiceStatus, info: Option<&str>) -> Email {
        Email {
            recipients: self.health_recipients.clone(),
            subject: format!("Service Health Notification: {status}"),
            body: format!(
                "{}\nAdditional Info:\n{}",
                status.description(),
                info.unwrap_or("None")
            ),
        }
    }

    /// Compose a change alert.
    pub fn change_email(&self, info: &str) -> Email {
        Email {
            recipients: self.change_recipients.clone(),
            subject: CHANGE_SUBJECT.to_string(),
            body: info.to_string(),
        }
    }

    pub async fn send_health_notification(&self, status: ServiceStatus, info: Option<&str>) {
        log::debug!("Attempting to send service health notification, {status}");
        match self.deliver(self.health_email(status, info)).await {
            Ok(true) => log::debug!("Successfully sent service health notification, {status}"),
            Ok(false) => {}
            Err(e) => log::error!(
                "Error encountered when sending service health notification, {status}: {e}"
            ),
        }
    }

    pub async fn send_change_notification(&self, info: &str) {
        log::debug!("Attempting to send data change notification");
        match self.deliver(self.change_email(info)).await {
            Ok(true) => log::debug!("Successfully sent data change notification"),
            Ok(false) => {}
            Err(e) => log::error!("Error encountered when sending data change notification: {e}"),
        }
    }

    /// Send unless there is nobody to send to. Returns whether a send happened.
    async fn deliver(&self, email: Email) -> Result<bool> {
        if email.recipients.is_empty() {
            log::warn!("No recipients configured for '{}', skipping", email.subject);
            return Ok(false);
        }
        self.mailer.send(&email).await?;
        Ok(true)
    }
}
