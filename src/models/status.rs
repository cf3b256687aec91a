// src/models/status.rs

//! Service health status and change reports.

use std::fmt;

/// Status tag attached to health notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
    Exception,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "HEALTHY",
            ServiceStatus::Unhealthy => "UNHEALTHY",
            ServiceStatus::Exception => "EXCEPTION",
        }
    }

    /// Fixed body text for this status.
    pub fn description(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "The service is healthy and running as configured !",
            ServiceStatus::Unhealthy => {
                "There are some issues in the service, you might want to check them out !"
            }
            ServiceStatus::Exception => {
                "An exception was encountered during the process ! Go check logs !"
            }
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a change check: whether something changed, and the message to
/// send if so. Unchanged reports carry an empty message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub changed: bool,
    pub message: String,
}

impl ChangeReport {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
        }
    }
}
