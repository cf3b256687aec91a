//! Service layer for the tracker.
//!
//! This module contains the business logic for:
//! - Availability checks against the page and the lot API (`SiteChecker`)
//! - Health and change notices (`Notifier`)
//! - SMTP delivery (`SmtpMailer`)

pub mod mailer;
mod notifier;
mod site;

pub use mailer::{Email, Mailer, SmtpMailer};
pub use notifier::{CHANGE_SUBJECT, Notifier};
pub use site::{
    API_ERROR_MESSAGE, CycleReport, ErrorPolicy, Extraction, LOTS_CHANGED_MESSAGE,
    PAGE_DATA_CHANGED_MESSAGE, PAGE_ERROR_MESSAGE, STRUCTURE_CHANGED_MESSAGE, SiteChecker,
    SiteTargets, extract_fragment, parse_lots,
};

#[cfg(test)]
pub(crate) use site::testing as site_testing;
