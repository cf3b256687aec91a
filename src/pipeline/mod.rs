//! Change detection pipeline.
//!
//! - `fingerprint`: canonical encodings and digests
//! - `check`: one check cycle plus health tracking (`Tracker`)
//! - `scheduler`: the long-running polling loop

pub mod check;
pub mod fingerprint;
pub mod scheduler;

pub use check::Tracker;
pub use fingerprint::{Canonical, Fingerprint, HtmlFragment};
pub use scheduler::{Schedule, run, run_until};
