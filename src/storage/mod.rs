//! Fingerprint persistence.
//!
//! One flat file per channel holds the latest digest and nothing else:
//!
//! ```text
//! {state_dir}/
//! ├── html.hash    # digest of the availability fragment
//! └── api.hash     # digest of the available lot IDs
//! ```

pub mod local;

use std::fmt;

// Re-export for convenience
pub use local::LocalStorage;

/// A polled source of availability data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Fragment of the listing page
    Html,
    /// Lot query endpoint
    Api,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Html => "html",
            Channel::Api => "api",
        }
    }

    /// File name of the channel's digest, relative to the state directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Channel::Html => "html.hash",
            Channel::Api => "api.hash",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
