//! Content fingerprints for change detection.
//!
//! Each channel defines an explicit canonical byte form of what it observed;
//! the fingerprint is the lowercase hex SHA-384 of those bytes.

use std::fmt;

use sha2::{Digest, Sha384};

use crate::models::LotList;

/// A value with a stable byte encoding for hashing.
pub trait Canonical {
    fn canonical_bytes(&self) -> Vec<u8>;
}

/// Serialized outer HTML of the element holding lot availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFragment(pub String);

impl Canonical for HtmlFragment {
    fn canonical_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl Canonical for LotList {
    /// JSON array of lot IDs in API order, e.g. `["12","14"]`.
    fn canonical_bytes(&self) -> Vec<u8> {
        // A list of strings always serializes.
        serde_json::to_vec(&self.0).unwrap_or_default()
    }
}

/// Hex-encoded SHA-384 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a canonicalizable value.
    pub fn of<C: Canonical + ?Sized>(value: &C) -> Self {
        let mut hasher = Sha384::new();
        hasher.update(value.canonical_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a digest read back from storage.
    pub fn from_hex(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
