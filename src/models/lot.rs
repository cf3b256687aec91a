// src/models/lot.rs

//! Lot records returned by the builder's topology API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value marking a lot as purchasable.
pub const AVAILABLE_STATUS: &str = "Available";

/// Lot type of furnished show homes, which are never for sale.
pub const MODEL_TYPE: &str = "Model";

/// A single lot from the API payload.
///
/// Only the fields used for change detection are kept; anything else in the
/// payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LotRecord {
    /// Sales status, e.g. "Available", "Sold", "Under Contract"
    pub lot_status: String,

    /// Lot number; the API sends it as either a string or a number
    pub lot_num: Value,

    /// Unit type; absent for most lots
    #[serde(default)]
    pub lot_type: Option<String>,
}

impl LotRecord {
    /// Lot number rendered as text.
    pub fn lot_id(&self) -> String {
        match &self.lot_num {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this lot counts toward availability.
    pub fn is_available(&self) -> bool {
        self.lot_status == AVAILABLE_STATUS && self.lot_type.as_deref() != Some(MODEL_TYPE)
    }
}

/// Ordered list of available lot identifiers, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LotList(pub Vec<String>);

impl LotList {
    /// Collect the IDs of available non-model lots, preserving order.
    pub fn available(records: &[LotRecord]) -> Self {
        Self(
            records
                .iter()
                .filter(|lot| lot.is_available())
                .map(LotRecord::lot_id)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
