//! Identifiers for records handed to the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a trip record, assigned by whichever layer created the trip.
///
/// The engine never interprets it; it is echoed back in warnings and overlap
/// reports so the UI can point at the offending row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TripId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
