//! Storage location identifier.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LedgerError;

/// Canonical location used when a movement does not name one.
pub const MAIN_LOCATION: &str = "main";

const MAX_LOCATION_LEN: usize = 64;

/// Identifier of a storage location (warehouse, shelf, bin).
///
/// Locations are caller-defined labels, not catalog entities. The format is
/// validated at the boundary: non-empty after trimming, at most 64 characters,
/// no control characters. Stock positions are keyed by `(ProductId, LocationId)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    /// Parse and validate a location label.
    pub fn new(label: impl AsRef<str>) -> Result<Self, LedgerError> {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LedgerError::invalid_id("location cannot be empty"));
        }
        if trimmed.len() > MAX_LOCATION_LEN {
            return Err(LedgerError::invalid_id(format!(
                "location exceeds {MAX_LOCATION_LEN} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(LedgerError::invalid_id(
                "location contains control characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The canonical `"main"` location.
    pub fn main() -> Self {
        Self(MAIN_LOCATION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LocationId {
    fn default() -> Self {
        Self::main()
    }
}

impl core::fmt::Display for LocationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocationId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// Deserialization goes through validation so a malformed label can never
// enter through the serde boundary.
impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        LocationId::new(&raw).map_err(serde::de::Error::custom)
    }
}
