use serde::{Deserialize, Serialize};

/// Machine-readable form of an [`InvariantViolation`](crate::InvariantViolation).
///
/// States are carried as their `Display` rendering, not as structured data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Record kind, always [`ViolationRecord::KIND`].
    pub error: String,
    pub invariant: String,
    pub description: String,
    pub transition: String,
    pub before_state: String,
    pub after_state: String,
}

impl ViolationRecord {
    /// Value of the `error` field.
    pub const KIND: &'static str = "InvariantViolation";

    /// Compact JSON encoding, one record per line for log shipping.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON encoding for humans.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a record previously produced by [`ViolationRecord::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
