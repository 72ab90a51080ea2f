//! Identifier and record-kind types shared by all records.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The two kinds of record served by the record service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A family: husband, wife and children
    Family,
    /// A person: name, birth and parent family
    Person,
}

impl RecordKind {
    /// Path segment used by the record service for this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Person => "person",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier naming a family or a person
///
/// The service emits integers, but identifiers are never used
/// arithmetically, so they are kept as strings. `""` and `"0"` are sentinel
/// values meaning "no such link".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an identifier from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier is a sentinel that must never be dereferenced
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        let trimmed = self.0.trim();
        trimmed.is_empty() || trimmed == "0"
    }

    /// Resolve an optional link to a dereferenceable identifier
    ///
    /// Returns `None` for an absent link and for sentinel values.
    #[must_use]
    pub fn link(link: &Option<Self>) -> Option<&Self> {
        link.as_ref().filter(|id| !id.is_sentinel())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The service sends numbers; hand-edited fixtures often send strings
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(value) => Self(value.to_string()),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Text(value) => Self(value),
        })
    }
}
