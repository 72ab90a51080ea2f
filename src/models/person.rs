//! Person record representation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::RecordId;
use crate::error::Result;

/// Birth date formats seen in service data, tried in order
const BIRTH_DATE_FORMATS: [&str; 3] = ["%m-%d-%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Representation of a person record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Person identifier
    pub id: RecordId,
    /// Given name
    #[serde(default)]
    pub name: String,
    /// Birth date as sent by the service (e.g. `9-3-1846`)
    #[serde(default, alias = "birth")]
    pub birth_date: Option<String>,
    /// Family in which this person is a child; traversal stops when absent
    #[serde(default, alias = "parent_id")]
    pub parent_family_id: Option<RecordId>,
    /// Family in which this person is a spouse
    #[serde(default, alias = "family_id")]
    pub own_family_id: Option<RecordId>,
}

impl PersonRecord {
    /// Create a person with a name and no recorded links
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birth_date: None,
            parent_family_id: None,
            own_family_id: None,
        }
    }

    /// Set the birth date string
    #[must_use]
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Set the family this person is a child of
    #[must_use]
    pub fn with_parent_family(mut self, family_id: impl Into<RecordId>) -> Self {
        self.parent_family_id = Some(family_id.into());
        self
    }

    /// Set the family this person is a spouse in
    #[must_use]
    pub fn with_own_family(mut self, family_id: impl Into<RecordId>) -> Self {
        self.own_family_id = Some(family_id.into());
        self
    }

    /// The parent family identifier, unless absent or a sentinel
    #[must_use]
    pub fn parent_family(&self) -> Option<&RecordId> {
        RecordId::link(&self.parent_family_id)
    }

    /// Parse the birth date, trying each known format
    #[must_use]
    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        let raw = self.birth_date.as_deref()?.trim();
        BIRTH_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }

    /// Decode a person from a service response body
    ///
    /// An empty body means the service has no such person and decodes to `None`.
    ///
    /// # Errors
    /// Returns an error if the body is not a valid person document
    pub fn from_json(body: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<Self>>(body)?)
    }
}
