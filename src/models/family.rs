//! Family record representation
//!
//! A family is the record returned by the service's `family` endpoint: a
//! husband, a wife and an ordered list of children, each referenced by
//! identifier. Any of the links may be absent or a sentinel.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::RecordId;
use crate::error::Result;

/// Person identifiers referenced by one family, in husband, wife, children order
pub type MemberIds<'a> = SmallVec<[&'a RecordId; 8]>;

/// Representation of a family record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRecord {
    /// Family identifier
    pub id: RecordId,
    /// Husband's person identifier (if recorded)
    #[serde(default)]
    pub husband_id: Option<RecordId>,
    /// Wife's person identifier (if recorded)
    #[serde(default)]
    pub wife_id: Option<RecordId>,
    /// Children's person identifiers
    #[serde(default)]
    pub children: Vec<RecordId>,
}

impl FamilyRecord {
    /// Create a family with no recorded members
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            husband_id: None,
            wife_id: None,
            children: Vec::new(),
        }
    }

    /// Set the husband
    #[must_use]
    pub fn with_husband(mut self, husband_id: impl Into<RecordId>) -> Self {
        self.husband_id = Some(husband_id.into());
        self
    }

    /// Set the wife
    #[must_use]
    pub fn with_wife(mut self, wife_id: impl Into<RecordId>) -> Self {
        self.wife_id = Some(wife_id.into());
        self
    }

    /// Append a child
    #[must_use]
    pub fn with_child(mut self, child_id: impl Into<RecordId>) -> Self {
        self.children.push(child_id.into());
        self
    }

    /// The husband's identifier, unless absent or a sentinel
    #[must_use]
    pub fn husband(&self) -> Option<&RecordId> {
        RecordId::link(&self.husband_id)
    }

    /// The wife's identifier, unless absent or a sentinel
    #[must_use]
    pub fn wife(&self) -> Option<&RecordId> {
        RecordId::link(&self.wife_id)
    }

    /// All dereferenceable person identifiers of this family
    ///
    /// Sentinel links are skipped.
    #[must_use]
    pub fn member_ids(&self) -> MemberIds<'_> {
        self.husband()
            .into_iter()
            .chain(self.wife())
            .chain(self.children.iter().filter(|id| !id.is_sentinel()))
            .collect()
    }

    /// Number of sentinel links carried by this family
    #[must_use]
    pub fn sentinel_links(&self) -> usize {
        let spouses = [&self.husband_id, &self.wife_id]
            .into_iter()
            .filter(|link| RecordId::link(link).is_none())
            .count();
        spouses + self.children.iter().filter(|id| id.is_sentinel()).count()
    }

    /// Decode a family from a service response body
    ///
    /// An empty body means the service has no such family and decodes to `None`.
    ///
    /// # Errors
    /// Returns an error if the body is not a valid family document
    pub fn from_json(body: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<Self>>(body)?)
    }
}
