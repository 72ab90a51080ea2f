//! Record models
//!
//! Families and persons as returned by the record service. Records are
//! immutable once fetched and are shared as `Arc`s by the pedigree tree.

pub mod family;
pub mod person;
pub mod types;

pub use family::{FamilyRecord, MemberIds};
pub use person::PersonRecord;
pub use types::{RecordId, RecordKind};
