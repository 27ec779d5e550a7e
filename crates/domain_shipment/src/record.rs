//! Field extraction surface shared by every record kind

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, RecordId};

use crate::entry::ENTRY_DATE_FIELDS;
use crate::error::ShipmentError;
use crate::security_filing::SECURITY_FILING_DATE_FIELDS;

/// The notification module a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    /// Customs entries
    Entry,
    /// Importer security filings
    SecurityFiling,
}

impl ModuleType {
    /// Stable lowercase name, used in persisted keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Entry => "entry",
            ModuleType::SecurityFiling => "security_filing",
        }
    }

    /// Event fields records of this module expose
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            ModuleType::Entry => ENTRY_DATE_FIELDS,
            ModuleType::SecurityFiling => SECURITY_FILING_DATE_FIELDS,
        }
    }

    /// Fails unless `field_id` is an event field of this module
    pub fn ensure_date_field(&self, field_id: &str) -> Result<(), ShipmentError> {
        if self.date_fields().contains(&field_id) {
            Ok(())
        } else {
            Err(ShipmentError::unknown_field(*self, field_id))
        }
    }

    /// Parses the persisted name back into a module
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "entry" => Some(ModuleType::Entry),
            "security_filing" => Some(ModuleType::SecurityFiling),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event field value as stored on the record
///
/// Many milestone fields only carry a calendar date; others carry a full
/// instant. The distinction matters when the value is rendered for a
/// partner in a local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// A calendar date with no time component
    Date(NaiveDate),
    /// A point in time
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Returns true when the value carries no time of day
    pub fn is_date_only(&self) -> bool {
        matches!(self, FieldValue::Date(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::DateTime(instant) => write!(f, "{}", instant.to_rfc3339()),
        }
    }
}

/// Identifies one business record across modules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    /// Module of the record
    pub module: ModuleType,
    /// Surrogate identifier
    pub record_id: RecordId,
    /// Natural key (broker reference or host system file number)
    pub natural_key: String,
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.natural_key)
    }
}

/// Read-only access to a business record
///
/// The notification pipeline only ever consumes records through this trait.
pub trait TrackedRecord: Send + Sync {
    /// Surrogate identifier of the record
    fn record_id(&self) -> RecordId;

    /// Module the record belongs to
    fn module(&self) -> ModuleType;

    /// Natural key, used for locking and file naming
    fn natural_key(&self) -> &str;

    /// Customer-number-equivalent account code
    fn customer_number(&self) -> Option<&str>;

    /// Importer company linked to the record, if any
    fn importer_id(&self) -> Option<CompanyId>;

    /// Looks up an event field value by field identifier
    fn date_value(&self, field_id: &str) -> Option<FieldValue>;

    /// Looks up a text value by field identifier, for filter criteria
    fn text_value(&self, field_id: &str) -> Option<String>;

    /// Returns the cross-module reference for this record
    fn record_ref(&self) -> RecordRef {
        RecordRef {
            module: self.module(),
            record_id: self.record_id(),
            natural_key: self.natural_key().to_string(),
        }
    }
}

/// Splits a newline-delimited identifier field into its values
///
/// Values are trimmed, blanks are dropped and duplicates are removed while
/// keeping the position of their first occurrence.
pub fn split_lines(text: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for line in text.unwrap_or_default().split(['\n', '\r']) {
        let value = line.trim();
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}
