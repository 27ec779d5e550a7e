//! Notification configuration model
//!
//! Configurations live in an external store; the pipeline only reads them.
//! A configuration says which records it applies to (by customer number or
//! by parent account), which event fields to report, and how many documents
//! one event explodes into.

use serde::{Deserialize, Serialize};

use core_kernel::{ConfigId, Timezone};
use domain_shipment::{ModuleType, TrackedRecord};

use crate::error::MilestoneError;

/// How a configuration is matched against a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MatchKey {
    /// The record's own customer number
    CustomerNumber(String),
    /// The system code of a parent company linked to the record's importer
    ParentSystemCode(String),
}

/// Account keys a record can be matched on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountKeys {
    pub customer_number: Option<String>,
    pub parent_system_codes: Vec<String>,
}

impl MatchKey {
    /// Returns true when this key selects a record carrying `keys`
    pub fn matches(&self, keys: &AccountKeys) -> bool {
        match self {
            MatchKey::CustomerNumber(number) => keys
                .customer_number
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(number.trim())),
            MatchKey::ParentSystemCode(code) => keys
                .parent_system_codes
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(code.trim())),
        }
    }
}

/// Number of documents one event produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputStyle {
    /// One document with every identifier
    #[default]
    Standard,
    /// One document per master bill
    PerMasterBill,
    /// One document per master bill and container pair
    PerMasterBillAndContainer,
    /// One document per cargo control number
    PerCargoControlNumber,
    /// One document per house bill
    PerHouseBill,
}

/// One reported event field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Record field identifier (e.g. `release_date`)
    pub field_id: String,
    /// Event code sent to the partner; defaults to the field identifier
    #[serde(default)]
    pub event_code: Option<String>,
    /// Timezone the value is reported in; defaults to the module timezone
    #[serde(default)]
    pub timezone: Option<Timezone>,
    /// Report the date only, at local midnight
    #[serde(default)]
    pub no_time: bool,
}

impl FieldSpec {
    pub fn new(field_id: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            event_code: None,
            timezone: None,
            no_time: false,
        }
    }

    pub fn with_event_code(mut self, code: impl Into<String>) -> Self {
        self.event_code = Some(code.into());
        self
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn date_only(mut self) -> Self {
        self.no_time = true;
        self
    }

    /// Event code reported for this field
    pub fn code(&self) -> &str {
        self.event_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.field_id.as_str())
    }
}

/// Comparison applied by a field criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriterionOperator {
    Equals,
    NotEquals,
    Contains,
    IsEmpty,
    IsNotEmpty,
    /// Value is a newline-separated list of accepted values
    In,
}

/// An additional field-based filter on a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCriterion {
    pub field_id: String,
    pub operator: CriterionOperator,
    #[serde(default)]
    pub value: String,
}

impl FieldCriterion {
    pub fn new(field_id: impl Into<String>, operator: CriterionOperator, value: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluates the criterion against a record
    pub fn evaluate(&self, record: &dyn TrackedRecord) -> bool {
        let actual = record
            .text_value(&self.field_id)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let expected = self.value.trim();

        match self.operator {
            CriterionOperator::IsEmpty => actual.is_none(),
            CriterionOperator::IsNotEmpty => actual.is_some(),
            CriterionOperator::Equals => actual.is_some_and(|a| a.eq_ignore_ascii_case(expected)),
            CriterionOperator::NotEquals => !actual.is_some_and(|a| a.eq_ignore_ascii_case(expected)),
            CriterionOperator::Contains => actual.is_some_and(|a| {
                a.to_ascii_uppercase().contains(&expected.to_ascii_uppercase())
            }),
            CriterionOperator::In => actual.is_some_and(|a| {
                expected
                    .lines()
                    .map(str::trim)
                    .any(|candidate| candidate.eq_ignore_ascii_case(&a))
            }),
        }
    }
}

/// Extra values folded into an event fingerprint
///
/// Event code and final timestamp are always hashed; these inputs follow
/// them in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FingerprintInput {
    /// A fixed salt, to force a resend after a partner-side reset
    Salt(String),
    /// The delivery channel name
    Channel,
    /// The record's natural key
    RecordKey,
    /// Every master bill on the record
    MasterBills,
    /// Every container on the record
    Containers,
}

/// A milestone notification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub id: ConfigId,
    pub module: ModuleType,
    pub match_key: MatchKey,
    /// Partner key, names the delivery folder
    pub partner_key: String,
    pub enabled: bool,
    /// Testing configurations deliver to the test folder and keep no state
    #[serde(default)]
    pub testing: bool,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub output_style: OutputStyle,
    #[serde(default)]
    pub criteria: Vec<FieldCriterion>,
    /// Manufacture unique minute offsets for repeated sends on one day
    #[serde(default)]
    pub disambiguate_timestamps: bool,
    #[serde(default)]
    pub fingerprint_inputs: Vec<FingerprintInput>,
}

impl NotificationConfig {
    /// Creates an enabled, standard-style configuration with no fields
    pub fn new(module: ModuleType, match_key: MatchKey, partner_key: impl Into<String>) -> Self {
        Self {
            id: ConfigId::new_v7(),
            module,
            match_key,
            partner_key: partner_key.into(),
            enabled: true,
            testing: false,
            fields: Vec::new(),
            output_style: OutputStyle::Standard,
            criteria: Vec::new(),
            disambiguate_timestamps: false,
            fingerprint_inputs: Vec::new(),
        }
    }

    /// Returns true when every field criterion holds for the record
    pub fn criteria_met(&self, record: &dyn TrackedRecord) -> bool {
        self.criteria.iter().all(|c| c.evaluate(record))
    }

    /// Folder the partner's documents are written to
    pub fn delivery_folder(&self) -> String {
        delivery_folder(&self.partner_key, self.testing)
    }

    /// Checks the configuration can drive a dispatch
    pub fn validate(&self) -> Result<(), MilestoneError> {
        if self.partner_key.trim().is_empty() {
            return Err(MilestoneError::invalid_config(format!(
                "configuration {} has no partner key",
                self.id
            )));
        }
        if self.fields.is_empty() {
            return Err(MilestoneError::invalid_config(format!(
                "configuration {} reports no fields",
                self.id
            )));
        }
        let mut channels = std::collections::HashSet::new();
        for field in &self.fields {
            self.module.ensure_date_field(&field.field_id)?;
            if !channels.insert((field.field_id.as_str(), field.code())) {
                return Err(MilestoneError::invalid_config(format!(
                    "configuration {} reports {} as {} twice",
                    self.id,
                    field.field_id,
                    field.code()
                )));
            }
        }
        Ok(())
    }
}

/// Delivery folder for a partner, with the `_test` sibling for test runs
pub fn delivery_folder(partner_key: &str, testing: bool) -> String {
    if testing {
        format!("{}_test", partner_key.trim())
    } else {
        partner_key.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_shipment::EntryRecord;

    fn keys(customer: &str, parents: &[&str]) -> AccountKeys {
        AccountKeys {
            customer_number: Some(customer.to_string()),
            parent_system_codes: parents.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_match_key_customer_number() {
        let key = MatchKey::CustomerNumber("ACME".to_string());
        assert!(key.matches(&keys("acme", &[])));
        assert!(!key.matches(&keys("OTHER", &["ACME"])));
    }

    #[test]
    fn test_match_key_parent_code() {
        let key = MatchKey::ParentSystemCode("HQ1".to_string());
        assert!(key.matches(&keys("ACME", &["XX", "HQ1"])));
        assert!(!key.matches(&keys("HQ1", &[])));
    }

    #[test]
    fn test_field_spec_code_defaults_to_field() {
        assert_eq!(FieldSpec::new("release_date").code(), "release_date");
        assert_eq!(FieldSpec::new("release_date").with_event_code("VD").code(), "VD");
    }

    #[test]
    fn test_criteria() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        entry.transport_mode_code = Some("11".to_string());

        assert!(FieldCriterion::new("transport_mode_code", CriterionOperator::In, "10\n11").evaluate(&entry));
        assert!(FieldCriterion::new("transport_mode_code", CriterionOperator::Equals, "11").evaluate(&entry));
        assert!(!FieldCriterion::new("transport_mode_code", CriterionOperator::NotEquals, "11").evaluate(&entry));
        assert!(FieldCriterion::new("vessel", CriterionOperator::IsEmpty, "").evaluate(&entry));
        assert!(!FieldCriterion::new("vessel", CriterionOperator::IsNotEmpty, "").evaluate(&entry));
        assert!(FieldCriterion::new("broker_reference", CriterionOperator::Contains, "r-").evaluate(&entry));
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let mut config = NotificationConfig::new(
            ModuleType::SecurityFiling,
            MatchKey::CustomerNumber("ACME".to_string()),
            "ACME",
        );
        config.fields.push(FieldSpec::new("release_date"));

        assert!(matches!(config.validate(), Err(MilestoneError::Shipment(_))));
    }

    #[test]
    fn test_validate_rejects_repeated_channel() {
        let mut config = NotificationConfig::new(
            ModuleType::Entry,
            MatchKey::CustomerNumber("ACME".to_string()),
            "ACME",
        );
        config.fields.push(FieldSpec::new("release_date").with_event_code("VR"));
        config.fields.push(FieldSpec::new("release_date").with_event_code("VA"));
        assert!(config.validate().is_ok());

        config.fields.push(FieldSpec::new("release_date").with_event_code("VR"));
        assert!(matches!(config.validate(), Err(MilestoneError::InvalidConfig(_))));
    }

    #[test]
    fn test_delivery_folder() {
        assert_eq!(delivery_folder("ACME", false), "ACME");
        assert_eq!(delivery_folder("ACME", true), "ACME_test");
    }

    #[test]
    fn test_output_style_serde_names() {
        let style: OutputStyle = serde_json::from_str("\"perMasterBillAndContainer\"").unwrap();
        assert_eq!(style, OutputStyle::PerMasterBillAndContainer);
    }
}
