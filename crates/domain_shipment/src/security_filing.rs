//! Importer security filing records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, RecordId};

use crate::record::{FieldValue, ModuleType, TrackedRecord};

/// Event fields a security filing exposes to milestone configurations
pub const SECURITY_FILING_DATE_FIELDS: &[&str] = &[
    "first_sent_date",
    "first_accepted_date",
    "last_sent_date",
    "last_accepted_date",
    "estimated_vessel_load_date",
    "estimated_vessel_arrival_date",
];

/// A security filing as seen by the notification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFilingRecord {
    pub id: RecordId,
    pub host_system_file_number: String,
    pub transaction_number: Option<String>,
    /// Importer account code, the customer-number equivalent
    pub importer_account_code: Option<String>,
    pub importer_id: Option<CompanyId>,
    pub transport_mode_code: Option<String>,
    pub scac: Option<String>,
    pub carrier_name: Option<String>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub entry_port_code: Option<String>,
    pub lading_port_code: Option<String>,
    pub unlading_port_code: Option<String>,
    pub master_bills: Option<String>,
    pub house_bills: Option<String>,
    pub container_numbers: Option<String>,
    pub po_numbers: Option<String>,

    pub first_sent_date: Option<DateTime<Utc>>,
    pub first_accepted_date: Option<DateTime<Utc>>,
    pub last_sent_date: Option<DateTime<Utc>>,
    pub last_accepted_date: Option<DateTime<Utc>>,
    pub estimated_vessel_load_date: Option<NaiveDate>,
    pub estimated_vessel_arrival_date: Option<NaiveDate>,
}

impl SecurityFilingRecord {
    /// Creates a filing with only its keys populated
    pub fn new(host_system_file_number: impl Into<String>, importer_account_code: impl Into<String>) -> Self {
        Self {
            id: RecordId::new_v7(),
            host_system_file_number: host_system_file_number.into(),
            transaction_number: None,
            importer_account_code: Some(importer_account_code.into()),
            importer_id: None,
            transport_mode_code: None,
            scac: None,
            carrier_name: None,
            vessel: None,
            voyage: None,
            entry_port_code: None,
            lading_port_code: None,
            unlading_port_code: None,
            master_bills: None,
            house_bills: None,
            container_numbers: None,
            po_numbers: None,
            first_sent_date: None,
            first_accepted_date: None,
            last_sent_date: None,
            last_accepted_date: None,
            estimated_vessel_load_date: None,
            estimated_vessel_arrival_date: None,
        }
    }
}

impl TrackedRecord for SecurityFilingRecord {
    fn record_id(&self) -> RecordId {
        self.id
    }

    fn module(&self) -> ModuleType {
        ModuleType::SecurityFiling
    }

    fn natural_key(&self) -> &str {
        &self.host_system_file_number
    }

    fn customer_number(&self) -> Option<&str> {
        self.importer_account_code.as_deref()
    }

    fn importer_id(&self) -> Option<CompanyId> {
        self.importer_id
    }

    fn date_value(&self, field_id: &str) -> Option<FieldValue> {
        match field_id {
            "first_sent_date" => self.first_sent_date.map(FieldValue::DateTime),
            "first_accepted_date" => self.first_accepted_date.map(FieldValue::DateTime),
            "last_sent_date" => self.last_sent_date.map(FieldValue::DateTime),
            "last_accepted_date" => self.last_accepted_date.map(FieldValue::DateTime),
            "estimated_vessel_load_date" => self.estimated_vessel_load_date.map(FieldValue::Date),
            "estimated_vessel_arrival_date" => self.estimated_vessel_arrival_date.map(FieldValue::Date),
            _ => None,
        }
    }

    fn text_value(&self, field_id: &str) -> Option<String> {
        let text = match field_id {
            "host_system_file_number" => Some(self.host_system_file_number.as_str()),
            "transaction_number" => self.transaction_number.as_deref(),
            "importer_account_code" => self.importer_account_code.as_deref(),
            "transport_mode_code" => self.transport_mode_code.as_deref(),
            "scac" => self.scac.as_deref(),
            "vessel" => self.vessel.as_deref(),
            "lading_port_code" => self.lading_port_code.as_deref(),
            "unlading_port_code" => self.unlading_port_code.as_deref(),
            "master_bills" => self.master_bills.as_deref(),
            "house_bills" => self.house_bills.as_deref(),
            "container_numbers" => self.container_numbers.as_deref(),
            "po_numbers" => self.po_numbers.as_deref(),
            other => return self.date_value(other).map(|v| v.to_string()),
        };
        text.map(str::to_string)
    }
}
