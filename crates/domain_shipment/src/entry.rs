//! Customs entry records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, RecordId};

use crate::record::{FieldValue, ModuleType, TrackedRecord};

/// Event fields an entry exposes to milestone configurations
pub const ENTRY_DATE_FIELDS: &[&str] = &[
    "file_logged_date",
    "eta_date",
    "arrival_date",
    "entry_filed_date",
    "first_release_received_date",
    "release_date",
    "available_date",
    "freight_pickup_date",
    "cadex_accepted_date",
];

/// A customs entry as seen by the notification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: RecordId,
    pub broker_reference: String,
    pub entry_number: Option<String>,
    pub customer_number: Option<String>,
    pub importer_id: Option<CompanyId>,
    /// ISO country of import ("US", "CA")
    pub import_country: Option<String>,
    pub transport_mode_code: Option<String>,
    pub service_type: Option<String>,
    pub carrier_code: Option<String>,
    pub carrier_name: Option<String>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub entry_port_code: Option<String>,
    pub lading_port_code: Option<String>,
    pub unlading_port_code: Option<String>,
    /// Newline-delimited cargo control numbers (Canadian entries)
    pub cargo_control_numbers: Option<String>,
    /// Newline-delimited identifier lists
    pub master_bills: Option<String>,
    pub house_bills: Option<String>,
    pub container_numbers: Option<String>,
    pub po_numbers: Option<String>,

    pub file_logged_date: Option<DateTime<Utc>>,
    pub eta_date: Option<NaiveDate>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub entry_filed_date: Option<DateTime<Utc>>,
    pub first_release_received_date: Option<DateTime<Utc>>,
    pub release_date: Option<DateTime<Utc>>,
    pub available_date: Option<NaiveDate>,
    pub freight_pickup_date: Option<DateTime<Utc>>,
    pub cadex_accepted_date: Option<DateTime<Utc>>,
}

impl EntryRecord {
    /// Creates an entry with only its keys populated
    pub fn new(broker_reference: impl Into<String>, customer_number: impl Into<String>) -> Self {
        Self {
            id: RecordId::new_v7(),
            broker_reference: broker_reference.into(),
            entry_number: None,
            customer_number: Some(customer_number.into()),
            importer_id: None,
            import_country: Some("US".to_string()),
            transport_mode_code: None,
            service_type: None,
            carrier_code: None,
            carrier_name: None,
            vessel: None,
            voyage: None,
            entry_port_code: None,
            lading_port_code: None,
            unlading_port_code: None,
            cargo_control_numbers: None,
            master_bills: None,
            house_bills: None,
            container_numbers: None,
            po_numbers: None,
            file_logged_date: None,
            eta_date: None,
            arrival_date: None,
            entry_filed_date: None,
            first_release_received_date: None,
            release_date: None,
            available_date: None,
            freight_pickup_date: None,
            cadex_accepted_date: None,
        }
    }

    /// Returns true for entries filed with Canadian customs
    pub fn is_canadian(&self) -> bool {
        self.import_country
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("CA"))
    }
}

impl TrackedRecord for EntryRecord {
    fn record_id(&self) -> RecordId {
        self.id
    }

    fn module(&self) -> ModuleType {
        ModuleType::Entry
    }

    fn natural_key(&self) -> &str {
        &self.broker_reference
    }

    fn customer_number(&self) -> Option<&str> {
        self.customer_number.as_deref()
    }

    fn importer_id(&self) -> Option<CompanyId> {
        self.importer_id
    }

    fn date_value(&self, field_id: &str) -> Option<FieldValue> {
        let instant = |v: Option<DateTime<Utc>>| v.map(FieldValue::DateTime);
        let date = |v: Option<NaiveDate>| v.map(FieldValue::Date);
        match field_id {
            "file_logged_date" => instant(self.file_logged_date),
            "eta_date" => date(self.eta_date),
            "arrival_date" => instant(self.arrival_date),
            "entry_filed_date" => instant(self.entry_filed_date),
            "first_release_received_date" => instant(self.first_release_received_date),
            "release_date" => instant(self.release_date),
            "available_date" => date(self.available_date),
            "freight_pickup_date" => instant(self.freight_pickup_date),
            "cadex_accepted_date" => instant(self.cadex_accepted_date),
            _ => None,
        }
    }

    fn text_value(&self, field_id: &str) -> Option<String> {
        let text = match field_id {
            "broker_reference" => Some(self.broker_reference.as_str()),
            "entry_number" => self.entry_number.as_deref(),
            "customer_number" => self.customer_number.as_deref(),
            "import_country" => self.import_country.as_deref(),
            "transport_mode_code" => self.transport_mode_code.as_deref(),
            "service_type" => self.service_type.as_deref(),
            "carrier_code" => self.carrier_code.as_deref(),
            "vessel" => self.vessel.as_deref(),
            "entry_port_code" => self.entry_port_code.as_deref(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_catalogued_field_is_readable() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        let instant = Utc.with_ymd_and_hms(2015, 12, 1, 15, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2015, 12, 1).unwrap();
        entry.file_logged_date = Some(instant);
        entry.eta_date = Some(day);
        entry.arrival_date = Some(instant);
        entry.entry_filed_date = Some(instant);
        entry.first_release_received_date = Some(instant);
        entry.release_date = Some(instant);
        entry.available_date = Some(day);
        entry.freight_pickup_date = Some(instant);
        entry.cadex_accepted_date = Some(instant);

        for field in ENTRY_DATE_FIELDS {
            assert!(entry.date_value(field).is_some(), "{field} not readable");
        }
        assert!(entry.date_value("no_such_field").is_none());
    }

    #[test]
    fn test_text_value_falls_back_to_dates() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        entry.available_date = NaiveDate::from_ymd_opt(2015, 12, 1);
        entry.vessel = Some("MAERSK ALABAMA".to_string());

        assert_eq!(entry.text_value("available_date").as_deref(), Some("2015-12-01"));
        assert_eq!(entry.text_value("vessel").as_deref(), Some("MAERSK ALABAMA"));
        assert_eq!(entry.text_value("carrier_name"), None);
    }

    #[test]
    fn test_is_canadian() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        assert!(!entry.is_canadian());
        entry.import_country = Some("ca".to_string());
        assert!(entry.is_canadian());
    }
}
