//! Tagged union over the record kinds

use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, RecordId};

use crate::entry::EntryRecord;
use crate::record::{FieldValue, ModuleType, TrackedRecord};
use crate::security_filing::SecurityFilingRecord;

/// Any record the notification pipeline can be triggered for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ShipmentRecord {
    Entry(EntryRecord),
    SecurityFiling(SecurityFilingRecord),
}

impl ShipmentRecord {
    fn inner(&self) -> &dyn TrackedRecord {
        match self {
            ShipmentRecord::Entry(entry) => entry,
            ShipmentRecord::SecurityFiling(filing) => filing,
        }
    }
}

impl From<EntryRecord> for ShipmentRecord {
    fn from(entry: EntryRecord) -> Self {
        ShipmentRecord::Entry(entry)
    }
}

impl From<SecurityFilingRecord> for ShipmentRecord {
    fn from(filing: SecurityFilingRecord) -> Self {
        ShipmentRecord::SecurityFiling(filing)
    }
}

impl TrackedRecord for ShipmentRecord {
    fn record_id(&self) -> RecordId {
        self.inner().record_id()
    }

    fn module(&self) -> ModuleType {
        self.inner().module()
    }

    fn natural_key(&self) -> &str {
        self.inner().natural_key()
    }

    fn customer_number(&self) -> Option<&str> {
        self.inner().customer_number()
    }

    fn importer_id(&self) -> Option<CompanyId> {
        self.inner().importer_id()
    }

    fn date_value(&self, field_id: &str) -> Option<FieldValue> {
        self.inner().date_value(field_id)
    }

    fn text_value(&self, field_id: &str) -> Option<String> {
        self.inner().text_value(field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegates_to_variant() {
        let record: ShipmentRecord = SecurityFilingRecord::new("ISF-1", "ACME").into();
        assert_eq!(record.module(), ModuleType::SecurityFiling);
        assert_eq!(record.natural_key(), "ISF-1");
    }

    #[test]
    fn test_deserializes_with_module_tag() {
        let json = serde_json::json!({
            "module": "entry",
            "id": RecordId::new(),
            "broker_reference": "BR-9",
            "customer_number": "ACME",
            "master_bills": "MB1\nMB2",
            "eta_date": "2015-12-01"
        });

        let record: ShipmentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.natural_key(), "BR-9");
        assert!(record.date_value("eta_date").is_some());
    }
}
