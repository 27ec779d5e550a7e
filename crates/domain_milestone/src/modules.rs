//! Module-specific document extraction
//!
//! Entries and security filings report the same document layout from
//! differently named fields. Each record kind implements
//! [`ModuleStrategy`]; the assembler only talks to the trait.

use async_trait::async_trait;

use domain_shipment::{split_lines, EntryRecord, SecurityFilingRecord, ShipmentRecord};

use crate::data::DocumentHeader;
use crate::error::MilestoneError;
use crate::port_location::{PortLocationResolver, PortRole};
use crate::splitter::IdentifierSet;

/// Extraction of document content from one record kind
#[async_trait]
pub trait ModuleStrategy: Send + Sync {
    /// Record-level document fields, ports resolved
    async fn header(&self, ports: &PortLocationResolver) -> Result<DocumentHeader, MilestoneError>;

    /// Every identifier the record carries, before splitting
    fn identifiers(&self) -> IdentifierSet;
}

/// Returns the strategy for a record
pub fn strategy(record: &ShipmentRecord) -> &dyn ModuleStrategy {
    match record {
        ShipmentRecord::Entry(entry) => entry,
        ShipmentRecord::SecurityFiling(filing) => filing,
    }
}

#[async_trait]
impl ModuleStrategy for EntryRecord {
    async fn header(&self, ports: &PortLocationResolver) -> Result<DocumentHeader, MilestoneError> {
        let canadian = self.is_canadian();
        let resolve = |code: Option<String>, role: PortRole| {
            let key = self.broker_reference.clone();
            async move {
                if canadian {
                    ports.resolve_canadian(code.as_deref(), role, &key).await
                } else {
                    ports.resolve(code.as_deref()).await
                }
            }
        };

        Ok(DocumentHeader {
            broker_reference: self.broker_reference.clone(),
            entry_number: self.entry_number.clone(),
            customer_number: self.customer_number.clone(),
            ship_mode: ship_mode(self.transport_mode_code.as_deref(), canadian),
            service_type: self.service_type.clone(),
            carrier_code: self.carrier_code.clone(),
            carrier_name: self.carrier_name.clone(),
            vessel: self.vessel.clone(),
            voyage: pad_voyage(self.voyage.as_deref()),
            port_of_entry: resolve(self.entry_port_code.clone(), PortRole::Entry).await?,
            port_of_lading: resolve(self.lading_port_code.clone(), PortRole::Lading).await?,
            port_of_unlading: resolve(self.unlading_port_code.clone(), PortRole::Unlading).await?,
        })
    }

    fn identifiers(&self) -> IdentifierSet {
        IdentifierSet {
            master_bills: split_lines(self.master_bills.as_deref()),
            house_bills: split_lines(self.house_bills.as_deref()),
            containers: split_lines(self.container_numbers.as_deref()),
            po_numbers: split_lines(self.po_numbers.as_deref()),
            cargo_control_numbers: split_lines(self.cargo_control_numbers.as_deref()),
        }
    }
}

#[async_trait]
impl ModuleStrategy for SecurityFilingRecord {
    async fn header(&self, ports: &PortLocationResolver) -> Result<DocumentHeader, MilestoneError> {
        Ok(DocumentHeader {
            broker_reference: self.host_system_file_number.clone(),
            entry_number: self.transaction_number.clone(),
            customer_number: self.importer_account_code.clone(),
            ship_mode: ship_mode(self.transport_mode_code.as_deref(), false),
            service_type: None,
            carrier_code: self.scac.clone(),
            carrier_name: self.carrier_name.clone(),
            vessel: self.vessel.clone(),
            voyage: pad_voyage(self.voyage.as_deref()),
            port_of_entry: ports.resolve(self.entry_port_code.as_deref()).await?,
            port_of_lading: ports.resolve(self.lading_port_code.as_deref()).await?,
            port_of_unlading: ports.resolve(self.unlading_port_code.as_deref()).await?,
        })
    }

    fn identifiers(&self) -> IdentifierSet {
        IdentifierSet {
            master_bills: split_lines(self.master_bills.as_deref()),
            house_bills: split_lines(self.house_bills.as_deref()),
            containers: split_lines(self.container_numbers.as_deref()),
            po_numbers: split_lines(self.po_numbers.as_deref()),
            cargo_control_numbers: Vec::new(),
        }
    }
}

/// Ship mode name for a customs transport mode code
///
/// Unknown codes are transmitted as they are.
pub fn ship_mode(transport_mode_code: Option<&str>, canadian: bool) -> Option<String> {
    let code = transport_mode_code.map(str::trim).filter(|c| !c.is_empty())?;
    let mode = match (canadian, code) {
        (false, "10" | "11") => "Ocean",
        (false, "20" | "21") => "Rail",
        (false, "30" | "31") => "Truck",
        (false, "40" | "41") => "Air",
        (true, "1") => "Air",
        (true, "2") => "Truck",
        (true, "6") => "Rail",
        (true, "9") => "Ocean",
        _ => code,
    };
    Some(mode.to_string())
}

/// Voyage numbers are zero padded to at least two characters
pub fn pad_voyage(voyage: Option<&str>) -> Option<String> {
    voyage
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("{:0>2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use domain_shipment::{MockPortDirectory, PortRecord};
    use crate::port_location::CodeType;

    async fn resolver(ports: Vec<PortRecord>) -> PortLocationResolver {
        PortLocationResolver::new(Arc::new(MockPortDirectory::with_ports(ports).await))
    }

    #[test]
    fn test_ship_mode_mapping() {
        assert_eq!(ship_mode(Some("11"), false).as_deref(), Some("Ocean"));
        assert_eq!(ship_mode(Some("40"), false).as_deref(), Some("Air"));
        assert_eq!(ship_mode(Some("9"), true).as_deref(), Some("Ocean"));
        assert_eq!(ship_mode(Some("2"), true).as_deref(), Some("Truck"));
        assert_eq!(ship_mode(Some("9"), false).as_deref(), Some("9"));
        assert_eq!(ship_mode(Some(" "), false), None);
    }

    #[test]
    fn test_pad_voyage() {
        assert_eq!(pad_voyage(Some("7")).as_deref(), Some("07"));
        assert_eq!(pad_voyage(Some("123E")).as_deref(), Some("123E"));
        assert_eq!(pad_voyage(None), None);
    }

    #[test]
    fn test_entry_identifiers() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        entry.master_bills = Some("A\nB\nA".to_string());
        entry.cargo_control_numbers = Some("CCN1\nCCN2".to_string());

        let ids = ModuleStrategy::identifiers(&entry);
        assert_eq!(ids.master_bills, vec!["A", "B"]);
        assert_eq!(ids.cargo_control_number().as_deref(), Some("CCN1 CCN2"));
    }

    #[tokio::test]
    async fn test_entry_header_resolves_ports() {
        let mut entry = EntryRecord::new("BR-1", "ACME");
        entry.entry_number = Some("31612345678".to_string());
        entry.transport_mode_code = Some("11".to_string());
        entry.voyage = Some("5".to_string());
        entry.lading_port_code = Some("57035".to_string());

        let resolver = resolver(vec![PortRecord {
            schedule_k_code: Some("57035".to_string()),
            name: Some("Shanghai".to_string()),
            ..Default::default()
        }])
        .await;
        let header = entry.header(&resolver).await.unwrap();

        assert_eq!(header.ship_mode.as_deref(), Some("Ocean"));
        assert_eq!(header.voyage.as_deref(), Some("05"));
        assert!(header.port_of_entry.is_none());
        let lading = header.port_of_lading.unwrap();
        assert_eq!(lading.code_type, Some(CodeType::ScheduleK));
    }

    #[tokio::test]
    async fn test_security_filing_header() {
        let mut filing = SecurityFilingRecord::new("ISF-1", "ACME");
        filing.transaction_number = Some("TX-9".to_string());
        filing.scac = Some("MAEU".to_string());

        let record = ShipmentRecord::from(filing);
        let header = strategy(&record).header(&resolver(vec![]).await).await.unwrap();

        assert_eq!(header.broker_reference, "ISF-1");
        assert_eq!(header.entry_number.as_deref(), Some("TX-9"));
        assert_eq!(header.carrier_code.as_deref(), Some("MAEU"));
        assert!(strategy(&record).identifiers().cargo_control_numbers.is_empty());
    }
}
