//! Test Data Builders
//!
//! Builder patterns for records and notification configurations. Tests
//! specify only the fields they care about; everything else keeps the
//! fixture defaults.

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{CompanyId, Timezone};
use domain_milestone::{
    CriterionOperator, FieldCriterion, FieldSpec, FingerprintInput, MatchKey, NotificationConfig, OutputStyle,
};
use domain_shipment::{EntryRecord, ModuleType, SecurityFilingRecord, ShipmentRecord};

use crate::fixtures::StringFixtures;

fn lines(values: &[&str]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join("\n"))
    }
}

/// Builder for entry records
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: EntryRecord,
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryBuilder {
    /// A US entry for the fixture customer
    pub fn new() -> Self {
        Self {
            entry: EntryRecord::new(StringFixtures::broker_reference(), StringFixtures::customer_number()),
        }
    }

    pub fn broker_reference(mut self, reference: impl Into<String>) -> Self {
        self.entry.broker_reference = reference.into();
        self
    }

    pub fn customer(mut self, customer_number: impl Into<String>) -> Self {
        self.entry.customer_number = Some(customer_number.into());
        self
    }

    pub fn without_customer(mut self) -> Self {
        self.entry.customer_number = None;
        self
    }

    pub fn importer(mut self, importer: CompanyId) -> Self {
        self.entry.importer_id = Some(importer);
        self
    }

    /// Marks the entry as filed in Canada
    pub fn canadian(mut self) -> Self {
        self.entry.import_country = Some("CA".to_string());
        self
    }

    pub fn entry_number(mut self, number: impl Into<String>) -> Self {
        self.entry.entry_number = Some(number.into());
        self
    }

    pub fn transport_mode(mut self, code: impl Into<String>) -> Self {
        self.entry.transport_mode_code = Some(code.into());
        self
    }

    pub fn vessel(mut self, vessel: impl Into<String>, voyage: impl Into<String>) -> Self {
        self.entry.vessel = Some(vessel.into());
        self.entry.voyage = Some(voyage.into());
        self
    }

    pub fn ports(mut self, entry: Option<&str>, lading: Option<&str>, unlading: Option<&str>) -> Self {
        self.entry.entry_port_code = entry.map(str::to_string);
        self.entry.lading_port_code = lading.map(str::to_string);
        self.entry.unlading_port_code = unlading.map(str::to_string);
        self
    }

    pub fn master_bills(mut self, values: &[&str]) -> Self {
        self.entry.master_bills = lines(values);
        self
    }

    pub fn house_bills(mut self, values: &[&str]) -> Self {
        self.entry.house_bills = lines(values);
        self
    }

    pub fn containers(mut self, values: &[&str]) -> Self {
        self.entry.container_numbers = lines(values);
        self
    }

    pub fn po_numbers(mut self, values: &[&str]) -> Self {
        self.entry.po_numbers = lines(values);
        self
    }

    pub fn cargo_control_numbers(mut self, values: &[&str]) -> Self {
        self.entry.cargo_control_numbers = lines(values);
        self
    }

    pub fn released_at(mut self, at: DateTime<Utc>) -> Self {
        self.entry.release_date = Some(at);
        self
    }

    pub fn arrived_at(mut self, at: DateTime<Utc>) -> Self {
        self.entry.arrival_date = Some(at);
        self
    }

    pub fn available_on(mut self, day: NaiveDate) -> Self {
        self.entry.available_date = Some(day);
        self
    }

    pub fn build(self) -> EntryRecord {
        self.entry
    }

    pub fn record(self) -> ShipmentRecord {
        ShipmentRecord::Entry(self.entry)
    }
}

/// Builder for security filing records
#[derive(Debug, Clone)]
pub struct SecurityFilingBuilder {
    filing: SecurityFilingRecord,
}

impl Default for SecurityFilingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityFilingBuilder {
    pub fn new() -> Self {
        Self {
            filing: SecurityFilingRecord::new(StringFixtures::file_number(), StringFixtures::customer_number()),
        }
    }

    pub fn transaction_number(mut self, number: impl Into<String>) -> Self {
        self.filing.transaction_number = Some(number.into());
        self
    }

    pub fn scac(mut self, scac: impl Into<String>) -> Self {
        self.filing.scac = Some(scac.into());
        self
    }

    pub fn master_bills(mut self, values: &[&str]) -> Self {
        self.filing.master_bills = lines(values);
        self
    }

    pub fn containers(mut self, values: &[&str]) -> Self {
        self.filing.container_numbers = lines(values);
        self
    }

    pub fn first_sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.filing.first_sent_date = Some(at);
        self
    }

    pub fn first_accepted_at(mut self, at: DateTime<Utc>) -> Self {
        self.filing.first_accepted_date = Some(at);
        self
    }

    pub fn build(self) -> SecurityFilingRecord {
        self.filing
    }

    pub fn record(self) -> ShipmentRecord {
        ShipmentRecord::SecurityFiling(self.filing)
    }
}

/// Builder for notification configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: NotificationConfig,
}

impl ConfigBuilder {
    /// An entry configuration matching the fixture customer number
    pub fn entry(partner_key: impl Into<String>) -> Self {
        Self::for_module(ModuleType::Entry, partner_key)
    }

    /// A security filing configuration matching the fixture customer number
    pub fn security_filing(partner_key: impl Into<String>) -> Self {
        Self::for_module(ModuleType::SecurityFiling, partner_key)
    }

    fn for_module(module: ModuleType, partner_key: impl Into<String>) -> Self {
        Self {
            config: NotificationConfig::new(
                module,
                MatchKey::CustomerNumber(StringFixtures::customer_number().to_string()),
                partner_key,
            ),
        }
    }

    pub fn match_customer(mut self, customer_number: impl Into<String>) -> Self {
        self.config.match_key = MatchKey::CustomerNumber(customer_number.into());
        self
    }

    pub fn match_parent(mut self, system_code: impl Into<String>) -> Self {
        self.config.match_key = MatchKey::ParentSystemCode(system_code.into());
        self
    }

    /// Reports `field_id` under `event_code`
    pub fn event(mut self, field_id: &str, event_code: &str) -> Self {
        self.config.fields.push(FieldSpec::new(field_id).with_event_code(event_code));
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.config.fields.push(field);
        self
    }

    /// Reports `field_id` as a date at local midnight
    pub fn date_event(mut self, field_id: &str, event_code: &str) -> Self {
        self.config
            .fields
            .push(FieldSpec::new(field_id).with_event_code(event_code).date_only());
        self
    }

    pub fn event_in(mut self, field_id: &str, event_code: &str, timezone: Timezone) -> Self {
        self.config.fields.push(
            FieldSpec::new(field_id)
                .with_event_code(event_code)
                .with_timezone(timezone),
        );
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.config.output_style = style;
        self
    }

    pub fn criterion(mut self, field_id: &str, operator: CriterionOperator, value: &str) -> Self {
        self.config.criteria.push(FieldCriterion::new(field_id, operator, value));
        self
    }

    pub fn disambiguate(mut self) -> Self {
        self.config.disambiguate_timestamps = true;
        self
    }

    pub fn fingerprint(mut self, input: FingerprintInput) -> Self {
        self.config.fingerprint_inputs.push(input);
        self
    }

    pub fn testing(mut self) -> Self {
        self.config.testing = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.config.enabled = false;
        self
    }

    pub fn build(self) -> NotificationConfig {
        self.config
    }
}
