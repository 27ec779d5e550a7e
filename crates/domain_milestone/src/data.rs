//! Per-document payloads

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::delivery::DeliveryRecord;
use crate::port_location::PortLocation;
use crate::splitter::IdentifierSet;

/// "This event happened, at this time" for one configured field
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneUpdate {
    pub code: String,
    /// Event time in the field's target timezone, offset applied
    pub date: DateTime<Tz>,
    /// The source value carried no time of day, or the field reports dates only
    pub date_only: bool,
    /// Disambiguation offset applied to `date`, in minutes
    pub offset: i32,
    /// Channel state as of this dispatch, ledger and fingerprint updated
    pub delivery: Arc<DeliveryRecord>,
}

impl MilestoneUpdate {
    /// `YYYYMMDD`
    pub fn event_date(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// `HHMM`; undisambiguated date-only values always report `0000`
    pub fn event_time(&self) -> String {
        if self.date_only && self.offset == 0 {
            "0000".to_string()
        } else {
            self.date.format("%H%M").to_string()
        }
    }
}

/// Record-level document content, extracted once per record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub broker_reference: String,
    /// Entry number, or the transaction number of a security filing
    pub entry_number: Option<String>,
    pub customer_number: Option<String>,
    pub ship_mode: Option<String>,
    pub service_type: Option<String>,
    pub carrier_code: Option<String>,
    pub carrier_name: Option<String>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub port_of_entry: Option<PortLocation>,
    pub port_of_lading: Option<PortLocation>,
    pub port_of_unlading: Option<PortLocation>,
}

/// One fully populated document
#[derive(Debug, Clone, PartialEq)]
pub struct Data315 {
    pub header: Arc<DocumentHeader>,
    pub identifiers: IdentifierSet,
    pub event: MilestoneUpdate,
}

impl Data315 {
    pub fn new(header: Arc<DocumentHeader>, identifiers: IdentifierSet, event: MilestoneUpdate) -> Self {
        Self {
            header,
            identifiers,
            event,
        }
    }

    /// Cargo control numbers, space separated
    pub fn cargo_control_number(&self) -> Option<String> {
        self.identifiers.cargo_control_number()
    }

    /// The channel this document was produced for
    pub fn delivery(&self) -> &Arc<DeliveryRecord> {
        &self.event.delivery
    }
}
