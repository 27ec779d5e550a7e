//! Shipment Records Domain
//!
//! This crate models the business records that milestone notifications are
//! raised for. The notification pipeline never owns these records; it only
//! reads them through the field extraction surface defined here.
//!
//! # Record Kinds
//!
//! - **Entry**: a customs entry, keyed by broker reference
//! - **Security Filing**: an importer security filing, keyed by host system
//!   file number
//!
//! Both kinds implement [`TrackedRecord`], which exposes event field values
//! (dates and timestamps), text values for filter criteria, and the account
//! keys used to match notification configurations.
//!
//! # Example
//!
//! ```rust
//! use domain_shipment::{EntryRecord, TrackedRecord, FieldValue};
//! use chrono::NaiveDate;
//!
//! let mut entry = EntryRecord::new("BR-1001", "ACME");
//! entry.available_date = NaiveDate::from_ymd_opt(2015, 12, 1);
//!
//! assert_eq!(entry.natural_key(), "BR-1001");
//! assert!(matches!(entry.date_value("available_date"), Some(FieldValue::Date(_))));
//! ```

pub mod record;
pub mod entry;
pub mod security_filing;
pub mod shipment;
pub mod port;
pub mod company;
pub mod error;
pub mod ports;

pub use record::{TrackedRecord, FieldValue, ModuleType, RecordRef, split_lines};
pub use entry::EntryRecord;
pub use security_filing::SecurityFilingRecord;
pub use shipment::ShipmentRecord;
pub use port::PortRecord;
pub use company::Company;
pub use error::ShipmentError;
pub use ports::{CompanyDirectory, PortDirectory};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockCompanyDirectory, MockPortDirectory};
