//! Milestone Notification Domain
//!
//! This crate turns changes to tracked shipment records into 315 milestone
//! documents for trading partners.
//!
//! # Pipeline
//!
//! - **Acceptance**: the module must be switched on, the record must carry a
//!   customer number, and at least one enabled configuration must match it
//!   directly or through a parent account
//! - **Field processing**: each configured event field is localized,
//!   compared against the last confirmed send by fingerprint, and shifted by
//!   a unique per-day minute offset when the partner needs distinct times
//! - **Splitting**: identifiers are exploded into one tuple per document
//!   according to the configured output style
//! - **Assembly**: one XML batch per configuration is written to the
//!   partner folder; delivery state is persisted only after the write
//!
//! # Delivery State
//!
//! Each (record, event field) pair is a channel with its own
//! [`DeliveryRecord`]: the fingerprint of the last send, when it was sent and
//! confirmed, and the [`DisambiguationLedger`] of offsets issued per day.
//! Testing configurations send to `<partner>_test` and never read or write
//! this state.
//!
//! # Example
//!
//! ```rust,ignore
//! let dispatcher = LockingDispatcher::new(Dispatcher::new(ports, DispatcherSettings::default()));
//! let report = dispatcher.dispatch(&ChangeEvent::saved("jdoe"), &record).await?;
//! println!("{} documents sent", report.documents_sent());
//! ```

pub mod config;
pub mod delivery;
pub mod disambiguation;
pub mod fingerprint;
pub mod splitter;
pub mod port_location;
pub mod data;
pub mod modules;
pub mod xml;
pub mod ports;
pub mod assembler;
pub mod events;
pub mod acceptance;
pub mod field_processor;
pub mod dispatcher;
pub mod locking;
pub mod error;

pub use config::{
    AccountKeys, CriterionOperator, FieldCriterion, FieldSpec, FingerprintInput, MatchKey,
    NotificationConfig, OutputStyle,
};
pub use delivery::{channel_name, ChannelKey, DeliveryRecord, DisambiguationLedger, OutboundDocument, SentValue};
pub use disambiguation::TimestampDisambiguator;
pub use fingerprint::{FingerprintContext, Fingerprinter};
pub use splitter::{split, IdentifierSet};
pub use port_location::{resolve_code_type, CodeType, PortLocation, PortLocationResolver};
pub use data::{Data315, DocumentHeader, MilestoneUpdate};
pub use modules::{ship_mode, ModuleStrategy};
pub use xml::XmlGenerator;
pub use ports::{
    DeliveryRecordRepository, DocumentDelivery, FeatureFlags, NotificationConfigRepository,
    SentValueStore, StaticFeatureFlags,
};
pub use assembler::DocumentAssembler;
pub use events::{ChangeEvent, ChangeKind};
pub use acceptance::AcceptanceFilter;
pub use field_processor::{FieldOutcome, FieldProcessor};
pub use dispatcher::{ConfigOutcome, ConfigReport, DispatchReport, Dispatcher, DispatcherSettings, MilestonePorts};
pub use locking::{LockingDispatcher, RecordLocks};
pub use error::MilestoneError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{
    MockConfigRepository, MockDeliveryRecordRepository, MockDocumentDelivery, MockSentValueStore,
};
