//! Repository implementations
//!
//! Repositories run SQL against the pool and return row types. They know
//! nothing about the domain; the adapters translate.

pub mod delivery;

pub use delivery::{DeliveryRecordRow, DeliveryStateRepository, SentValueRow};
