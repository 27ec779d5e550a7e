//! Core Kernel - Foundational types for the milestone notification pipeline
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers
//! - Timezone handling for local calendar days
//! - Port infrastructure (errors, marker traits, health checks)

pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use temporal::{Timezone, TemporalError};
pub use identifiers::{
    RecordId, CompanyId, ConfigId, DeliveryRecordId, BatchId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
