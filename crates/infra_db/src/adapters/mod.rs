//! Domain Adapters
//!
//! Implementations of the milestone ports on top of the repository layer.
//! Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Reports database reachability through `HealthCheckable`
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresDeliveryRecordAdapter, PostgresSentValueAdapter};
//!
//! let delivery_records = Arc::new(PostgresDeliveryRecordAdapter::new(pool.clone()));
//! let sent_values = Arc::new(PostgresSentValueAdapter::new(pool));
//! ```

pub mod delivery;

pub use delivery::{PostgresDeliveryRecordAdapter, PostgresSentValueAdapter};
