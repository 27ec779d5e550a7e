//! Infrastructure Database Layer
//!
//! PostgreSQL storage for milestone delivery state, using SQLx.
//!
//! # Tables
//!
//! - `delivery_records`: one row per (module, record, channel) with the
//!   fingerprint of the last send, its sent and confirmed times, and the
//!   disambiguation ledger as JSONB
//! - `sent_values`: the event time each event code was last transmitted
//!   with
//!
//! The schema lives in the workspace `migrations/` directory and is embedded
//! with [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresDeliveryRecordAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/milestones")).await?;
//! run_migrations(&pool).await?;
//! let delivery_records = PostgresDeliveryRecordAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::{DeliveryRecordRow, DeliveryStateRepository, SentValueRow};
pub use adapters::{PostgresDeliveryRecordAdapter, PostgresSentValueAdapter};
