//! Test Utilities Crate
//!
//! Shared test infrastructure for the milestone notification workspace.
//!
//! # Modules
//!
//! - `fixtures`: fixed timestamps, ports and companies
//! - `builders`: record and configuration builders
//! - `harness`: a dispatcher wired to in-memory ports
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: report and XML assertions
//! - `generators`: property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
