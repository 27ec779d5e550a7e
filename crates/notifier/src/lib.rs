//! Milestone Notifier
//!
//! Process-level concerns around the notification pipeline:
//!
//! - [`config`]: `NOTIFIER_*` environment configuration
//! - [`telemetry`]: tracing subscriber setup
//! - [`bundle`]: replay bundles of configurations and records
//! - [`wiring`]: assembling the pipeline's ports from configuration
//!
//! The `milestone-notifier` binary ties these together.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod bundle;
pub mod wiring;

pub use crate::config::{LogFormat, NotifierConfig};
pub use error::NotifierError;
pub use bundle::ReplayBundle;
pub use wiring::{build_dispatcher, build_ports};
