//! Notifier error types

use thiserror::Error;

use core_kernel::CoreError;
use infra_db::DatabaseError;

/// Errors raised while configuring or wiring the notifier
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Cannot read bundle {path}: {source}")]
    BundleIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bundle: {0}")]
    BundleFormat(#[from] serde_json::Error),
}
