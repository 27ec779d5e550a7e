//! Shipment domain errors

use thiserror::Error;

use crate::record::ModuleType;

/// Errors that can occur in the shipment domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShipmentError {
    /// The field identifier is not an event field of the module
    #[error("Unknown {module} event field: {field}")]
    UnknownField { module: ModuleType, field: String },
}

impl ShipmentError {
    pub fn unknown_field(module: ModuleType, field: impl Into<String>) -> Self {
        ShipmentError::UnknownField {
            module,
            field: field.into(),
        }
    }
}
