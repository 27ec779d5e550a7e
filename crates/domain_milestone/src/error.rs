//! Milestone notification errors

use thiserror::Error;

use core_kernel::{PortError, TemporalError};
use domain_shipment::ShipmentError;

/// Errors that can occur while turning a record change into documents
#[derive(Debug, Error)]
pub enum MilestoneError {
    /// A Canadian port of entry is CBSA coded and has no UN/LOCODE to send
    #[error("Port {port_code} on {record} has no UN/LOCODE")]
    MissingUnLocode { record: String, port_code: String },

    /// The notification configuration cannot be used
    #[error("Invalid notification configuration: {0}")]
    InvalidConfig(String),

    /// The XML document could not be written
    #[error("XML generation failed: {0}")]
    Xml(String),

    /// Writing the batch to the partner folder failed
    #[error("Delivery to {partner} failed: {source}")]
    Delivery {
        partner: String,
        #[source]
        source: PortError,
    },

    /// The batch was written but its channels could not be confirmed
    #[error("Delivered {documents} documents to {partner} but confirmation failed: {source}")]
    Unconfirmed {
        partner: String,
        documents: usize,
        #[source]
        source: PortError,
    },

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Shipment error: {0}")]
    Shipment(#[from] ShipmentError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),
}

impl MilestoneError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        MilestoneError::InvalidConfig(message.into())
    }

    pub(crate) fn xml(error: impl std::fmt::Display) -> Self {
        MilestoneError::Xml(error.to_string())
    }

    /// Returns true when the failure came from the outbound write
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, MilestoneError::Delivery { .. })
    }
}
