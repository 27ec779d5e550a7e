//! Replay bundles
//!
//! A bundle is a JSON document holding everything the pipeline reads from
//! outside stores, plus the records to replay:
//!
//! ```json
//! {
//!   "configs": [ ... ],
//!   "companies": [ ... ],
//!   "ports": [ ... ],
//!   "records": [ { "module": "entry", ... } ],
//!   "initiated_by": "replay"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use domain_milestone::NotificationConfig;
use domain_shipment::{Company, PortRecord, ShipmentRecord};

use crate::error::NotifierError;

fn default_user() -> String {
    "replay".to_string()
}

/// Configurations, reference data, and records for one replay run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayBundle {
    #[serde(default)]
    pub configs: Vec<NotificationConfig>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub ports: Vec<PortRecord>,
    #[serde(default)]
    pub records: Vec<ShipmentRecord>,
    /// User the replayed changes are attributed to
    #[serde(default = "default_user")]
    pub initiated_by: String,
}

impl Default for ReplayBundle {
    fn default() -> Self {
        Self {
            configs: Vec::new(),
            companies: Vec::new(),
            ports: Vec::new(),
            records: Vec::new(),
            initiated_by: default_user(),
        }
    }
}

impl ReplayBundle {
    /// Reads a bundle file
    pub async fn load(path: &Path) -> Result<Self, NotifierError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| NotifierError::BundleIo {
                path: path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn from_json(json: &str) -> Result<Self, NotifierError> {
        Ok(serde_json::from_str(json)?)
    }
}
