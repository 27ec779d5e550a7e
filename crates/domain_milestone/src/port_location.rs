//! Port code resolution
//!
//! Records carry bare port codes. Documents report each port with the
//! coding scheme it belongs to and, when the port is known, its name and
//! address.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use domain_shipment::{PortDirectory, PortRecord};

use crate::error::MilestoneError;

/// Coding scheme of a port code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeType {
    ScheduleK,
    ScheduleD,
    UnLocode,
    Iata,
    Cbsa,
}

impl CodeType {
    /// Value of the `type` attribute on the document's `Location` element
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::ScheduleK => "ScheduleK",
            CodeType::ScheduleD => "ScheduleD",
            CodeType::UnLocode => "UNLocode",
            CodeType::Iata => "IATA",
            CodeType::Cbsa => "CBSA",
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Works out which scheme `code` belongs to on `port`
///
/// Schemes are checked in order Schedule K, Schedule D, UN/LOCODE, IATA,
/// CBSA; the first match wins.
pub fn resolve_code_type(code: &str, port: &PortRecord) -> Option<CodeType> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    [
        (CodeType::ScheduleK, &port.schedule_k_code),
        (CodeType::ScheduleD, &port.schedule_d_code),
        (CodeType::UnLocode, &port.un_locode),
        (CodeType::Iata, &port.iata_code),
        (CodeType::Cbsa, &port.cbsa_port),
    ]
    .into_iter()
    .find(|(_, candidate)| {
        candidate
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(code))
    })
    .map(|(code_type, _)| code_type)
}

/// A port as reported in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLocation {
    /// Code as transmitted
    pub code: String,
    pub code_type: Option<CodeType>,
    /// Reference data, when the code is known
    pub location: Option<PortRecord>,
}

impl PortLocation {
    /// A code with no matching reference data
    pub fn unresolved(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            code_type: None,
            location: None,
        }
    }

    /// Returns true when the port is known under its CBSA code
    pub fn is_cbsa(&self) -> bool {
        self.code_type == Some(CodeType::Cbsa)
    }
}

/// Which port of a record is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Entry,
    Lading,
    Unlading,
}

/// Resolves record port codes against port reference data
#[derive(Clone)]
pub struct PortLocationResolver {
    ports: Arc<dyn PortDirectory>,
}

impl PortLocationResolver {
    pub fn new(ports: Arc<dyn PortDirectory>) -> Self {
        Self { ports }
    }

    /// Resolves a port code; blank codes resolve to `None`
    pub async fn resolve(&self, code: Option<&str>) -> Result<Option<PortLocation>, MilestoneError> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let Some(port) = self.ports.find_port(code).await? else {
            debug!(port_code = %code, "No port reference data");
            return Ok(Some(PortLocation::unresolved(code)));
        };

        Ok(Some(PortLocation {
            code: code.to_string(),
            code_type: resolve_code_type(code, &port),
            location: Some(port),
        }))
    }

    /// Resolves a port of a Canadian entry
    ///
    /// CBSA codes are replaced by the port's UN/LOCODE. A CBSA-coded port of
    /// entry without one cannot be transmitted; other ports keep their CBSA
    /// code.
    pub async fn resolve_canadian(
        &self,
        code: Option<&str>,
        role: PortRole,
        record_key: &str,
    ) -> Result<Option<PortLocation>, MilestoneError> {
        let Some(mut location) = self.resolve(code).await? else {
            return Ok(None);
        };
        if !location.is_cbsa() {
            return Ok(Some(location));
        }

        let un_locode = location
            .location
            .as_ref()
            .and_then(|p| p.un_locode.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        match un_locode {
            Some(un_locode) => {
                location.code = un_locode;
                location.code_type = Some(CodeType::UnLocode);
            }
            None if role == PortRole::Entry => {
                return Err(MilestoneError::MissingUnLocode {
                    record: record_key.to_string(),
                    port_code: location.code,
                });
            }
            None => {}
        }
        Ok(Some(location))
    }
}

impl fmt::Debug for PortLocationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortLocationResolver").finish_non_exhaustive()
    }
}
