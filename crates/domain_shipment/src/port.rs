//! Port (geographic location) reference records

use serde::{Deserialize, Serialize};

/// A port reference record
///
/// One port can be known under several coding schemes at once. The
/// notification pipeline works out which scheme a record's port code
/// belongs to by comparing it against each code field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// US Customs Schedule K (foreign ports)
    pub schedule_k_code: Option<String>,
    /// US Customs Schedule D (domestic ports)
    pub schedule_d_code: Option<String>,
    /// UN/LOCODE
    pub un_locode: Option<String>,
    /// IATA airport code
    pub iata_code: Option<String>,
    /// Canada Border Services Agency office code
    pub cbsa_port: Option<String>,
    pub name: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub address_3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    /// ISO country code
    pub country: Option<String>,
}

impl PortRecord {
    /// Returns every non-blank code carried by this port
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        [
            &self.schedule_k_code,
            &self.schedule_d_code,
            &self.un_locode,
            &self.iata_code,
            &self.cbsa_port,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .filter(|c| !c.trim().is_empty())
    }

    /// Returns true if any of the port's codes equals `code`
    pub fn has_code(&self, code: &str) -> bool {
        let code = code.trim();
        self.codes().any(|c| c.trim().eq_ignore_ascii_case(code))
    }
}
