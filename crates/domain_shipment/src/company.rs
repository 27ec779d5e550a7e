//! Companies linked to business records

use serde::{Deserialize, Serialize};

use core_kernel::CompanyId;

/// A company known to the business record system
///
/// Importers can be grouped under parent accounts; notification
/// configurations may target a parent account's system code instead of a
/// single customer number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Internal system code, the key parent-account configurations match on
    pub system_code: Option<String>,
    pub name: String,
    /// Parent companies this company is linked under
    #[serde(default)]
    pub parent_ids: Vec<CompanyId>,
}

impl Company {
    pub fn new(name: impl Into<String>, system_code: Option<&str>) -> Self {
        Self {
            id: CompanyId::new_v7(),
            system_code: system_code.map(str::to_string),
            name: name.into(),
            parent_ids: Vec::new(),
        }
    }

    /// Links this company under a parent
    pub fn with_parent(mut self, parent: CompanyId) -> Self {
        if !self.parent_ids.contains(&parent) {
            self.parent_ids.push(parent);
        }
        self
    }
}
