//! Shipment Domain Ports
//!
//! Lookups the notification pipeline performs against the business record
//! system besides reading the record itself.
//!
//! - [`CompanyDirectory`]: resolves the parent accounts of an importer so
//!   parent-account notification configurations can match
//! - [`PortDirectory`]: finds port reference data by any of its codes
//!
//! ```rust,ignore
//! let codes = directory.parent_system_codes(importer_id).await?;
//! let port = ports.find_port("4601").await?;
//! ```

use async_trait::async_trait;

use core_kernel::{CompanyId, DomainPort, PortError};

use crate::port::PortRecord;

/// Company hierarchy lookups
#[async_trait]
pub trait CompanyDirectory: DomainPort {
    /// Returns the system codes of every parent company linked to `company`
    ///
    /// Parents without a system code are omitted.
    async fn parent_system_codes(&self, company: CompanyId) -> Result<Vec<String>, PortError>;
}

/// Port reference data lookups
#[async_trait]
pub trait PortDirectory: DomainPort {
    /// Finds the port carrying `code` under any coding scheme
    async fn find_port(&self, code: &str) -> Result<Option<PortRecord>, PortError>;
}

/// In-memory implementations for testing and replay runs
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::company::Company;

    /// In-memory company directory
    #[derive(Debug, Default, Clone)]
    pub struct MockCompanyDirectory {
        companies: Arc<RwLock<HashMap<CompanyId, Company>>>,
    }

    impl MockCompanyDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with companies
        pub async fn with_companies(companies: Vec<Company>) -> Self {
            let directory = Self::new();
            for company in companies {
                directory.insert(company).await;
            }
            directory
        }

        pub async fn insert(&self, company: Company) {
            self.companies.write().await.insert(company.id, company);
        }
    }

    impl DomainPort for MockCompanyDirectory {}

    #[async_trait]
    impl CompanyDirectory for MockCompanyDirectory {
        async fn parent_system_codes(&self, company: CompanyId) -> Result<Vec<String>, PortError> {
            let companies = self.companies.read().await;
            let child = companies
                .get(&company)
                .ok_or_else(|| PortError::not_found("Company", company))?;

            Ok(child
                .parent_ids
                .iter()
                .filter_map(|id| companies.get(id))
                .filter_map(|parent| parent.system_code.clone())
                .filter(|code| !code.trim().is_empty())
                .collect())
        }
    }

    /// In-memory port directory
    #[derive(Debug, Default, Clone)]
    pub struct MockPortDirectory {
        ports: Arc<RwLock<Vec<PortRecord>>>,
    }

    impl MockPortDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_ports(ports: Vec<PortRecord>) -> Self {
            let directory = Self::new();
            directory.ports.write().await.extend(ports);
            directory
        }
    }

    impl DomainPort for MockPortDirectory {}

    #[async_trait]
    impl PortDirectory for MockPortDirectory {
        async fn find_port(&self, code: &str) -> Result<Option<PortRecord>, PortError> {
            Ok(self
                .ports
                .read()
                .await
                .iter()
                .find(|p| p.has_code(code))
                .cloned())
        }
    }
}
