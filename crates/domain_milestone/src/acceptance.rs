//! Change acceptance
//!
//! Decides whether a record change is worth processing at all, before any
//! field is read. The check is cheap and has no side effects.

use std::sync::Arc;

use tracing::{debug, instrument};

use core_kernel::PortError;
use domain_shipment::{CompanyDirectory, ShipmentRecord, TrackedRecord};

use crate::config::{AccountKeys, NotificationConfig};
use crate::error::MilestoneError;
use crate::events::{ChangeEvent, ChangeKind};
use crate::ports::{FeatureFlags, NotificationConfigRepository};

/// Per-module gate in front of the dispatcher
#[derive(Clone)]
pub struct AcceptanceFilter {
    flags: Arc<dyn FeatureFlags>,
    configs: Arc<dyn NotificationConfigRepository>,
    companies: Arc<dyn CompanyDirectory>,
}

impl AcceptanceFilter {
    pub fn new(
        flags: Arc<dyn FeatureFlags>,
        configs: Arc<dyn NotificationConfigRepository>,
        companies: Arc<dyn CompanyDirectory>,
    ) -> Self {
        Self {
            flags,
            configs,
            companies,
        }
    }

    /// Keys configurations can match the record on
    ///
    /// `None` when the record has no customer number. An importer unknown to
    /// the company directory has no parent codes.
    pub async fn account_keys(&self, record: &ShipmentRecord) -> Result<Option<AccountKeys>, PortError> {
        let Some(customer_number) = record
            .customer_number()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            return Ok(None);
        };

        let parent_system_codes = match record.importer_id() {
            Some(importer) => match self.companies.parent_system_codes(importer).await {
                Ok(codes) => codes,
                Err(e) if e.is_not_found() => Vec::new(),
                Err(e) => return Err(e),
            },
            None => Vec::new(),
        };

        Ok(Some(AccountKeys {
            customer_number: Some(customer_number.to_string()),
            parent_system_codes,
        }))
    }

    /// Enabled configurations that apply to the change, testing ones included
    ///
    /// Empty when the module is switched off, the change is not a save, or
    /// the record has no customer number.
    #[instrument(skip(self, event, record), fields(record = %record.natural_key()))]
    pub async fn matching_configs(
        &self,
        event: &ChangeEvent,
        record: &ShipmentRecord,
    ) -> Result<Vec<NotificationConfig>, MilestoneError> {
        let module = record.module();
        if !self.flags.is_enabled(module) {
            debug!(%module, "Module disabled");
            return Ok(Vec::new());
        }
        if event.kind != ChangeKind::Saved {
            return Ok(Vec::new());
        }
        let Some(keys) = self.account_keys(record).await? else {
            debug!("No customer number");
            return Ok(Vec::new());
        };

        Ok(self.configs.enabled_configs(module, &keys).await?)
    }

    /// Returns true when at least one configuration applies
    pub async fn accepts(&self, event: &ChangeEvent, record: &ShipmentRecord) -> Result<bool, MilestoneError> {
        Ok(!self.matching_configs(event, record).await?.is_empty())
    }
}

impl std::fmt::Debug for AcceptanceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptanceFilter").finish_non_exhaustive()
    }
}
