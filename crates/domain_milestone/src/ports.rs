//! Milestone Domain Ports
//!
//! Collaborators the notification pipeline depends on, each behind a trait
//! so storage and transport can be swapped:
//!
//! - [`NotificationConfigRepository`]: the configuration store (read only)
//! - [`DeliveryRecordRepository`]: per-channel delivery state
//! - [`DocumentDelivery`]: the partner-facing drop folder
//! - [`SentValueStore`]: last-sent cross references
//! - [`FeatureFlags`]: per-module on/off switches
//!
//! # Adapters
//!
//! - **PostgreSQL**: delivery state and sent values (`infra_db`)
//! - **File drop**: batch files under a root folder (`infra_delivery`)
//! - **Mock**: in-memory, for tests and replay runs
//!
//! ```rust,ignore
//! let assembler = DocumentAssembler::new(
//!     Arc::new(FileDropDelivery::new(root)),
//!     Arc::new(PostgresDeliveryRecordAdapter::new(pool)),
//!     ports,
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, OperationMetadata, PortError};
use domain_shipment::{ModuleType, RecordRef};

use crate::config::{AccountKeys, NotificationConfig};
use crate::delivery::{ChannelKey, DeliveryRecord, OutboundDocument, SentValue};

/// Read access to notification configurations
#[async_trait]
pub trait NotificationConfigRepository: DomainPort {
    /// Enabled configurations of `module` whose match key selects `keys`
    ///
    /// Testing configurations are included.
    async fn enabled_configs(
        &self,
        module: ModuleType,
        keys: &AccountKeys,
    ) -> Result<Vec<NotificationConfig>, PortError>;
}

/// Persistence of per-channel delivery state
#[async_trait]
pub trait DeliveryRecordRepository: DomainPort {
    /// Finds the delivery record of a record's channel
    async fn find(&self, record: &RecordRef, channel: &ChannelKey) -> Result<Option<DeliveryRecord>, PortError>;

    /// Inserts or replaces a delivery record
    ///
    /// # Arguments
    ///
    /// * `delivery` - The channel state after a confirmed send
    /// * `metadata` - Optional operation metadata for auditing
    async fn save(
        &self,
        delivery: &DeliveryRecord,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Inserts or replaces several delivery records atomically
    ///
    /// Either every record is stored or none is.
    async fn save_all(
        &self,
        deliveries: &[DeliveryRecord],
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Outbound transport to trading partners
#[async_trait]
pub trait DocumentDelivery: DomainPort {
    /// Writes one batch file into the partner folder
    async fn deliver(&self, document: &OutboundDocument) -> Result<(), PortError>;
}

/// Cross references of the values each event code was last sent with
#[async_trait]
pub trait SentValueStore: DomainPort {
    async fn record_sent(&self, value: &SentValue) -> Result<(), PortError>;

    async fn last_sent(&self, record: &RecordRef, event_code: &str) -> Result<Option<SentValue>, PortError>;
}

/// Per-module feature switches
pub trait FeatureFlags: Send + Sync {
    fn is_enabled(&self, module: ModuleType) -> bool;
}

/// Feature flags fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFeatureFlags {
    pub entry: bool,
    pub security_filing: bool,
}

impl StaticFeatureFlags {
    pub fn all_enabled() -> Self {
        Self {
            entry: true,
            security_filing: true,
        }
    }
}

impl Default for StaticFeatureFlags {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl FeatureFlags for StaticFeatureFlags {
    fn is_enabled(&self, module: ModuleType) -> bool {
        match module {
            ModuleType::Entry => self.entry,
            ModuleType::SecurityFiling => self.security_filing,
        }
    }
}

/// In-memory implementations for testing and replay runs
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::RecordId;

    /// In-memory configuration store
    #[derive(Debug, Default, Clone)]
    pub struct MockConfigRepository {
        configs: Arc<RwLock<Vec<NotificationConfig>>>,
    }

    impl MockConfigRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_configs(configs: Vec<NotificationConfig>) -> Self {
            let repository = Self::new();
            repository.configs.write().await.extend(configs);
            repository
        }

        /// Inserts a configuration, replacing one with the same id
        pub async fn insert(&self, config: NotificationConfig) {
            let mut configs = self.configs.write().await;
            match configs.iter_mut().find(|c| c.id == config.id) {
                Some(existing) => *existing = config,
                None => configs.push(config),
            }
        }
    }

    impl DomainPort for MockConfigRepository {}

    #[async_trait]
    impl NotificationConfigRepository for MockConfigRepository {
        async fn enabled_configs(
            &self,
            module: ModuleType,
            keys: &AccountKeys,
        ) -> Result<Vec<NotificationConfig>, PortError> {
            Ok(self
                .configs
                .read()
                .await
                .iter()
                .filter(|c| c.enabled && c.module == module && c.match_key.matches(keys))
                .cloned()
                .collect())
        }
    }

    /// In-memory delivery state keyed by record and channel
    ///
    /// Saves can be switched to fail.
    #[derive(Debug, Default, Clone)]
    pub struct MockDeliveryRecordRepository {
        records: Arc<RwLock<HashMap<(RecordId, ChannelKey), DeliveryRecord>>>,
        saves: Arc<RwLock<usize>>,
        failure: Arc<RwLock<Option<String>>>,
    }

    impl MockDeliveryRecordRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every stored record
        pub async fn all(&self) -> Vec<DeliveryRecord> {
            self.records.read().await.values().cloned().collect()
        }

        /// Number of records saved so far
        pub async fn save_count(&self) -> usize {
            *self.saves.read().await
        }

        pub async fn fail_with(&self, message: Option<String>) {
            *self.failure.write().await = message;
        }

        async fn check_failure(&self) -> Result<(), PortError> {
            match self.failure.read().await.clone() {
                Some(message) => Err(PortError::connection(message)),
                None => Ok(()),
            }
        }
    }

    impl DomainPort for MockDeliveryRecordRepository {}

    #[async_trait]
    impl DeliveryRecordRepository for MockDeliveryRecordRepository {
        async fn find(&self, record: &RecordRef, channel: &ChannelKey) -> Result<Option<DeliveryRecord>, PortError> {
            Ok(self
                .records
                .read()
                .await
                .get(&(record.record_id, channel.clone()))
                .cloned())
        }

        async fn save(
            &self,
            delivery: &DeliveryRecord,
            metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.save_all(std::slice::from_ref(delivery), metadata).await
        }

        async fn save_all(
            &self,
            deliveries: &[DeliveryRecord],
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_failure().await?;
            let mut records = self.records.write().await;
            for delivery in deliveries {
                records.insert(
                    (delivery.record.record_id, delivery.channel.clone()),
                    delivery.clone(),
                );
            }
            *self.saves.write().await += deliveries.len();
            Ok(())
        }
    }

    /// Captures delivered batches; can be switched to fail every write
    #[derive(Debug, Default, Clone)]
    pub struct MockDocumentDelivery {
        delivered: Arc<RwLock<Vec<OutboundDocument>>>,
        failure: Arc<RwLock<Option<String>>>,
    }

    impl MockDocumentDelivery {
        pub fn new() -> Self {
            Self::default()
        }

        /// A delivery whose writes fail with `message`
        pub async fn failing(message: impl Into<String>) -> Self {
            let delivery = Self::new();
            delivery.fail_with(Some(message.into())).await;
            delivery
        }

        pub async fn fail_with(&self, message: Option<String>) {
            *self.failure.write().await = message;
        }

        pub async fn delivered(&self) -> Vec<OutboundDocument> {
            self.delivered.read().await.clone()
        }
    }

    impl DomainPort for MockDocumentDelivery {}

    #[async_trait]
    impl DocumentDelivery for MockDocumentDelivery {
        async fn deliver(&self, document: &OutboundDocument) -> Result<(), PortError> {
            if let Some(message) = self.failure.read().await.clone() {
                return Err(PortError::write_failed(
                    format!("{}/{}", document.folder, document.file_name),
                    std::io::Error::other(message),
                ));
            }
            self.delivered.write().await.push(document.clone());
            Ok(())
        }
    }

    /// In-memory sent value cross references
    #[derive(Debug, Default, Clone)]
    pub struct MockSentValueStore {
        values: Arc<RwLock<HashMap<(RecordId, String), SentValue>>>,
    }

    impl MockSentValueStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn len(&self) -> usize {
            self.values.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.values.read().await.is_empty()
        }
    }

    impl DomainPort for MockSentValueStore {}

    #[async_trait]
    impl SentValueStore for MockSentValueStore {
        async fn record_sent(&self, value: &SentValue) -> Result<(), PortError> {
            self.values.write().await.insert(
                (value.record.record_id, value.event_code.clone()),
                value.clone(),
            );
            Ok(())
        }

        async fn last_sent(&self, record: &RecordRef, event_code: &str) -> Result<Option<SentValue>, PortError> {
            Ok(self
                .values
                .read()
                .await
                .get(&(record.record_id, event_code.to_string()))
                .cloned())
        }
    }
}
