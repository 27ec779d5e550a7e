//! In-memory pipeline harness
//!
//! Wires every port to its in-memory implementation and exposes them, so
//! tests can dispatch changes and then inspect delivered files and stored
//! delivery state.

use std::sync::Arc;

use domain_milestone::{
    ChangeEvent, DispatchReport, Dispatcher, DispatcherSettings, LockingDispatcher, MilestoneError, MilestonePorts,
    MockConfigRepository, MockDeliveryRecordRepository, MockDocumentDelivery, MockSentValueStore,
    NotificationConfig, OutboundDocument, StaticFeatureFlags,
};
use domain_shipment::{Company, MockCompanyDirectory, MockPortDirectory, ShipmentRecord};

use crate::fixtures::PortFixtures;

/// A dispatcher over in-memory ports
#[derive(Clone)]
pub struct PipelineHarness {
    pub configs: MockConfigRepository,
    pub companies: MockCompanyDirectory,
    pub delivery_records: MockDeliveryRecordRepository,
    pub delivery: MockDocumentDelivery,
    pub sent_values: MockSentValueStore,
    pub dispatcher: LockingDispatcher,
}

impl PipelineHarness {
    /// Harness with `configs`, both modules enabled and the fixture ports
    pub async fn new(configs: Vec<NotificationConfig>) -> Self {
        Self::with(configs, Vec::new(), StaticFeatureFlags::all_enabled()).await
    }

    /// Harness with explicit companies and feature flags
    pub async fn with(
        configs: Vec<NotificationConfig>,
        companies: Vec<Company>,
        flags: StaticFeatureFlags,
    ) -> Self {
        let configs = MockConfigRepository::with_configs(configs).await;
        let companies = MockCompanyDirectory::with_companies(companies).await;
        let ports = MockPortDirectory::with_ports(PortFixtures::all()).await;
        let delivery_records = MockDeliveryRecordRepository::new();
        let delivery = MockDocumentDelivery::new();
        let sent_values = MockSentValueStore::new();

        let milestone_ports = MilestonePorts {
            feature_flags: Arc::new(flags),
            configs: Arc::new(configs.clone()),
            companies: Arc::new(companies.clone()),
            port_directory: Arc::new(ports),
            delivery_records: Arc::new(delivery_records.clone()),
            document_delivery: Arc::new(delivery.clone()),
            sent_values: Arc::new(sent_values.clone()),
        };
        let dispatcher = LockingDispatcher::new(Dispatcher::new(milestone_ports, DispatcherSettings::default()));

        Self {
            configs,
            companies,
            delivery_records,
            delivery,
            sent_values,
            dispatcher,
        }
    }

    /// Dispatches a save of `record` by `test-user`
    pub async fn save(&self, record: &ShipmentRecord) -> Result<DispatchReport, MilestoneError> {
        self.dispatcher.dispatch(&ChangeEvent::saved("test-user"), record).await
    }

    /// Delivered batches, oldest first
    pub async fn delivered(&self) -> Vec<OutboundDocument> {
        self.delivery.delivered().await
    }

    /// Content of the most recently delivered batch
    pub async fn last_xml(&self) -> Option<String> {
        self.delivered()
            .await
            .last()
            .map(|doc| String::from_utf8_lossy(&doc.content).into_owned())
    }
}
