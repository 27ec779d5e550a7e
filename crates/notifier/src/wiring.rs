//! Pipeline wiring
//!
//! Builds [`MilestonePorts`] from configuration and a replay bundle.
//! Reference data (configurations, companies, ports) always comes from the
//! bundle. Delivery state goes to PostgreSQL when a database URL is
//! configured and stays in memory otherwise.

use std::sync::Arc;

use tracing::info;

use domain_milestone::{
    DeliveryRecordRepository, Dispatcher, LockingDispatcher, MilestonePorts, MockConfigRepository,
    MockDeliveryRecordRepository, MockSentValueStore, SentValueStore,
};
use domain_shipment::{MockCompanyDirectory, MockPortDirectory};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresDeliveryRecordAdapter, PostgresSentValueAdapter,
};
use infra_delivery::FileDropDelivery;

use crate::bundle::ReplayBundle;
use crate::config::NotifierConfig;
use crate::error::NotifierError;

/// Assembles the ports for a run
pub async fn build_ports(config: &NotifierConfig, bundle: &ReplayBundle) -> Result<MilestonePorts, NotifierError> {
    let (delivery_records, sent_values) = delivery_state(config).await?;

    Ok(MilestonePorts {
        feature_flags: Arc::new(config.feature_flags()),
        configs: Arc::new(MockConfigRepository::with_configs(bundle.configs.clone()).await),
        companies: Arc::new(MockCompanyDirectory::with_companies(bundle.companies.clone()).await),
        port_directory: Arc::new(MockPortDirectory::with_ports(bundle.ports.clone()).await),
        delivery_records,
        document_delivery: Arc::new(FileDropDelivery::new(config.delivery_root.clone())),
        sent_values,
    })
}

/// Builds the locking dispatcher for a run
pub async fn build_dispatcher(
    config: &NotifierConfig,
    bundle: &ReplayBundle,
) -> Result<LockingDispatcher, NotifierError> {
    config.validate()?;
    let ports = build_ports(config, bundle).await?;
    let settings = config.dispatcher_settings()?;
    Ok(LockingDispatcher::new(Dispatcher::new(ports, settings)))
}

async fn delivery_state(
    config: &NotifierConfig,
) -> Result<(Arc<dyn DeliveryRecordRepository>, Arc<dyn SentValueStore>), NotifierError> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(DatabaseConfig::new(url.clone())).await?;
            run_migrations(&pool).await?;
            info!("Using PostgreSQL delivery state");
            Ok((
                Arc::new(PostgresDeliveryRecordAdapter::new(pool.clone())),
                Arc::new(PostgresSentValueAdapter::new(pool)),
            ))
        }
        None => {
            info!("Using in-memory delivery state");
            Ok((
                Arc::new(MockDeliveryRecordRepository::new()),
                Arc::new(MockSentValueStore::new()),
            ))
        }
    }
}
