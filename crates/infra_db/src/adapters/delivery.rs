//! PostgreSQL Delivery State Adapters
//!
//! Internal (database) adapters for the milestone delivery ports:
//!
//! - [`PostgresDeliveryRecordAdapter`] implements `DeliveryRecordRepository`
//! - [`PostgresSentValueAdapter`] implements `SentValueStore`
//!
//! Both go through [`DeliveryStateRepository`] and translate rows to domain
//! types here. The disambiguation ledger is stored as JSONB in the
//! `context` column.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresDeliveryRecordAdapter;
//! use domain_milestone::DeliveryRecordRepository;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn DeliveryRecordRepository> = Arc::new(PostgresDeliveryRecordAdapter::new(pool));
//! let key = ChannelKey::new("ACME", "315_release_date", "VR");
//! let channel = port.find(&record, &key).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DeliveryRecordId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, RecordId,
};
use domain_milestone::{
    ChannelKey, DeliveryRecord, DeliveryRecordRepository, DisambiguationLedger, SentValue, SentValueStore,
};
use domain_shipment::{ModuleType, RecordRef};

use crate::error::DatabaseError;
use crate::repositories::delivery::{DeliveryRecordRow, DeliveryStateRepository, SentValueRow};

/// PostgreSQL-backed delivery record store
#[derive(Debug, Clone)]
pub struct PostgresDeliveryRecordAdapter {
    repository: DeliveryStateRepository,
    pool: PgPool,
}

impl PostgresDeliveryRecordAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DeliveryStateRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &DeliveryStateRepository {
        &self.repository
    }

    /// Every channel stored for a record, ordered by channel name
    pub async fn channels(&self, record: &RecordRef) -> Result<Vec<DeliveryRecord>, PortError> {
        let rows = self
            .repository
            .list_for_record(record.module.as_str(), *record.record_id.as_uuid())
            .await?;
        rows.into_iter()
            .map(|row| row_to_delivery(row).map_err(PortError::from))
            .collect()
    }
}

impl DomainPort for PostgresDeliveryRecordAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDeliveryRecordAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-delivery-record-adapter").await
    }
}

#[async_trait]
impl DeliveryRecordRepository for PostgresDeliveryRecordAdapter {
    #[instrument(skip(self), fields(record = %record, channel = %channel))]
    async fn find(&self, record: &RecordRef, channel: &ChannelKey) -> Result<Option<DeliveryRecord>, PortError> {
        debug!("Loading delivery record");

        let row = self
            .repository
            .find_channel(
                record.module.as_str(),
                *record.record_id.as_uuid(),
                &channel.partner_key,
                &channel.trading_partner,
                &channel.event_code,
            )
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_delivery(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, delivery, metadata), fields(record = %delivery.record, channel = %delivery.channel))]
    async fn save(
        &self,
        delivery: &DeliveryRecord,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!(
            initiated_by = metadata.as_ref().and_then(|m| m.initiated_by.as_deref()),
            "Saving delivery record"
        );

        let row = delivery_to_row(delivery)?;
        self.repository.upsert(&row).await?;
        Ok(())
    }

    #[instrument(skip(self, deliveries, metadata), fields(channels = deliveries.len()))]
    async fn save_all(
        &self,
        deliveries: &[DeliveryRecord],
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!(
            initiated_by = metadata.as_ref().and_then(|m| m.initiated_by.as_deref()),
            "Saving delivery records"
        );

        let rows = deliveries
            .iter()
            .map(delivery_to_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.repository.upsert_all(&rows).await?;
        Ok(())
    }
}

/// PostgreSQL-backed sent value cross references
#[derive(Debug, Clone)]
pub struct PostgresSentValueAdapter {
    repository: DeliveryStateRepository,
    pool: PgPool,
}

impl PostgresSentValueAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DeliveryStateRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresSentValueAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSentValueAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-sent-value-adapter").await
    }
}

#[async_trait]
impl SentValueStore for PostgresSentValueAdapter {
    #[instrument(skip(self, value), fields(record = %value.record, event_code = %value.event_code))]
    async fn record_sent(&self, value: &SentValue) -> Result<(), PortError> {
        self.repository
            .upsert_sent_value(&sent_value_to_row(value))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(record = %record))]
    async fn last_sent(&self, record: &RecordRef, event_code: &str) -> Result<Option<SentValue>, PortError> {
        let row = self
            .repository
            .find_sent_value(record.module.as_str(), *record.record_id.as_uuid(), event_code)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_sent_value(row)?)),
            None => Ok(None),
        }
    }
}

async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn parse_module(name: &str) -> Result<ModuleType, DatabaseError> {
    ModuleType::from_name(name)
        .ok_or_else(|| DatabaseError::serialization("module", format!("unknown module '{}'", name)))
}

fn row_to_delivery(row: DeliveryRecordRow) -> Result<DeliveryRecord, DatabaseError> {
    let ledger: DisambiguationLedger = if row.context.is_null() {
        DisambiguationLedger::new()
    } else {
        serde_json::from_value(row.context).map_err(|e| DatabaseError::serialization("context", e))?
    };

    Ok(DeliveryRecord {
        id: DeliveryRecordId::from_uuid(row.delivery_record_id),
        record: RecordRef {
            module: parse_module(&row.module)?,
            record_id: RecordId::from_uuid(row.record_id),
            natural_key: row.natural_key,
        },
        channel: ChannelKey {
            partner_key: row.partner_key,
            trading_partner: row.trading_partner,
            event_code: row.event_code,
        },
        fingerprint: row.fingerprint,
        sent_at: row.sent_at,
        confirmed_at: row.confirmed_at,
        failure_message: row.failure_message,
        ledger,
    })
}

fn delivery_to_row(delivery: &DeliveryRecord) -> Result<DeliveryRecordRow, DatabaseError> {
    let context =
        serde_json::to_value(&delivery.ledger).map_err(|e| DatabaseError::serialization("context", e))?;

    Ok(DeliveryRecordRow {
        delivery_record_id: *delivery.id.as_uuid(),
        module: delivery.record.module.as_str().to_string(),
        record_id: *delivery.record.record_id.as_uuid(),
        natural_key: delivery.record.natural_key.clone(),
        partner_key: delivery.channel.partner_key.clone(),
        trading_partner: delivery.channel.trading_partner.clone(),
        event_code: delivery.channel.event_code.clone(),
        fingerprint: delivery.fingerprint.clone(),
        sent_at: delivery.sent_at,
        confirmed_at: delivery.confirmed_at,
        failure_message: delivery.failure_message.clone(),
        context,
        updated_at: Utc::now(),
    })
}

fn sent_value_to_row(value: &SentValue) -> SentValueRow {
    SentValueRow {
        module: value.record.module.as_str().to_string(),
        record_id: *value.record.record_id.as_uuid(),
        natural_key: value.record.natural_key.clone(),
        event_code: value.event_code.clone(),
        event_at: value.event_at,
        sent_at: value.sent_at,
    }
}

fn row_to_sent_value(row: SentValueRow) -> Result<SentValue, DatabaseError> {
    Ok(SentValue {
        record: RecordRef {
            module: parse_module(&row.module)?,
            record_id: RecordId::from_uuid(row.record_id),
            natural_key: row.natural_key,
        },
        event_code: row.event_code,
        event_at: row.event_at,
        sent_at: row.sent_at,
    })
}
