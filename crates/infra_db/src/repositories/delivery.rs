//! Delivery state repository
//!
//! Stores per-channel delivery records and sent-value cross references.
//! Rows are plain column mirrors; conversion to domain types happens in the
//! adapters.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for milestone delivery state
#[derive(Debug, Clone)]
pub struct DeliveryStateRepository {
    pool: PgPool,
}

impl DeliveryStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the delivery record of one channel
    ///
    /// # Arguments
    ///
    /// * `module` - Module name (`entry`, `security_filing`)
    /// * `record_id` - Surrogate record identifier
    /// * `partner_key` - Partner the channel delivers to
    /// * `trading_partner` - Channel name, e.g. `315_release_date`
    /// * `event_code` - Event code reported on the channel
    pub async fn find_channel(
        &self,
        module: &str,
        record_id: Uuid,
        partner_key: &str,
        trading_partner: &str,
        event_code: &str,
    ) -> Result<Option<DeliveryRecordRow>, DatabaseError> {
        sqlx::query_as::<_, DeliveryRecordRow>(
            r#"
            SELECT
                delivery_record_id,
                module,
                record_id,
                natural_key,
                partner_key,
                trading_partner,
                event_code,
                fingerprint,
                sent_at,
                confirmed_at,
                failure_message,
                context,
                updated_at
            FROM delivery_records
            WHERE module = $1
              AND record_id = $2
              AND partner_key = $3
              AND trading_partner = $4
              AND event_code = $5
            "#,
        )
        .bind(module)
        .bind(record_id)
        .bind(partner_key)
        .bind(trading_partner)
        .bind(event_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))
    }

    /// Lists every channel of a record
    pub async fn list_for_record(
        &self,
        module: &str,
        record_id: Uuid,
    ) -> Result<Vec<DeliveryRecordRow>, DatabaseError> {
        sqlx::query_as::<_, DeliveryRecordRow>(
            r#"
            SELECT
                delivery_record_id,
                module,
                record_id,
                natural_key,
                partner_key,
                trading_partner,
                event_code,
                fingerprint,
                sent_at,
                confirmed_at,
                failure_message,
                context,
                updated_at
            FROM delivery_records
            WHERE module = $1 AND record_id = $2
            ORDER BY partner_key, trading_partner, event_code
            "#,
        )
        .bind(module)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))
    }

    /// Inserts a channel or replaces its state
    pub async fn upsert(&self, row: &DeliveryRecordRow) -> Result<(), DatabaseError> {
        upsert_row(&self.pool, row).await
    }

    /// Inserts or replaces several channels in one transaction
    pub async fn upsert_all(&self, rows: &[DeliveryRecordRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(|e| DatabaseError::from(&e))?;
        for row in rows {
            upsert_row(&mut *tx, row).await?;
        }
        tx.commit().await.map_err(|e| DatabaseError::from(&e))?;
        Ok(())
    }

    /// Records the value an event code was last sent with
    pub async fn upsert_sent_value(&self, row: &SentValueRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO sent_values (module, record_id, natural_key, event_code, event_at, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (module, record_id, event_code) DO UPDATE SET
                natural_key = EXCLUDED.natural_key,
                event_at = EXCLUDED.event_at,
                sent_at = EXCLUDED.sent_at
            "#,
        )
        .bind(&row.module)
        .bind(row.record_id)
        .bind(&row.natural_key)
        .bind(&row.event_code)
        .bind(row.event_at)
        .bind(row.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(())
    }

    /// Finds the last sent value of an event code
    pub async fn find_sent_value(
        &self,
        module: &str,
        record_id: Uuid,
        event_code: &str,
    ) -> Result<Option<SentValueRow>, DatabaseError> {
        sqlx::query_as::<_, SentValueRow>(
            r#"
            SELECT module, record_id, natural_key, event_code, event_at, sent_at
            FROM sent_values
            WHERE module = $1 AND record_id = $2 AND event_code = $3
            "#,
        )
        .bind(module)
        .bind(record_id)
        .bind(event_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))
    }
}

/// Upserts one channel row
///
/// The channel key (module, record, partner, trading partner, event code)
/// is the conflict target; the row identifier of an existing channel is
/// kept.
async fn upsert_row<'e, E>(executor: E, row: &DeliveryRecordRow) -> Result<(), DatabaseError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO delivery_records (
            delivery_record_id, module, record_id, natural_key, partner_key, trading_partner,
            event_code, fingerprint, sent_at, confirmed_at, failure_message, context, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
        ON CONFLICT (module, record_id, partner_key, trading_partner, event_code) DO UPDATE SET
            natural_key = EXCLUDED.natural_key,
            fingerprint = EXCLUDED.fingerprint,
            sent_at = EXCLUDED.sent_at,
            confirmed_at = EXCLUDED.confirmed_at,
            failure_message = EXCLUDED.failure_message,
            context = EXCLUDED.context,
            updated_at = now()
        "#,
    )
    .bind(row.delivery_record_id)
    .bind(&row.module)
    .bind(row.record_id)
    .bind(&row.natural_key)
    .bind(&row.partner_key)
    .bind(&row.trading_partner)
    .bind(&row.event_code)
    .bind(&row.fingerprint)
    .bind(row.sent_at)
    .bind(row.confirmed_at)
    .bind(&row.failure_message)
    .bind(&row.context)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::from(&e))?;
    Ok(())
}

/// A `delivery_records` row
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DeliveryRecordRow {
    pub delivery_record_id: Uuid,
    pub module: String,
    pub record_id: Uuid,
    pub natural_key: String,
    pub partner_key: String,
    pub trading_partner: String,
    pub event_code: String,
    pub fingerprint: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub failure_message: Option<String>,
    /// Disambiguation ledger, `{"YYYY-MM-DD": [offsets...]}`
    pub context: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// A `sent_values` row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SentValueRow {
    pub module: String,
    pub record_id: Uuid,
    pub natural_key: String,
    pub event_code: String,
    pub event_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
}
