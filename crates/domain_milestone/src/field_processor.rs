//! Per-field milestone processing
//!
//! Turns one configured field of one record into a [`MilestoneUpdate`]:
//! the value is localized, checked against the channel's last confirmed
//! send, disambiguated when asked for, and fingerprinted.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use core_kernel::Timezone;
use domain_shipment::{FieldValue, ShipmentRecord, TrackedRecord};

use crate::config::{FieldSpec, NotificationConfig};
use crate::data::MilestoneUpdate;
use crate::delivery::{channel_name, ChannelKey, DeliveryRecord};
use crate::disambiguation::TimestampDisambiguator;
use crate::error::MilestoneError;
use crate::fingerprint::{FingerprintContext, Fingerprinter};
use crate::modules::strategy;
use crate::ports::DeliveryRecordRepository;

/// Result of processing one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// The event is to be sent
    Update(MilestoneUpdate),
    /// The record has no value for the field
    NoValue,
    /// The value was already sent and confirmed
    Unchanged,
}

/// Builds milestone updates for configured fields
#[derive(Clone)]
pub struct FieldProcessor {
    delivery_records: Arc<dyn DeliveryRecordRepository>,
    disambiguator: TimestampDisambiguator,
}

impl FieldProcessor {
    pub fn new(delivery_records: Arc<dyn DeliveryRecordRepository>) -> Self {
        Self {
            delivery_records,
            disambiguator: TimestampDisambiguator::new(),
        }
    }

    /// Processes one field of `config` for `record`
    ///
    /// Testing configurations start from a fresh channel every time and
    /// never skip; their state is never persisted.
    pub async fn process_field(
        &self,
        field: &FieldSpec,
        config: &NotificationConfig,
        record: &ShipmentRecord,
        module_timezone: Timezone,
    ) -> Result<FieldOutcome, MilestoneError> {
        let Some(value) = record.date_value(&field.field_id) else {
            return Ok(FieldOutcome::NoValue);
        };

        let timezone = field.timezone.unwrap_or(module_timezone);
        let base = localize(value, timezone, field.no_time)?;
        let date_only = value.is_date_only() || field.no_time;

        let channel = channel_name(record.module(), &field.field_id);
        let code = field.code();
        let key = ChannelKey::new(&config.partner_key, channel.as_str(), code);
        let record_ref = record.record_ref();
        let mut delivery = if config.testing {
            DeliveryRecord::new(record_ref, key)
        } else {
            self.delivery_records
                .find(&record_ref, &key)
                .await?
                .unwrap_or_else(|| DeliveryRecord::new(record_ref, key))
        };

        let identifiers = strategy(record).identifiers();
        let context = FingerprintContext {
            channel: &channel,
            record_key: record.natural_key(),
            master_bills: &identifiers.master_bills,
            containers: &identifiers.containers,
        };
        let fingerprinter = Fingerprinter::new(&config.fingerprint_inputs);

        if !config.testing {
            let last_offset = if config.disambiguate_timestamps {
                delivery.ledger.last_offset(base.date_naive()).unwrap_or(0)
            } else {
                0
            };
            let check_at = self.disambiguator.apply(&base, last_offset);
            if delivery.already_sent(&fingerprinter.fingerprint(code, &check_at, &context)) {
                debug!(channel = %delivery.channel, record = %record.natural_key(), "Value already sent");
                return Ok(FieldOutcome::Unchanged);
            }
        }

        let offset = if config.disambiguate_timestamps {
            self.disambiguator.allocate(&mut delivery.ledger, &base)
        } else {
            0
        };
        let date = self.disambiguator.apply(&base, offset);
        delivery.fingerprint = Some(fingerprinter.fingerprint(code, &date, &context));

        Ok(FieldOutcome::Update(MilestoneUpdate {
            code: code.to_string(),
            date,
            date_only,
            offset,
            delivery: Arc::new(delivery),
        }))
    }
}

impl std::fmt::Debug for FieldProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProcessor").finish_non_exhaustive()
    }
}

/// Converts a stored value to the reporting timezone
///
/// Date-only values become local midnight; `no_time` truncates instants to
/// local midnight.
fn localize(value: FieldValue, timezone: Timezone, no_time: bool) -> Result<DateTime<Tz>, MilestoneError> {
    let local = match value {
        FieldValue::Date(date) => timezone.start_of_day(date)?,
        FieldValue::DateTime(instant) => timezone.to_local(instant),
    };
    if no_time {
        Ok(timezone.truncate_to_day(&local)?)
    } else {
        Ok(local)
    }
}
