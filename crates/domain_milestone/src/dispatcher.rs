//! Milestone dispatch
//!
//! The dispatcher drives one record change through the whole pipeline:
//!
//! ```text
//! ChangeEvent ─► AcceptanceFilter ─► per config:
//!                  criteria ─► FieldProcessor (dedup, disambiguation)
//!                           ─► DocumentAssembler (split, XML, delivery)
//!                           ─► sent value bookkeeping
//! ```
//!
//! Configurations are processed independently: a failure in one is logged
//! and reported and does not stop the others.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use core_kernel::{ConfigId, Timezone};
use domain_shipment::{CompanyDirectory, ModuleType, PortDirectory, RecordRef, ShipmentRecord, TrackedRecord};

use crate::acceptance::AcceptanceFilter;
use crate::assembler::{default_confirmation_grace, DocumentAssembler};
use crate::config::NotificationConfig;
use crate::data::{Data315, MilestoneUpdate};
use crate::delivery::SentValue;
use crate::error::MilestoneError;
use crate::events::ChangeEvent;
use crate::field_processor::{FieldOutcome, FieldProcessor};
use crate::port_location::PortLocationResolver;
use crate::ports::{
    DeliveryRecordRepository, DocumentDelivery, FeatureFlags, NotificationConfigRepository, SentValueStore,
};

/// Every collaborator the pipeline reaches through a port
#[derive(Clone)]
pub struct MilestonePorts {
    pub feature_flags: Arc<dyn FeatureFlags>,
    pub configs: Arc<dyn NotificationConfigRepository>,
    pub companies: Arc<dyn CompanyDirectory>,
    pub port_directory: Arc<dyn PortDirectory>,
    pub delivery_records: Arc<dyn DeliveryRecordRepository>,
    pub document_delivery: Arc<dyn DocumentDelivery>,
    pub sent_values: Arc<dyn SentValueStore>,
}

/// Dispatch tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Reporting timezone for entry fields without their own
    pub entry_timezone: Timezone,
    /// Reporting timezone for security filing fields without their own
    pub security_filing_timezone: Timezone,
    /// Time between a send and its confirmation
    pub confirmation_grace: Duration,
}

impl DispatcherSettings {
    pub fn timezone(&self, module: ModuleType) -> Timezone {
        match module {
            ModuleType::Entry => self.entry_timezone,
            ModuleType::SecurityFiling => self.security_filing_timezone,
        }
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            entry_timezone: Timezone::default(),
            security_filing_timezone: Timezone::default(),
            confirmation_grace: default_confirmation_grace(),
        }
    }
}

/// What happened to one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfigOutcome {
    /// A batch was written
    Sent { documents: usize },
    /// The configuration's field criteria do not hold for the record
    CriteriaNotMet,
    /// Every field was empty or already sent
    NothingToSend,
    /// The batch was written but its delivery state was not saved; the
    /// next change resends it
    Unconfirmed { documents: usize, message: String },
    /// Processing failed; nothing was persisted for this configuration
    Failed { message: String },
}

/// Per-configuration part of a dispatch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub config_id: ConfigId,
    pub partner_key: String,
    pub testing: bool,
    pub outcome: ConfigOutcome,
    /// Fields skipped because they had no value or were already sent
    pub skipped_fields: Vec<String>,
}

/// Result of dispatching one change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub record: RecordRef,
    pub accepted: bool,
    pub configs: Vec<ConfigReport>,
}

impl DispatchReport {
    fn rejected(record: RecordRef) -> Self {
        Self {
            record,
            accepted: false,
            configs: Vec::new(),
        }
    }

    /// Documents written across every configuration
    pub fn documents_sent(&self) -> usize {
        self.configs
            .iter()
            .map(|c| match c.outcome {
                ConfigOutcome::Sent { documents } | ConfigOutcome::Unconfirmed { documents, .. } => documents,
                _ => 0,
            })
            .sum()
    }

    /// Configurations that failed, including unconfirmed sends
    pub fn failures(&self) -> impl Iterator<Item = &ConfigReport> {
        self.configs.iter().filter(|c| {
            matches!(
                c.outcome,
                ConfigOutcome::Failed { .. } | ConfigOutcome::Unconfirmed { .. }
            )
        })
    }
}

/// Drives record changes through the notification pipeline
#[derive(Clone)]
pub struct Dispatcher {
    acceptance: AcceptanceFilter,
    fields: FieldProcessor,
    assembler: DocumentAssembler,
    sent_values: Arc<dyn SentValueStore>,
    settings: DispatcherSettings,
}

impl Dispatcher {
    pub fn new(ports: MilestonePorts, settings: DispatcherSettings) -> Self {
        let acceptance = AcceptanceFilter::new(ports.feature_flags, ports.configs, ports.companies);
        let fields = FieldProcessor::new(Arc::clone(&ports.delivery_records));
        let assembler = DocumentAssembler::new(
            ports.document_delivery,
            ports.delivery_records,
            PortLocationResolver::new(ports.port_directory),
        )
        .with_confirmation_grace(settings.confirmation_grace);

        Self {
            acceptance,
            fields,
            assembler,
            sent_values: ports.sent_values,
            settings,
        }
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Processes one record change
    ///
    /// Errors are returned only when the applicable configurations cannot be
    /// determined; per-configuration failures are in the report.
    #[instrument(skip(self, event, record), fields(record = %record.record_ref(), user = %event.user()))]
    pub async fn dispatch(&self, event: &ChangeEvent, record: &ShipmentRecord) -> Result<DispatchReport, MilestoneError> {
        let configs = self.acceptance.matching_configs(event, record).await?;
        if configs.is_empty() {
            return Ok(DispatchReport::rejected(record.record_ref()));
        }

        let mut reports = Vec::with_capacity(configs.len());
        for config in &configs {
            let report = match self.dispatch_config(event, config, record).await {
                Ok(report) => report,
                Err(e) => {
                    error!(config = %config.id, partner = %config.partner_key, error = %e, "Milestone dispatch failed");
                    let outcome = match &e {
                        MilestoneError::Unconfirmed { documents, .. } => ConfigOutcome::Unconfirmed {
                            documents: *documents,
                            message: e.to_string(),
                        },
                        _ => ConfigOutcome::Failed { message: e.to_string() },
                    };
                    ConfigReport {
                        config_id: config.id,
                        partner_key: config.partner_key.clone(),
                        testing: config.testing,
                        outcome,
                        skipped_fields: Vec::new(),
                    }
                }
            };
            reports.push(report);
        }

        let report = DispatchReport {
            record: record.record_ref(),
            accepted: true,
            configs: reports,
        };
        info!(
            configs = report.configs.len(),
            documents = report.documents_sent(),
            failures = report.failures().count(),
            "Dispatched record change"
        );
        Ok(report)
    }

    async fn dispatch_config(
        &self,
        event: &ChangeEvent,
        config: &NotificationConfig,
        record: &ShipmentRecord,
    ) -> Result<ConfigReport, MilestoneError> {
        let mut report = ConfigReport {
            config_id: config.id,
            partner_key: config.partner_key.clone(),
            testing: config.testing,
            outcome: ConfigOutcome::NothingToSend,
            skipped_fields: Vec::new(),
        };

        config.validate()?;
        if !config.criteria_met(record) {
            report.outcome = ConfigOutcome::CriteriaNotMet;
            return Ok(report);
        }

        let timezone = self.settings.timezone(record.module());
        let mut updates = Vec::new();
        for field in &config.fields {
            match self.fields.process_field(field, config, record, timezone).await? {
                FieldOutcome::Update(update) => updates.push(update),
                FieldOutcome::NoValue | FieldOutcome::Unchanged => {
                    report.skipped_fields.push(field.field_id.clone())
                }
            }
        }
        if updates.is_empty() {
            return Ok(report);
        }

        let sent = self
            .assembler
            .generate_and_send_all(config, record, &updates, Some(event.metadata.clone()))
            .await?;
        report.outcome = ConfigOutcome::Sent { documents: sent.len() };

        if !config.testing {
            self.record_sent_values(&sent).await;
        }
        Ok(report)
    }

    /// Writes one cross reference per sent event code
    ///
    /// The batch is already delivered at this point, so failures are only
    /// logged.
    async fn record_sent_values(&self, sent: &[Data315]) {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let events = sent
            .iter()
            .map(|data| &data.event)
            .filter(|event| seen.insert(event.code.clone()));

        for event in events.collect::<Vec<&MilestoneUpdate>>() {
            let value = SentValue {
                record: event.delivery.record.clone(),
                event_code: event.code.clone(),
                event_at: event.date.with_timezone(&Utc),
                sent_at: now,
            };
            if let Err(e) = self.sent_values.record_sent(&value).await {
                warn!(event_code = %value.event_code, error = %e, "Failed to record sent value");
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
