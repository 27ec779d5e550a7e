//! Milestone Notifier - Replay Binary
//!
//! Replays the records of a bundle through the notification pipeline, as if
//! each had just been saved.
//!
//! # Usage
//!
//! ```bash
//! milestone-notifier bundle.json
//!
//! NOTIFIER_DELIVERY_ROOT=/srv/outbound \
//! NOTIFIER_DATABASE_URL=postgres://localhost/milestones \
//! milestone-notifier bundle.json
//! ```
//!
//! # Environment Variables
//!
//! * `NOTIFIER_DELIVERY_ROOT` - Partner folder root (default: ./outbound)
//! * `NOTIFIER_ENTRY_TIMEZONE` - Entry reporting timezone (default: America/New_York)
//! * `NOTIFIER_SECURITY_FILING_TIMEZONE` - Security filing reporting timezone (default: America/New_York)
//! * `NOTIFIER_CONFIRMATION_GRACE_SECS` - Send to confirmation delay (default: 60)
//! * `NOTIFIER_ENTRY_ENABLED` / `NOTIFIER_SECURITY_FILING_ENABLED` - Module switches (default: true)
//! * `NOTIFIER_DATABASE_URL` - PostgreSQL delivery state; in memory when unset
//! * `NOTIFIER_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `NOTIFIER_LOG_FORMAT` - pretty or json (default: pretty)

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{error, info, warn};

use domain_milestone::{ChangeEvent, ConfigOutcome};
use domain_shipment::TrackedRecord;
use notifier::{build_dispatcher, telemetry::init_tracing, NotifierConfig, ReplayBundle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = NotifierConfig::from_env().context("loading NOTIFIER_* configuration")?;
    init_tracing(&config.log_level, config.log_format);

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: milestone-notifier <bundle.json>");
    };

    let bundle = ReplayBundle::load(&path).await?;
    info!(
        path = %path.display(),
        configs = bundle.configs.len(),
        records = bundle.records.len(),
        delivery_root = %config.delivery_root.display(),
        "Starting replay"
    );

    let dispatcher = build_dispatcher(&config, &bundle).await?;
    let event = ChangeEvent::saved(bundle.initiated_by.clone());

    let mut documents = 0;
    let mut failures = 0;
    for record in &bundle.records {
        match dispatcher.dispatch(&event, record).await {
            Ok(report) => {
                documents += report.documents_sent();
                for config_report in &report.configs {
                    match &config_report.outcome {
                        ConfigOutcome::Failed { message } | ConfigOutcome::Unconfirmed { message, .. } => {
                            failures += 1;
                            warn!(
                                record = %report.record,
                                partner = %config_report.partner_key,
                                %message,
                                "Configuration failed"
                            );
                        }
                        outcome => info!(
                            record = %report.record,
                            partner = %config_report.partner_key,
                            testing = config_report.testing,
                            outcome = ?outcome,
                            skipped = ?config_report.skipped_fields,
                            "Configuration processed"
                        ),
                    }
                }
                if !report.accepted {
                    info!(record = %report.record, "No applicable configuration");
                }
            }
            Err(e) => {
                failures += 1;
                error!(record = %record.record_ref(), error = %e, "Dispatch failed");
            }
        }
    }

    info!(documents, failures, "Replay complete");
    if failures > 0 {
        bail!("{} configuration(s) failed", failures);
    }
    Ok(())
}
