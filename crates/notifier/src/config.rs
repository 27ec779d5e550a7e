//! Notifier configuration

use std::path::PathBuf;

use chrono::Duration;
use serde::Deserialize;

use core_kernel::{CoreError, Timezone};
use domain_milestone::{DispatcherSettings, StaticFeatureFlags};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Notifier configuration
///
/// Every key can be set through an environment variable with the
/// `NOTIFIER_` prefix, e.g. `NOTIFIER_DELIVERY_ROOT=/srv/outbound`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Root folder partner folders are created under
    pub delivery_root: PathBuf,
    /// Reporting timezone for entry fields without their own
    pub entry_timezone: String,
    /// Reporting timezone for security filing fields without their own
    pub security_filing_timezone: String,
    /// Seconds between a send and its confirmation
    pub confirmation_grace_secs: u64,
    pub entry_enabled: bool,
    pub security_filing_enabled: bool,
    /// Delivery state database; in-memory state when unset
    #[serde(default)]
    pub database_url: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            delivery_root: PathBuf::from("./outbound"),
            entry_timezone: "America/New_York".to_string(),
            security_filing_timezone: "America/New_York".to_string(),
            confirmation_grace_secs: 60,
            entry_enabled: true,
            security_filing_enabled: true,
            database_url: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl NotifierConfig {
    /// Loads configuration from `NOTIFIER_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("NOTIFIER").try_parsing(true))
    }

    /// Loads configuration from `source` layered over the defaults
    pub fn load<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("delivery_root", defaults.delivery_root.display().to_string())?
            .set_default("entry_timezone", defaults.entry_timezone)?
            .set_default("security_filing_timezone", defaults.security_filing_timezone)?
            .set_default("confirmation_grace_secs", defaults.confirmation_grace_secs)?
            .set_default("entry_enabled", defaults.entry_enabled)?
            .set_default("security_filing_enabled", defaults.security_filing_enabled)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Checks values the deserializer cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.delivery_root.as_os_str().is_empty() {
            return Err(CoreError::configuration("delivery_root must not be empty"));
        }
        self.entry_timezone()?;
        self.security_filing_timezone()?;
        if self.confirmation_grace_secs > 86_400 {
            return Err(CoreError::configuration(format!(
                "confirmation_grace_secs of {} exceeds one day",
                self.confirmation_grace_secs
            )));
        }
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(CoreError::configuration("database_url must be a postgres:// URL"));
            }
        }
        Ok(())
    }

    pub fn entry_timezone(&self) -> Result<Timezone, CoreError> {
        Ok(Timezone::parse(&self.entry_timezone)?)
    }

    pub fn security_filing_timezone(&self) -> Result<Timezone, CoreError> {
        Ok(Timezone::parse(&self.security_filing_timezone)?)
    }

    pub fn confirmation_grace(&self) -> Duration {
        Duration::seconds(self.confirmation_grace_secs.min(86_400) as i64)
    }

    pub fn feature_flags(&self) -> StaticFeatureFlags {
        StaticFeatureFlags {
            entry: self.entry_enabled,
            security_filing: self.security_filing_enabled,
        }
    }

    /// Dispatch tunables derived from this configuration
    pub fn dispatcher_settings(&self) -> Result<DispatcherSettings, CoreError> {
        Ok(DispatcherSettings {
            entry_timezone: self.entry_timezone()?,
            security_filing_timezone: self.security_filing_timezone()?,
            confirmation_grace: self.confirmation_grace(),
        })
    }
}
