//! Event fingerprints
//!
//! A fingerprint is the SHA-256 digest of what a partner would see for one
//! event: the event code, the final (disambiguated) timestamp to the minute,
//! and any extra inputs the configuration lists.

use chrono::DateTime;
use chrono_tz::Tz;
use sha2::{Digest, Sha256};

use crate::config::FingerprintInput;

const SEPARATOR: &[u8] = b"\x1f";

/// Record-side values the configurable fingerprint inputs draw from
#[derive(Debug, Clone, Copy)]
pub struct FingerprintContext<'a> {
    pub channel: &'a str,
    pub record_key: &'a str,
    pub master_bills: &'a [String],
    pub containers: &'a [String],
}

/// Computes event fingerprints for one configuration
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter<'a> {
    inputs: &'a [FingerprintInput],
}

impl<'a> Fingerprinter<'a> {
    pub fn new(inputs: &'a [FingerprintInput]) -> Self {
        Self { inputs }
    }

    /// Hex-encoded SHA-256 over code, timestamp and the configured inputs
    pub fn fingerprint(&self, code: &str, at: &DateTime<Tz>, context: &FingerprintContext<'_>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hasher.update(SEPARATOR);
        hasher.update(at.format("%Y%m%d%H%M%z").to_string().as_bytes());

        for input in self.inputs {
            hasher.update(SEPARATOR);
            match input {
                FingerprintInput::Salt(salt) => hasher.update(salt.as_bytes()),
                FingerprintInput::Channel => hasher.update(context.channel.as_bytes()),
                FingerprintInput::RecordKey => hasher.update(context.record_key.as_bytes()),
                FingerprintInput::MasterBills => hasher.update(context.master_bills.join("\n").as_bytes()),
                FingerprintInput::Containers => hasher.update(context.containers.join("\n").as_bytes()),
            }
        }

        hex::encode(hasher.finalize())
    }
}
