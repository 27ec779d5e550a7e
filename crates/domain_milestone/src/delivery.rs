//! Delivery records and the disambiguation ledger
//!
//! A delivery record is the durable state of one outbound channel: one
//! record, one partner, one event field and one event code. It carries the fingerprint of the last
//! confirmed send and the ledger of minute offsets already issued per day.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::DeliveryRecordId;
use domain_shipment::{ModuleType, RecordRef};

/// Channel name for an event field, e.g. `315_release_date`
pub fn channel_name(module: ModuleType, field_id: &str) -> String {
    let prefix = match module {
        ModuleType::Entry => "315",
        ModuleType::SecurityFiling => "315_isf",
    };
    format!("{}_{}", prefix, field_id)
}

/// Identity of one outbound channel of a record
///
/// Partners never share a channel, and neither do two event codes reported
/// from the same field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    /// Partner the channel delivers to
    pub partner_key: String,
    /// Channel name, e.g. `315_release_date`
    pub trading_partner: String,
    pub event_code: String,
}

impl ChannelKey {
    pub fn new(
        partner_key: impl Into<String>,
        trading_partner: impl Into<String>,
        event_code: impl Into<String>,
    ) -> Self {
        Self {
            partner_key: partner_key.into(),
            trading_partner: trading_partner.into(),
            event_code: event_code.into(),
        }
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.partner_key, self.trading_partner, self.event_code)
    }
}

/// Minute offsets issued per local calendar day
///
/// Each day holds the offsets in the order they were issued. Entries are
/// only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisambiguationLedger(BTreeMap<NaiveDate, Vec<i32>>);

impl DisambiguationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offsets issued for `day`, oldest first
    pub fn offsets(&self, day: NaiveDate) -> &[i32] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recently issued offset for `day`
    pub fn last_offset(&self, day: NaiveDate) -> Option<i32> {
        self.offsets(day).last().copied()
    }

    /// Appends an issued offset
    pub fn record(&mut self, day: NaiveDate, offset: i32) {
        self.0.entry(day).or_default().push(offset);
    }

    /// Number of days with at least one issued offset
    pub fn days(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<NaiveDate, Vec<i32>>> for DisambiguationLedger {
    fn from(map: BTreeMap<NaiveDate, Vec<i32>>) -> Self {
        Self(map)
    }
}

/// Durable state of one outbound notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: DeliveryRecordId,
    pub record: RecordRef,
    #[serde(flatten)]
    pub channel: ChannelKey,
    /// Fingerprint of the last send attempt
    pub fingerprint: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub failure_message: Option<String>,
    pub ledger: DisambiguationLedger,
}

impl DeliveryRecord {
    /// Creates a channel that has never been sent
    pub fn new(record: RecordRef, channel: ChannelKey) -> Self {
        Self {
            id: DeliveryRecordId::new_v7(),
            record,
            channel,
            fingerprint: None,
            sent_at: None,
            confirmed_at: None,
            failure_message: None,
            ledger: DisambiguationLedger::new(),
        }
    }

    /// Returns true once a send has been confirmed
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// Returns true when a confirmed send already carried `fingerprint`
    pub fn already_sent(&self, fingerprint: &str) -> bool {
        self.is_confirmed() && self.fingerprint.as_deref() == Some(fingerprint)
    }

    /// Records a successful delivery
    pub fn mark_sent(&mut self, now: DateTime<Utc>, grace: Duration) {
        self.sent_at = Some(now);
        self.confirmed_at = Some(now + grace);
        self.failure_message = None;
    }
}

/// A rendered batch ready for the partner folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundDocument {
    /// Partner folder, `<partner>` or `<partner>_test`
    pub folder: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Cross reference of the value an event code was last sent with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentValue {
    pub record: RecordRef,
    pub event_code: String,
    /// Event time as transmitted, offset applied
    pub event_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
}
