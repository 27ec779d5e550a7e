//! Pre-built Test Fixtures
//!
//! Ready-to-use reference data and timestamps for pipeline tests. Values are
//! fixed so expected XML can be written by hand.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use core_kernel::Timezone;
use domain_shipment::{Company, PortRecord};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The event day used throughout (Dec 1, 2015)
    pub fn event_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 12, 1).expect("valid date")
    }

    /// 10:30 New York time on the event day
    pub fn release_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 12, 1, 15, 30, 0).unwrap()
    }

    /// 23:59 New York time on the event day
    pub fn last_minute_of_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 12, 2, 4, 59, 0).unwrap()
    }

    /// Default reporting timezone
    pub fn eastern() -> Timezone {
        Timezone::new(chrono_tz::America::New_York)
    }

    pub fn central() -> Timezone {
        Timezone::new(chrono_tz::America::Chicago)
    }
}

/// Fixture for port reference data
pub struct PortFixtures;

impl PortFixtures {
    /// New York, Schedule D `1001` and UN/LOCODE `USNYC`
    pub fn new_york() -> PortRecord {
        PortRecord {
            schedule_d_code: Some("1001".to_string()),
            un_locode: Some("USNYC".to_string()),
            name: Some("New York, NY".to_string()),
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            country: Some("US".to_string()),
            ..PortRecord::default()
        }
    }

    /// Shanghai, Schedule K `57035`
    pub fn shanghai() -> PortRecord {
        PortRecord {
            schedule_k_code: Some("57035".to_string()),
            un_locode: Some("CNSHA".to_string()),
            name: Some("Shanghai".to_string()),
            country: Some("CN".to_string()),
            ..PortRecord::default()
        }
    }

    /// Toronto, CBSA office `0495` with UN/LOCODE `CATOR`
    pub fn toronto() -> PortRecord {
        PortRecord {
            cbsa_port: Some("0495".to_string()),
            un_locode: Some("CATOR".to_string()),
            name: Some("Toronto".to_string()),
            state: Some("ON".to_string()),
            country: Some("CA".to_string()),
            ..PortRecord::default()
        }
    }

    /// A CBSA office with no UN/LOCODE on file
    pub fn cbsa_without_un_locode() -> PortRecord {
        PortRecord {
            cbsa_port: Some("0809".to_string()),
            name: Some("Sarnia".to_string()),
            country: Some("CA".to_string()),
            ..PortRecord::default()
        }
    }

    pub fn all() -> Vec<PortRecord> {
        vec![
            Self::new_york(),
            Self::shanghai(),
            Self::toronto(),
            Self::cbsa_without_un_locode(),
        ]
    }
}

/// Fixture for company hierarchies
pub struct CompanyFixtures;

impl CompanyFixtures {
    /// A parent account with system code `PARENT1` and one importer under it
    pub fn parent_and_importer() -> (Company, Company) {
        let parent = Company::new("Parent Holdings", Some("PARENT1"));
        let importer = Company::new("Acme Imports", Some("ACME")).with_parent(parent.id);
        (parent, importer)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn partner() -> &'static str {
        "ACME"
    }

    pub fn customer_number() -> &'static str {
        "ACME"
    }

    pub fn broker_reference() -> &'static str {
        "BR-1001"
    }

    pub fn file_number() -> &'static str {
        "ISF-2001"
    }
}
