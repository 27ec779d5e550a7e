//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, and display formatting of the
//! pipeline's identifier types.

use core_kernel::{BatchId, CompanyId, ConfigId, DeliveryRecordId, RecordId};
use proptest::prelude::*;
use uuid::Uuid;

mod record_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = RecordId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = RecordId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = RecordId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("REC-not-a-uuid".parse::<RecordId>().is_err());
        assert!("".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_parse_rejects_foreign_prefix() {
        let config = ConfigId::new();
        assert!(config.to_string().parse::<RecordId>().is_err());
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(RecordId::prefix(), "REC");
        assert_eq!(CompanyId::prefix(), "CMP");
        assert_eq!(ConfigId::prefix(), "CFG");
        assert_eq!(DeliveryRecordId::prefix(), "DLV");
        assert_eq!(BatchId::prefix(), "BAT");
    }

    #[test]
    fn test_display_uses_prefix() {
        assert!(CompanyId::new().to_string().starts_with("CMP-"));
        assert!(BatchId::new().to_string().starts_with("BAT-"));
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&ConfigId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_deserializes_from_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id: DeliveryRecordId = serde_json::from_str(&format!("\"{}\"", uuid)).unwrap();
        assert_eq!(*id.as_uuid(), uuid);
    }
}

proptest! {
    #[test]
    fn display_parses_back(bytes in any::<[u8; 16]>()) {
        let id = RecordId::from_uuid(Uuid::from_bytes(bytes));
        let parsed: RecordId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}
