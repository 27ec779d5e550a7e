//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::{PortError, TemporalError, Timezone};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Configuration not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Configuration not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_temporal_error() {
    let temporal = Timezone::parse("Atlantis/Capital").unwrap_err();
    let core_error: CoreError = temporal.into();

    assert!(matches!(
        core_error,
        CoreError::Temporal(TemporalError::InvalidTimezone(ref name)) if name == "Atlantis/Capital"
    ));
    assert!(core_error.to_string().contains("Atlantis/Capital"));
}

#[test]
fn test_core_error_configuration_display() {
    let error = CoreError::configuration("delivery root is empty");
    assert_eq!(error.to_string(), "Configuration error: delivery root is empty");
}

mod port_error_tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PortError::connection("refused").is_transient());
        assert!(PortError::write_failed("ACME/315.xml", std::io::Error::other("disk full")).is_transient());
        assert!(!PortError::validation("bad name").is_transient());
        assert!(!PortError::not_found("Port", "4601").is_transient());
    }

    #[test]
    fn test_not_found() {
        let error = PortError::not_found("Company", "CMP-1");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("CMP-1"));
    }

    #[test]
    fn test_validation_field_keeps_field() {
        match PortError::validation_field("must not contain '/'", "folder") {
            PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("folder")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
