//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::PortError;

#[test]
fn test_unknown_value_names_kind_and_value() {
    let error = CoreError::unknown("contact role", "Underwriter");

    match &error {
        CoreError::UnknownValue { kind, value } => {
            assert_eq!(*kind, "contact role");
            assert_eq!(value, "Underwriter");
        }
    }
    assert_eq!(error.to_string(), "Unknown contact role: Underwriter");
}

#[test]
fn test_port_error_validation_field() {
    let error = PortError::validation_field("must be positive", "amount_paid");

    match error {
        PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("amount_paid")),
        _ => panic!("Expected Validation error"),
    }
}
