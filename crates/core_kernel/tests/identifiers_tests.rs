//! Unit tests for the Identifiers module
//!
//! Tests cover the accounting identifier types, their creation, parsing,
//! conversion, and display formatting.

use core_kernel::{PolicyId, InvoiceId, PaymentId, ContactId};
use uuid::Uuid;

mod policy_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = PolicyId::new();
        let id2 = PolicyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = PolicyId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(PolicyId::prefix(), "POL");
    }

    #[test]
    fn test_display_format() {
        let id = PolicyId::new();
        assert!(id.to_string().starts_with("POL-"));
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = PolicyId::new();
        let parsed: PolicyId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("POL-not-a-uuid".parse::<PolicyId>().is_err());
    }

    #[test]
    fn test_json_serialization_is_transparent() {
        let id = PolicyId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let deserialized: PolicyId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}

mod accounting_id_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(InvoiceId::prefix(), "INV");
        assert_eq!(PaymentId::prefix(), "PAY");
        assert_eq!(ContactId::prefix(), "CNT");
    }

    #[test]
    fn test_roundtrip_through_display() {
        let invoice = InvoiceId::new_v7();
        let payment = PaymentId::new_v7();
        let contact = ContactId::new();

        assert_eq!(invoice, invoice.to_string().parse().unwrap());
        assert_eq!(payment, payment.to_string().parse().unwrap());
        assert_eq!(contact, contact.to_string().parse().unwrap());
    }

    #[test]
    fn test_id_prefixes_are_unique() {
        let mut prefixes = vec![
            PolicyId::prefix(),
            InvoiceId::prefix(),
            PaymentId::prefix(),
            ContactId::prefix(),
        ];
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), 4, "All identifier prefixes should be unique");
    }
}
