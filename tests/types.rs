// ABOUTME: Integration tests for validated domain types.
// ABOUTME: Tests name validation rules and typed identifier behavior.

use proptest::prelude::*;
use safeset::types::{DocId, DocTypeName, FieldName, RunId};

mod doctype_names {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["Customer", "Sales Invoice", "GL Entry", "custom_doctype-v2"] {
            assert!(DocTypeName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty_and_padded() {
        assert!(DocTypeName::new("").is_err());
        assert!(DocTypeName::new(" Customer").is_err());
        assert!(DocTypeName::new("Customer ").is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(DocTypeName::new("Customer!").is_err());
        assert!(DocTypeName::new("Sales/Invoice").is_err());
    }

    #[test]
    fn rejects_overlong_names() {
        assert!(DocTypeName::new(&"a".repeat(61)).is_ok());
        assert!(DocTypeName::new(&"a".repeat(62)).is_err());
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        let name = DocTypeName::new("Sales Invoice").unwrap();
        assert_eq!(name.slug(), "sales-invoice");

        let name = DocTypeName::new("GL_Entry").unwrap();
        assert_eq!(name.slug(), "gl-entry");
    }

    proptest! {
        #[test]
        fn valid_charset_always_parses(name in "[A-Za-z0-9][A-Za-z0-9 _-]{0,59}[A-Za-z0-9]") {
            prop_assert!(DocTypeName::new(&name).is_ok());
        }
    }
}

mod field_names {
    use super::*;

    #[test]
    fn accepts_snake_case() {
        for name in ["status", "customer_group", "is_active", "_private"] {
            assert!(FieldName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(FieldName::new("").is_err());
        assert!(FieldName::new("Status").is_err());
        assert!(FieldName::new("1st_field").is_err());
        assert!(FieldName::new("field name").is_err());
        assert!(FieldName::new(&"a".repeat(65)).is_err());
    }

    proptest! {
        #[test]
        fn valid_charset_always_parses(name in "[a-z_][a-z0-9_]{0,63}") {
            prop_assert!(FieldName::new(&name).is_ok());
        }

        #[test]
        fn uppercase_never_parses(name in "[a-z]*[A-Z][a-z]*") {
            prop_assert!(FieldName::new(&name).is_err());
        }
    }
}

mod ids {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(DocId::new("CUST-0001"), DocId::new("CUST-0001"));
        assert_ne!(DocId::new("CUST-0001"), DocId::new("CUST-0002"));
    }

    #[test]
    fn ids_display_their_value() {
        let id = RunId::new("customer-20250101-42");
        assert_eq!(id.to_string(), "customer-20250101-42");
        assert_eq!(id.as_str(), "customer-20250101-42");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = DocId::new("CUST-0001");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""CUST-0001""#);

        let back: DocId = serde_json::from_str(r#""CUST-0001""#).unwrap();
        assert_eq!(back, id);
    }
}
