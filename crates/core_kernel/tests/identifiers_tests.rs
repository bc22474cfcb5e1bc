//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, and display formatting of
//! the tenancy and tracking identifiers.

use core_kernel::{TenantId, UserId, RequestId, MutationId};
use uuid::Uuid;

mod tenant_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = TenantId::new();
        let id2 = TenantId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = TenantId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(TenantId::prefix(), "TNT");
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = TenantId::new();
        let parsed: TenantId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: TenantId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        let parsed = "TNT-not-a-uuid".parse::<TenantId>();
        assert!(parsed.is_err());
    }

    #[test]
    fn test_json_serialization_is_transparent() {
        let id = TenantId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let deserialized: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}

mod mutation_id_tests {
    use super::*;

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = MutationId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = MutationId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_display_format() {
        assert!(MutationId::new().to_string().starts_with("MUT-"));
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_all_prefixes_are_distinct() {
        let prefixes = [
            TenantId::prefix(),
            UserId::prefix(),
            RequestId::prefix(),
            MutationId::prefix(),
        ];
        for (i, a) in prefixes.iter().enumerate() {
            for b in prefixes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_request_id_display() {
        assert!(RequestId::new().to_string().starts_with("REQ-"));
        assert!(UserId::new().to_string().starts_with("USR-"));
    }
}
