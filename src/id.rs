//! Prefixed ID generation for Giftwell entities.
//!
//! All IDs use a `gw_` brand prefix to guarantee collision avoidance with
//! payment processor IDs (Stripe's `cs_`, `pi_`, `evt_`, etc.).
//!
//! Format: `gw_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["gw_don_", "gw_pay_", "gw_led_", "gw_evt_"];

/// Validate that a string is a valid Giftwell prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
/// Validates format: `gw_{entity}_{32_hex_chars}`
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs in Giftwell.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Donor,
    Payment,
    LedgerEntry,
    Notification,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Donor => "gw_don",
            Self::Payment => "gw_pay",
            Self::LedgerEntry => "gw_led",
            Self::Notification => "gw_evt",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let id = EntityType::Donor.gen_id();
        assert!(id.starts_with("gw_don_"));
        // gw_don_ (7 chars) + 32 hex chars = 39 chars total
        assert_eq!(id.len(), 39);
    }

    #[test]
    fn test_all_prefixes_unique() {
        let prefixes = [
            EntityType::Donor.prefix(),
            EntityType::Payment.prefix(),
            EntityType::LedgerEntry.prefix(),
            EntityType::Notification.prefix(),
        ];

        let mut seen = std::collections::HashSet::new();
        for prefix in prefixes {
            assert!(seen.insert(prefix), "Duplicate prefix found: {}", prefix);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let id1 = EntityType::Payment.gen_id();
        let id2 = EntityType::Payment.gen_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_is_valid_prefixed_id() {
        assert!(is_valid_prefixed_id("gw_don_a1b2c3d4e5f6789012345678901234ab"));
        assert!(is_valid_prefixed_id("gw_pay_00000000000000000000000000000000"));
        assert!(is_valid_prefixed_id(&EntityType::LedgerEntry.gen_id()));
        assert!(is_valid_prefixed_id(&EntityType::Notification.gen_id()));

        assert!(!is_valid_prefixed_id(""));
        assert!(!is_valid_prefixed_id("a1b2c3d4-e5f6-7890-1234-567890123456")); // plain UUID
        assert!(!is_valid_prefixed_id("gw_unknown_a1b2c3d4e5f6789012345678901234ab"));
        assert!(!is_valid_prefixed_id("gw_don_a1b2c3d4")); // too short
        assert!(!is_valid_prefixed_id("gw_don_a1b2c3d4e5f6789012345678901234gg")); // non-hex
        assert!(!is_valid_prefixed_id("don_a1b2c3d4e5f6789012345678901234ab")); // missing gw_
    }
}
