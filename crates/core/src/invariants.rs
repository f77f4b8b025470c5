//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::balance::BalanceSummary;
use crate::models::{House, UserProfile, INVITE_CODE_LEN};

/// Validate that a House's state is internally consistent
pub fn assert_house_invariants(house: &House) {
    // Invite codes are fixed-length uppercase alphanumerics
    debug_assert!(
        house.invite_code.len() == INVITE_CODE_LEN
            && house
                .invite_code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()),
        "House {} has malformed invite code {:?}",
        house.id,
        house.invite_code
    );

    // Name must not be empty
    debug_assert!(
        !house.name.trim().is_empty(),
        "House {} has empty name",
        house.id
    );
}

/// Validate that a profile row is usable
pub fn assert_profile_invariants(profile: &UserProfile) {
    debug_assert!(
        profile.id != Uuid::nil(),
        "Profile has nil id (email: {:?})",
        profile.email
    );
}

/// Validate that a derived balance reconciles exactly
pub fn assert_balance_invariants(summary: &BalanceSummary) {
    debug_assert!(
        summary.net_balance == summary.you_are_owed - summary.you_owe,
        "Balance summary does not reconcile: {:?}",
        summary
    );
}

/// Validate that a user ID is not nil
pub fn assert_user_id_valid(user_id: Uuid, context: &str) {
    debug_assert!(
        user_id != Uuid::nil(),
        "Nil user_id in context: {}",
        context
    );
}

/// Validate that a house ID is not nil
pub fn assert_house_id_valid(house_id: Uuid, context: &str) {
    debug_assert!(
        house_id != Uuid::nil(),
        "Nil house_id in context: {}",
        context
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_valid_house() {
        let house = House::new("Test House".to_string(), Uuid::new_v4());
        assert_house_invariants(&house);
    }

    #[test]
    #[should_panic(expected = "malformed invite code")]
    fn test_lowercase_code_rejected() {
        let mut house = House::new("Test House".to_string(), Uuid::new_v4());
        house.invite_code = "abc123".to_string();
        assert_house_invariants(&house);
    }

    #[test]
    fn test_valid_profile() {
        let profile = UserProfile::new(Uuid::new_v4(), None, None);
        assert_profile_invariants(&profile);
    }

    #[test]
    fn test_balanced_summary() {
        let summary = BalanceSummary {
            you_owe: Decimal::from(20),
            you_are_owed: Decimal::from(50),
            net_balance: Decimal::from(30),
        };
        assert_balance_invariants(&summary);
    }

    #[test]
    #[should_panic(expected = "does not reconcile")]
    fn test_unbalanced_summary() {
        let summary = BalanceSummary {
            you_owe: Decimal::from(20),
            you_are_owed: Decimal::from(50),
            net_balance: Decimal::ZERO,
        };
        assert_balance_invariants(&summary);
    }

    #[test]
    fn test_id_guards() {
        assert_user_id_valid(Uuid::new_v4(), "test");
        assert_house_id_valid(Uuid::new_v4(), "test");
    }
}
