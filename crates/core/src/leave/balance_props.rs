//! Property-based tests for leave balance arithmetic.
//!
//! Covers the derived-remaining invariant, deduction and restoration
//! bounds, and order independence of duplicate merging.

use hris_shared::types::{EmployeeId, LeaveTypeId};
use proptest::prelude::*;

use crate::leave::balance::{LeaveBalance, merge_duplicates};
use crate::leave::error::LeaveError;

/// Strategy for generating valid balances (used fits the entitlement).
fn arb_balance() -> impl Strategy<Value = LeaveBalance> {
    (0i32..60, 0i32..20)
        .prop_flat_map(|(total, carry)| (Just(total), Just(carry), 0..=total + carry))
        .prop_map(|(total, carry, used)| {
            LeaveBalance::new(EmployeeId(1), LeaveTypeId(2), 2025, total)
                .with_carry_over(carry)
                .with_used(used)
        })
}

/// Strategy for generating day counts, including zero and negatives.
fn arb_days() -> impl Strategy<Value = i32> {
    -10i32..80
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// remaining == total + carry_over - used after recomputation.
    #[test]
    fn prop_remaining_is_derived(mut balance in arb_balance(), used in 0i32..100) {
        balance.used_leave_days = used;
        balance.calculate_remaining_days();
        prop_assert_eq!(
            balance.remaining_leave_days,
            balance.total_leave_days + balance.carry_over_days - balance.used_leave_days
        );
    }

    /// Recomputing twice yields the same value.
    #[test]
    fn prop_recompute_is_idempotent(mut balance in arb_balance()) {
        balance.calculate_remaining_days();
        let once = balance.remaining_leave_days;
        balance.calculate_remaining_days();
        prop_assert_eq!(balance.remaining_leave_days, once);
    }

    /// Deduction succeeds iff 0 < d <= remaining; failure leaves the balance untouched.
    #[test]
    fn prop_deduct_bounds(mut balance in arb_balance(), days in arb_days()) {
        let before = balance.clone();
        let result = balance.deduct_leave(days);

        if days > 0 && days <= before.remaining_leave_days {
            prop_assert!(result.is_ok());
            prop_assert_eq!(balance.used_leave_days, before.used_leave_days + days);
            prop_assert_eq!(balance.remaining_leave_days, before.remaining_leave_days - days);
        } else {
            let is_expected_error = matches!(
                result,
                Err(LeaveError::InvalidDays(_) | LeaveError::InsufficientBalance { .. })
            );
            prop_assert!(is_expected_error);
            prop_assert_eq!(balance, before);
        }
    }

    /// Restoration never drives used below zero.
    #[test]
    fn prop_add_never_negative(mut balance in arb_balance(), days in arb_days()) {
        let _ = balance.add_leave(days);
        prop_assert!(balance.used_leave_days >= 0);
        prop_assert!(balance.remaining_leave_days <= balance.available_days());
    }

    /// A valid balance stays valid through any deduct/add sequence.
    #[test]
    fn prop_operations_preserve_validity(
        mut balance in arb_balance(),
        ops in proptest::collection::vec((any::<bool>(), arb_days()), 0..20),
    ) {
        for (deduct, days) in ops {
            let _ = if deduct { balance.deduct_leave(days) } else { balance.add_leave(days) };
            prop_assert!(balance.is_valid_balance());
        }
    }

    /// Merging duplicates in any order sums to the same totals.
    #[test]
    fn prop_merge_is_order_independent(
        canonical in arb_balance(),
        duplicates in proptest::collection::vec(arb_balance(), 0..5),
    ) {
        let forward = merge_duplicates(&canonical, &duplicates).unwrap();
        let mut reversed_duplicates = duplicates.clone();
        reversed_duplicates.reverse();
        let backward = merge_duplicates(&canonical, &reversed_duplicates).unwrap();

        prop_assert_eq!(forward.total_leave_days, backward.total_leave_days);
        prop_assert_eq!(forward.used_leave_days, backward.used_leave_days);
        prop_assert_eq!(forward.carry_over_days, backward.carry_over_days);
        prop_assert_eq!(forward.remaining_leave_days, backward.remaining_leave_days);

        let expected_total: i32 = canonical.total_leave_days
            + duplicates.iter().map(|d| d.total_leave_days).sum::<i32>();
        prop_assert_eq!(forward.total_leave_days, expected_total);
    }

    /// Merge is associative: (a + b) + c == a + (b + c).
    #[test]
    fn prop_merge_is_associative(a in arb_balance(), b in arb_balance(), c in arb_balance()) {
        let left = a.merge_with(&b).unwrap().merge_with(&c).unwrap();
        let right = a.merge_with(&b.merge_with(&c).unwrap()).unwrap();
        prop_assert_eq!(left.total_leave_days, right.total_leave_days);
        prop_assert_eq!(left.used_leave_days, right.used_leave_days);
        prop_assert_eq!(left.carry_over_days, right.carry_over_days);
    }

    /// Utilization stays within 0..=100 for valid balances.
    #[test]
    fn prop_utilization_is_a_percentage(balance in arb_balance()) {
        let rate = balance.utilization_rate();
        prop_assert!(rate >= rust_decimal::Decimal::ZERO);
        prop_assert!(rate <= rust_decimal::Decimal::ONE_HUNDRED);
    }
}
