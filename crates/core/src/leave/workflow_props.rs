//! Property-based tests for the leave approval state machine.

use chrono::{DateTime, FixedOffset, TimeZone};
use hris_shared::types::ApproverId;
use proptest::prelude::*;

use crate::leave::error::LeaveError;
use crate::leave::request::ApprovalStatus;
use crate::leave::workflow::LeaveWorkflow;

/// Strategy for generating random ApprovalStatus values.
fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

/// Strategy for generating approvers.
fn arb_approver() -> impl Strategy<Value = ApproverId> {
    (1i32..10_000).prop_map(ApproverId)
}

/// Strategy for generating notes, blank ones included.
fn arb_notes() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just("   ".to_string()), "[a-zA-Z0-9 ]{1,60}"]
}

fn decided_at() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 2, 3, 14, 0, 0)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approval succeeds exactly from Pending.
    #[test]
    fn prop_approve_only_from_pending(status in arb_status(), approver in arb_approver()) {
        let result = LeaveWorkflow::approve(status, approver, None, decided_at());
        if status == ApprovalStatus::Pending {
            let decision = result.unwrap();
            prop_assert_eq!(decision.new_status(), ApprovalStatus::Approved);
            prop_assert_eq!(decision.decided_by(), approver);
        } else {
            let is_invalid_transition = matches!(result, Err(LeaveError::InvalidTransition { .. }));
            prop_assert!(is_invalid_transition);
        }
    }

    /// Rejection needs Pending and non-blank notes; blank notes are checked first.
    #[test]
    fn prop_reject_requires_pending_and_notes(
        status in arb_status(),
        approver in arb_approver(),
        notes in arb_notes(),
    ) {
        let result = LeaveWorkflow::reject(status, approver, notes.clone(), decided_at());
        if notes.trim().is_empty() {
            let is_notes_required = matches!(result, Err(LeaveError::RejectionNotesRequired));
            prop_assert!(is_notes_required);
        } else if status == ApprovalStatus::Pending {
            let decision = result.unwrap();
            prop_assert_eq!(decision.new_status(), ApprovalStatus::Rejected);
            prop_assert_eq!(decision.notes(), Some(notes.as_str()));
        } else {
            let is_invalid_transition = matches!(result, Err(LeaveError::InvalidTransition { .. }));
            prop_assert!(is_invalid_transition);
        }
    }

    /// Successful transitions agree with is_valid_transition; terminal states never move.
    #[test]
    fn prop_transitions_match_table(from in arb_status(), to in arb_status()) {
        let valid = LeaveWorkflow::is_valid_transition(from, to);
        if from.is_terminal() {
            prop_assert!(!valid);
        }
        if valid {
            prop_assert_eq!(from, ApprovalStatus::Pending);
            prop_assert_ne!(to, ApprovalStatus::Pending);
        }
    }
}
