//! Overlap detection between leave requests.
//!
//! Two inclusive ranges `[a, b]` and `[c, d]` overlap iff
//! `a <= d AND c <= b`, so a shared boundary day counts.
//!
//! Only Pending and Approved requests occupy days. Overlaps against
//! Approved requests block approval; Pending-vs-Pending overlaps are
//! reported but left to the supervisor.

use chrono::NaiveDate;
use hris_shared::types::LeaveRequestId;

use crate::leave::request::{ApprovalStatus, LeaveRequest};

/// True if the inclusive ranges share at least one calendar day.
#[must_use]
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Existing requests that collide with `candidate`.
///
/// Keeps requests of the same employee, other than the candidate itself,
/// whose status is Pending or Approved and whose dates intersect.
#[must_use]
pub fn overlapping_requests<'a>(
    candidate: &LeaveRequest,
    existing: &'a [LeaveRequest],
) -> Vec<&'a LeaveRequest> {
    existing
        .iter()
        .filter(|other| other.employee_id == candidate.employee_id)
        .filter(|other| {
            candidate.leave_request_id.is_none()
                || other.leave_request_id != candidate.leave_request_id
        })
        .filter(|other| other.approval_status.holds_dates())
        .filter(|other| candidate.overlaps(other))
        .collect()
}

/// Ids of the Approved requests that collide with `candidate`.
#[must_use]
pub fn approved_conflicts(candidate: &LeaveRequest, existing: &[LeaveRequest]) -> Vec<LeaveRequestId> {
    overlapping_requests(candidate, existing)
        .into_iter()
        .filter(|other| other.approval_status == ApprovalStatus::Approved)
        .filter_map(|other| other.leave_request_id)
        .collect()
}

/// True iff any colliding request is already Approved.
#[must_use]
pub fn has_conflict_with_approved(candidate: &LeaveRequest, existing: &[LeaveRequest]) -> bool {
    overlapping_requests(candidate, existing)
        .iter()
        .any(|other| other.approval_status == ApprovalStatus::Approved)
}
