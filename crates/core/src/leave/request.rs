//! Leave request model.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use hris_shared::types::{ApproverId, EmployeeId, LeaveRequestId, LeaveTypeId};
use serde::{Deserialize, Serialize};

use crate::leave::error::LeaveError;
use crate::leave::overlap::ranges_overlap;
use crate::leave::workflow::{LeaveDecision, LeaveWorkflow};

/// Approval status of a leave request.
///
/// The string forms are the values stored in `leaverequest.approvalStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    /// Awaiting a supervisor decision.
    Pending,
    /// Approved (terminal).
    Approved,
    /// Rejected (terminal).
    Rejected,
}

impl ApprovalStatus {
    /// Returns the stored string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a status, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// True for Approved and Rejected.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// True for statuses that occupy calendar days (Pending, Approved).
    #[must_use]
    pub fn holds_dates(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for filing a leave request.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    /// Requesting employee.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave (inclusive).
    pub leave_start: NaiveDate,
    /// Last day of leave (inclusive).
    pub leave_end: NaiveDate,
    /// Free-text reason.
    pub leave_reason: Option<String>,
}

impl NewLeaveRequest {
    /// Checks `leave_start <= leave_end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when the range is inverted.
    pub fn validate(&self) -> Result<(), LeaveError> {
        if self.leave_start > self.leave_end {
            return Err(LeaveError::InvalidDateRange {
                start: self.leave_start,
                end: self.leave_end,
            });
        }
        Ok(())
    }
}

/// A leave request and its approval state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Surrogate key, `None` until persisted.
    pub leave_request_id: Option<LeaveRequestId>,
    /// Requesting employee.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave (inclusive).
    pub leave_start: NaiveDate,
    /// Last day of leave (inclusive).
    pub leave_end: NaiveDate,
    /// Free-text reason.
    pub leave_reason: Option<String>,
    /// Current status.
    pub approval_status: ApprovalStatus,
    /// When the request was filed.
    pub date_created: Option<DateTime<FixedOffset>>,
    /// When the approve/reject decision was taken.
    pub date_approved: Option<DateTime<FixedOffset>>,
    /// Supervisor notes recorded with the decision.
    pub supervisor_notes: Option<String>,
}

impl LeaveRequest {
    /// Builds a Pending request from validated input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `leave_start > leave_end`.
    pub fn from_new(
        input: NewLeaveRequest,
        date_created: DateTime<FixedOffset>,
    ) -> Result<Self, LeaveError> {
        input.validate()?;
        Ok(Self {
            leave_request_id: None,
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            leave_start: input.leave_start,
            leave_end: input.leave_end,
            leave_reason: input.leave_reason,
            approval_status: ApprovalStatus::Pending,
            date_created: Some(date_created),
            date_approved: None,
            supervisor_notes: None,
        })
    }

    /// True while awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }

    /// True once approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn duration_days(&self) -> i32 {
        let days = (self.leave_end - self.leave_start).num_days() + 1;
        i32::try_from(days.max(0)).unwrap_or(i32::MAX)
    }

    /// True if both requests share at least one calendar day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        ranges_overlap(
            self.leave_start,
            self.leave_end,
            other.leave_start,
            other.leave_end,
        )
    }

    /// Approves this request, stamping the decision time and notes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not Pending; nothing is mutated.
    pub fn approve(
        &mut self,
        approver: ApproverId,
        notes: Option<String>,
        at: DateTime<FixedOffset>,
    ) -> Result<LeaveDecision, LeaveError> {
        let decision = LeaveWorkflow::approve(self.approval_status, approver, notes, at)?;
        self.apply(&decision);
        Ok(decision)
    }

    /// Rejects this request. Notes are mandatory.
    ///
    /// # Errors
    ///
    /// - `RejectionNotesRequired` for blank notes
    /// - `InvalidTransition` if not Pending
    ///
    /// Nothing is mutated on error.
    pub fn reject(
        &mut self,
        approver: ApproverId,
        notes: String,
        at: DateTime<FixedOffset>,
    ) -> Result<LeaveDecision, LeaveError> {
        let decision = LeaveWorkflow::reject(self.approval_status, approver, notes, at)?;
        self.apply(&decision);
        Ok(decision)
    }

    fn apply(&mut self, decision: &LeaveDecision) {
        self.approval_status = decision.new_status();
        self.date_approved = Some(decision.decided_at());
        self.supervisor_notes = decision.notes().map(str::to_owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 5, 9, 0, 0)
            .unwrap()
    }

    fn pending(start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest::from_new(
            NewLeaveRequest {
                employee_id: EmployeeId(1),
                leave_type_id: LeaveTypeId(2),
                leave_start: start,
                leave_end: end,
                leave_reason: Some("family trip".into()),
            },
            at(),
        )
        .unwrap()
    }

    #[test]
    fn test_status_round_trips_wire_strings() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("APPROVED"), Some(ApprovalStatus::Approved));
        assert_eq!(ApprovalStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
        assert!(!ApprovalStatus::Rejected.holds_dates());
    }

    #[test]
    fn test_new_request_is_pending() {
        let request = pending(date(2025, 1, 10), date(2025, 1, 15));
        assert!(request.is_pending());
        assert_eq!(request.date_created, Some(at()));
        assert_eq!(request.date_approved, None);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = LeaveRequest::from_new(
            NewLeaveRequest {
                employee_id: EmployeeId(1),
                leave_type_id: LeaveTypeId(2),
                leave_start: date(2025, 1, 15),
                leave_end: date(2025, 1, 10),
                leave_reason: None,
            },
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_duration_is_inclusive() {
        assert_eq!(pending(date(2025, 1, 10), date(2025, 1, 15)).duration_days(), 6);
        assert_eq!(pending(date(2025, 1, 10), date(2025, 1, 10)).duration_days(), 1);
        assert_eq!(pending(date(2024, 2, 28), date(2024, 3, 1)).duration_days(), 3);
    }

    #[test]
    fn test_approve_stamps_decision() {
        let mut request = pending(date(2025, 1, 10), date(2025, 1, 15));
        request.approve(ApproverId(9), Some("enjoy".into()), at()).unwrap();
        assert!(request.is_approved());
        assert_eq!(request.date_approved, Some(at()));
        assert_eq!(request.supervisor_notes.as_deref(), Some("enjoy"));
    }

    #[test]
    fn test_approve_already_approved_leaves_state_unchanged() {
        let mut request = pending(date(2025, 1, 10), date(2025, 1, 15));
        request.approve(ApproverId(9), Some("first".into()), at()).unwrap();
        let snapshot = request.clone();

        assert!(request.approve(ApproverId(3), Some("second".into()), at()).is_err());
        assert_eq!(request, snapshot);
    }

    #[test]
    fn test_reject_with_blank_notes_stays_pending() {
        let mut request = pending(date(2025, 1, 10), date(2025, 1, 15));
        let err = request.reject(ApproverId(9), String::new(), at()).unwrap_err();
        assert!(matches!(err, LeaveError::RejectionNotesRequired));
        assert!(request.is_pending());
        assert_eq!(request.date_approved, None);
    }

    #[test]
    fn test_reject_records_notes() {
        let mut request = pending(date(2025, 1, 10), date(2025, 1, 15));
        request
            .reject(ApproverId(9), "peak season".into(), at())
            .unwrap();
        assert_eq!(request.approval_status, ApprovalStatus::Rejected);
        assert_eq!(request.supervisor_notes.as_deref(), Some("peak season"));
        assert_eq!(request.date_approved, Some(at()));
    }

    #[test]
    fn test_overlaps_shared_boundary_day() {
        let a = pending(date(2025, 1, 10), date(2025, 1, 15));
        let b = pending(date(2025, 1, 15), date(2025, 1, 20));
        let c = pending(date(2025, 1, 16), date(2025, 1, 20));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
