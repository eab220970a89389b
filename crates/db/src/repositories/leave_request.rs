//! Leave request repository.
//!
//! Persists leave requests, answers overlap queries and runs the approval
//! workflow. Decisions are written with an audit row in
//! `leave_approval_log`; that write happens in a savepoint and a failure
//! there never undoes the decision.

use std::sync::Arc;

use hris_core::leave::{
    ApprovalStatus, LeaveDecision, LeaveError, LeaveRequest, NewLeaveRequest, approved_conflicts,
    has_conflict_with_approved, overlapping_requests,
};
use hris_shared::Clock;
use hris_shared::types::{ApproverId, EmployeeId, LeaveRequestId, LeaveTypeId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, warn};

use crate::entities::{leave_approval_log, leave_request};
use crate::txn::{db_err, for_update, with_savepoint, with_transaction};

/// Leave request repository.
#[derive(Debug, Clone)]
pub struct LeaveRequestRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl LeaveRequestRepository {
    /// Creates a new leave request repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Files a new Pending request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` (no I/O) if the start is after the end.
    pub async fn create_leave_request(
        &self,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = LeaveRequest::from_new(input, self.clock.now())?;

        let active = leave_request::ActiveModel {
            employee_id: Set(request.employee_id.into_inner()),
            leave_type_id: Set(request.leave_type_id.into_inner()),
            leave_start: Set(request.leave_start),
            leave_end: Set(request.leave_end),
            leave_reason: Set(request.leave_reason.clone()),
            approval_status: Set(request.approval_status.as_str().to_string()),
            date_created: Set(request.date_created),
            date_approved: Set(None),
            supervisor_notes: Set(None),
            ..Default::default()
        };
        let model = active.insert(&self.db).await.map_err(db_err)?;
        let created = model_to_request(model)?;

        info!(
            leave_request_id = ?created.leave_request_id,
            employee_id = %created.employee_id,
            leave_start = %created.leave_start,
            leave_end = %created.leave_end,
            "Leave request filed"
        );
        Ok(created)
    }

    /// Fetches a request by id.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` if it does not exist.
    pub async fn get_leave_request(&self, id: LeaveRequestId) -> Result<LeaveRequest, LeaveError> {
        debug!(leave_request_id = %id, "Loading leave request");
        let model = leave_request::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LeaveError::RequestNotFound(id))?;
        model_to_request(model)
    }

    /// Lists an employee's requests ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_leave_requests_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        debug!(%employee_id, "Listing leave requests for employee");
        leave_request::Entity::find()
            .filter(leave_request::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_asc(leave_request::Column::LeaveStart)
            .order_by_asc(leave_request::Column::LeaveRequestId)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_request)
            .collect()
    }

    /// Lists every Pending request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_pending_leave_requests(&self) -> Result<Vec<LeaveRequest>, LeaveError> {
        leave_request::Entity::find()
            .filter(leave_request::Column::ApprovalStatus.eq(ApprovalStatus::Pending.as_str()))
            .order_by_asc(leave_request::Column::DateCreated)
            .order_by_asc(leave_request::Column::LeaveRequestId)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_request)
            .collect()
    }

    /// Withdraws a Pending request.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` if it does not exist
    /// - `AlreadyDecided` if it is Approved or Rejected
    pub async fn delete_leave_request(&self, id: LeaveRequestId) -> Result<(), LeaveError> {
        with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let (_, request) = lock_request(txn, id).await?;
                if !request.is_pending() {
                    return Err(LeaveError::AlreadyDecided {
                        id,
                        status: request.approval_status,
                    });
                }
                leave_request::Entity::delete_by_id(id.into_inner())
                    .exec(txn)
                    .await
                    .map_err(db_err)?;
                Ok(())
            })
        })
        .await?;

        info!(leave_request_id = %id, "Leave request withdrawn");
        Ok(())
    }

    /// Stored Pending or Approved requests of the same employee whose
    /// dates intersect the candidate's, excluding the candidate itself.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_overlapping_leave_requests(
        &self,
        candidate: &LeaveRequest,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let existing = load_date_holders(&self.db, candidate).await?;
        let overlapping: Vec<LeaveRequest> = overlapping_requests(candidate, &existing)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            employee_id = %candidate.employee_id,
            overlapping = overlapping.len(),
            "Checked leave overlaps"
        );
        Ok(overlapping)
    }

    /// True if the candidate collides with an Approved request.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn has_conflict_with_approved_leaves(
        &self,
        candidate: &LeaveRequest,
    ) -> Result<bool, LeaveError> {
        let existing = load_date_holders(&self.db, candidate).await?;
        Ok(has_conflict_with_approved(candidate, &existing))
    }

    /// Approves a Pending request.
    ///
    /// Locks every request of the employee, refuses the candidate when it
    /// collides with already-approved leave, records the decision and an
    /// audit row, all in one transaction. Concurrent approvals for one
    /// employee serialise on those locks.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` if it does not exist
    /// - `AlreadyDecided` if it is not Pending
    /// - `OverlapsApprovedLeave` if approved leave of the same employee
    ///   shares a day with it
    pub async fn approve_leave_request(
        &self,
        id: LeaveRequestId,
        approver_id: ApproverId,
        notes: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let now = self.clock.now();

        let approved = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let (model, mut request, others) = lock_for_approval(txn, id).await?;

                let conflicting = approved_conflicts(&request, &others);
                if !conflicting.is_empty() {
                    return Err(LeaveError::OverlapsApprovedLeave { conflicting });
                }

                let decision = request.approve(approver_id, notes, now)?;
                persist_decision(txn, model, &decision).await?;
                record_decision(txn, id, &decision).await;
                Ok(request)
            })
        })
        .await?;

        info!(
            leave_request_id = %id,
            approver_id = %approver_id,
            "Leave request approved"
        );
        Ok(approved)
    }

    /// Rejects a Pending request. Notes are mandatory.
    ///
    /// # Errors
    ///
    /// - `RejectionNotesRequired` for blank notes (no I/O)
    /// - `RequestNotFound` if it does not exist
    /// - `AlreadyDecided` if it is not Pending
    pub async fn reject_leave_request(
        &self,
        id: LeaveRequestId,
        approver_id: ApproverId,
        notes: String,
    ) -> Result<LeaveRequest, LeaveError> {
        if notes.trim().is_empty() {
            return Err(LeaveError::RejectionNotesRequired);
        }
        let now = self.clock.now();

        let rejected = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let (model, mut request) = lock_pending(txn, id).await?;
                let decision = request.reject(approver_id, notes, now)?;
                persist_decision(txn, model, &decision).await?;
                record_decision(txn, id, &decision).await;
                Ok(request)
            })
        })
        .await?;

        info!(
            leave_request_id = %id,
            approver_id = %approver_id,
            "Leave request rejected"
        );
        Ok(rejected)
    }

    /// Audit rows for a request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error, including when the audit table is absent.
    pub async fn get_approval_history(
        &self,
        id: LeaveRequestId,
    ) -> Result<Vec<leave_approval_log::Model>, LeaveError> {
        leave_approval_log::Entity::find()
            .filter(leave_approval_log::Column::LeaveRequestId.eq(id.into_inner()))
            .order_by_asc(leave_approval_log::Column::ActionDate)
            .order_by_asc(leave_approval_log::Column::LogId)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Converts a stored row into the domain model.
///
/// # Errors
///
/// Returns `Database` when the stored status is not a known value.
pub(crate) fn model_to_request(model: leave_request::Model) -> Result<LeaveRequest, LeaveError> {
    let approval_status = ApprovalStatus::parse(&model.approval_status).ok_or_else(|| {
        LeaveError::Database(format!(
            "leave request {} has unknown approval status {:?}",
            model.leave_request_id, model.approval_status
        ))
    })?;

    Ok(LeaveRequest {
        leave_request_id: Some(LeaveRequestId(model.leave_request_id)),
        employee_id: EmployeeId(model.employee_id),
        leave_type_id: LeaveTypeId(model.leave_type_id),
        leave_start: model.leave_start,
        leave_end: model.leave_end,
        leave_reason: model.leave_reason,
        approval_status,
        date_created: model.date_created,
        date_approved: model.date_approved,
        supervisor_notes: model.supervisor_notes,
    })
}

/// Pending and Approved requests of the candidate's employee whose dates
/// may intersect it. The overlap checker makes the final call.
async fn load_date_holders(
    conn: &impl ConnectionTrait,
    candidate: &LeaveRequest,
) -> Result<Vec<LeaveRequest>, LeaveError> {
    leave_request::Entity::find()
        .filter(leave_request::Column::EmployeeId.eq(candidate.employee_id.into_inner()))
        .filter(leave_request::Column::ApprovalStatus.is_in([
            ApprovalStatus::Pending.as_str(),
            ApprovalStatus::Approved.as_str(),
        ]))
        .filter(leave_request::Column::LeaveStart.lte(candidate.leave_end))
        .filter(leave_request::Column::LeaveEnd.gte(candidate.leave_start))
        .order_by_asc(leave_request::Column::LeaveStart)
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(model_to_request)
        .collect()
}

async fn lock_request(
    txn: &DatabaseTransaction,
    id: LeaveRequestId,
) -> Result<(leave_request::Model, LeaveRequest), LeaveError> {
    let model = for_update(leave_request::Entity::find_by_id(id.into_inner()), txn)
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(LeaveError::RequestNotFound(id))?;
    let request = model_to_request(model.clone())?;
    Ok((model, request))
}

async fn lock_pending(
    txn: &DatabaseTransaction,
    id: LeaveRequestId,
) -> Result<(leave_request::Model, LeaveRequest), LeaveError> {
    let (model, request) = lock_request(txn, id).await?;
    ensure_pending(id, &request)?;
    Ok((model, request))
}

fn ensure_pending(id: LeaveRequestId, request: &LeaveRequest) -> Result<(), LeaveError> {
    if request.is_pending() {
        Ok(())
    } else {
        Err(LeaveError::AlreadyDecided {
            id,
            status: request.approval_status,
        })
    }
}

/// Locks all requests of the candidate's employee in id order and splits
/// out the Pending candidate.
///
/// Rows are re-read under the lock, so an approval committed by another
/// transaction in the meantime is seen as Approved here.
async fn lock_for_approval(
    txn: &DatabaseTransaction,
    id: LeaveRequestId,
) -> Result<(leave_request::Model, LeaveRequest, Vec<LeaveRequest>), LeaveError> {
    let employee_id = leave_request::Entity::find_by_id(id.into_inner())
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(LeaveError::RequestNotFound(id))?
        .employee_id;

    let locked = for_update(
        leave_request::Entity::find()
            .filter(leave_request::Column::EmployeeId.eq(employee_id))
            .order_by_asc(leave_request::Column::LeaveRequestId),
        txn,
    )
    .all(txn)
    .await
    .map_err(db_err)?;

    let mut candidate = None;
    let mut others = Vec::with_capacity(locked.len());
    for model in locked {
        if model.leave_request_id == id.into_inner() {
            candidate = Some(model);
        } else {
            others.push(model_to_request(model)?);
        }
    }

    let model = candidate.ok_or(LeaveError::RequestNotFound(id))?;
    let request = model_to_request(model.clone())?;
    ensure_pending(id, &request)?;
    Ok((model, request, others))
}

async fn persist_decision(
    txn: &DatabaseTransaction,
    model: leave_request::Model,
    decision: &LeaveDecision,
) -> Result<(), LeaveError> {
    let mut active: leave_request::ActiveModel = model.into();
    active.approval_status = Set(decision.new_status().as_str().to_string());
    active.date_approved = Set(Some(decision.decided_at()));
    active.supervisor_notes = Set(decision.notes().map(str::to_owned));
    active.update(txn).await.map_err(db_err)?;
    Ok(())
}

/// Writes the audit row in a savepoint. Failure is logged and ignored.
async fn record_decision(txn: &DatabaseTransaction, id: LeaveRequestId, decision: &LeaveDecision) {
    let entry = audit_entry(id, decision);
    let result = with_savepoint(txn, move |savepoint| {
        Box::pin(async move {
            entry
                .insert(savepoint)
                .await
                .map_err(|err| LeaveError::Database(err.to_string()))
        })
    })
    .await;

    if let Err(err) = result {
        warn!(
            leave_request_id = %id,
            action = decision.action(),
            error = %err,
            "Could not write leave approval log, decision kept"
        );
    }
}

fn audit_entry(id: LeaveRequestId, decision: &LeaveDecision) -> leave_approval_log::ActiveModel {
    leave_approval_log::ActiveModel {
        leave_request_id: Set(id.into_inner()),
        approver_id: Set(decision.decided_by().into_inner()),
        action: Set(decision.action().to_string()),
        notes: Set(decision.notes().map(str::to_owned)),
        action_date: Set(decision.decided_at()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn model(status: &str) -> leave_request::Model {
        leave_request::Model {
            leave_request_id: 11,
            employee_id: 1,
            leave_type_id: 2,
            leave_start: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            leave_end: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            leave_reason: Some("family trip".into()),
            approval_status: status.into(),
            date_created: None,
            date_approved: None,
            supervisor_notes: None,
        }
    }

    #[test]
    fn test_model_conversion_parses_status() {
        let request = model_to_request(model("Approved")).unwrap();
        assert_eq!(request.approval_status, ApprovalStatus::Approved);
        assert_eq!(request.leave_request_id, Some(LeaveRequestId(11)));
        assert_eq!(request.duration_days(), 6);
    }

    #[test]
    fn test_unknown_status_is_storage_error() {
        let err = model_to_request(model("Cancelled")).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_audit_entry_carries_decision() {
        let at = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 6, 9, 30, 0)
            .unwrap();
        let decision = hris_core::leave::LeaveWorkflow::reject(
            ApprovalStatus::Pending,
            ApproverId(5),
            "short staffed".into(),
            at,
        )
        .unwrap();

        let entry = audit_entry(LeaveRequestId(11), &decision);
        assert_eq!(entry.leave_request_id, Set(11));
        assert_eq!(entry.approver_id, Set(5));
        assert_eq!(entry.action, Set("REJECTED".to_string()));
        assert_eq!(entry.notes, Set(Some("short staffed".to_string())));
        assert_eq!(entry.action_date, Set(at));
        assert!(entry.log_id.is_not_set());
    }
}
