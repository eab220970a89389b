//! Leave balance repository.
//!
//! Owns the `leavebalance` table. Rows sharing one
//! `(employeeId, leaveTypeId, balanceYear)` key are tolerated on read and
//! folded into the lowest-id row by every write path, inside the same
//! transaction as the write itself.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use hris_core::leave::{BalanceKey, LeaveBalance, LeaveError, merge_duplicates};
use hris_shared::Clock;
use hris_shared::types::{EmployeeId, LeaveBalanceId, LeaveTypeId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, NotSet, QueryFilter, QueryOrder, Select, Set,
};
use tracing::{debug, info, warn};

use crate::entities::leave_balance;
use crate::txn::{db_err, for_update, with_transaction};

/// Leave balance repository.
#[derive(Debug, Clone)]
pub struct LeaveBalanceRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl LeaveBalanceRepository {
    /// Creates a new leave balance repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Creates the balance for its key, or reconciles it with the stored one.
    ///
    /// - No row for the key: inserted.
    /// - One row: the input is overlaid with `resolve_conflict`.
    /// - Several rows: duplicates are summed into the lowest-id row and
    ///   deleted, then the input is overlaid.
    ///
    /// All of it commits or rolls back together.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any I/O if the balance is invalid, or a
    /// storage error (nothing is changed).
    pub async fn create_leave_balance(
        &self,
        balance: &LeaveBalance,
    ) -> Result<LeaveBalance, LeaveError> {
        balance.validate()?;

        let now = self.clock.now();
        let incoming = balance.clone();
        let key = incoming.key();

        let stored = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                match lock_canonical(txn, key, now).await? {
                    None => insert_balance(txn, &incoming, now).await,
                    Some(existing) => {
                        let resolved = existing.resolve_conflict(&incoming)?;
                        resolved.validate()?;
                        update_balance(txn, &resolved, now).await
                    }
                }
            })
        })
        .await?;

        info!(
            employee_id = %key.employee_id,
            leave_type_id = %key.leave_type_id,
            year = key.balance_year,
            leave_balance_id = ?stored.leave_balance_id,
            "Leave balance stored"
        );
        Ok(stored)
    }

    /// Fetches the balance for a key.
    ///
    /// Duplicate rows are summed into the returned view without being
    /// rewritten.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if no row exists.
    pub async fn get_leave_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        year: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        let key = BalanceKey::new(employee_id, leave_type_id, year);
        debug!(%employee_id, %leave_type_id, year, "Loading leave balance");

        let rows = find_by_key(key).all(&self.db).await.map_err(db_err)?;
        let mut balances = rows.into_iter().map(model_to_balance);
        let canonical = balances.next().ok_or_else(|| key.not_found())?;
        let duplicates: Vec<LeaveBalance> = balances.collect();
        merge_duplicates(&canonical, &duplicates)
    }

    /// Lists an employee's balances for one year, ordered by leave type.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_leave_balances_by_employee(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        debug!(%employee_id, year, "Listing leave balances for employee");

        let rows = leave_balance::Entity::find()
            .filter(leave_balance::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(leave_balance::Column::BalanceYear.eq(year))
            .order_by_asc(leave_balance::Column::LeaveTypeId)
            .order_by_asc(leave_balance::Column::LeaveBalanceId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        fold_by_key(rows.into_iter().map(model_to_balance))
    }

    /// Lists every balance of a year, ordered by employee then leave type.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_leave_balances_by_year(
        &self,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        debug!(year, "Listing leave balances for year");

        let rows = leave_balance::Entity::find()
            .filter(leave_balance::Column::BalanceYear.eq(year))
            .order_by_asc(leave_balance::Column::EmployeeId)
            .order_by_asc(leave_balance::Column::LeaveTypeId)
            .order_by_asc(leave_balance::Column::LeaveBalanceId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        fold_by_key(rows.into_iter().map(model_to_balance))
    }

    /// Overwrites total, used and carry-over days of an existing row.
    ///
    /// The stored key is kept; remaining days are recomputed.
    ///
    /// # Errors
    ///
    /// - `Validation` if the balance has no id or is invalid
    /// - `BalanceIdNotFound` if the row does not exist
    pub async fn update_leave_balance(
        &self,
        balance: &LeaveBalance,
    ) -> Result<LeaveBalance, LeaveError> {
        let id = balance
            .leave_balance_id
            .ok_or_else(|| LeaveError::Validation("leave balance has no id".to_string()))?;
        balance.validate()?;

        let now = self.clock.now();
        let total = balance.total_leave_days;
        let used = balance.used_leave_days;
        let carry_over = balance.carry_over_days;

        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let model = for_update(leave_balance::Entity::find_by_id(id.into_inner()), txn)
                    .one(txn)
                    .await
                    .map_err(db_err)?
                    .ok_or(LeaveError::BalanceIdNotFound(id))?;

                let mut current = model_to_balance(model);
                current.total_leave_days = total;
                current.used_leave_days = used;
                current.carry_over_days = carry_over;
                current.calculate_remaining_days();
                update_balance(txn, &current, now).await
            })
        })
        .await?;

        info!(leave_balance_id = %id, "Leave balance updated");
        Ok(updated)
    }

    /// Deletes a balance row.
    ///
    /// # Errors
    ///
    /// Returns `BalanceIdNotFound` if nothing was deleted.
    pub async fn delete_leave_balance(&self, id: LeaveBalanceId) -> Result<(), LeaveError> {
        let result = leave_balance::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(LeaveError::BalanceIdNotFound(id));
        }

        info!(leave_balance_id = %id, "Leave balance deleted");
        Ok(())
    }

    /// Consumes `days` of leave, checking and writing in one transaction.
    ///
    /// # Errors
    ///
    /// - `InvalidDays` if `days <= 0` (no I/O)
    /// - `BalanceNotFound` if no row exists
    /// - `InsufficientBalance` if `days` exceeds the remaining days
    ///
    /// The transaction is rolled back on every error.
    pub async fn deduct_leave_from_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        year: i32,
        days: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        if days <= 0 {
            return Err(LeaveError::InvalidDays(days));
        }

        let now = self.clock.now();
        let key = BalanceKey::new(employee_id, leave_type_id, year);

        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let mut balance = lock_canonical(txn, key, now)
                    .await?
                    .ok_or_else(|| key.not_found())?;
                balance.deduct_leave(days)?;
                update_balance(txn, &balance, now).await
            })
        })
        .await?;

        info!(
            %employee_id,
            %leave_type_id,
            year,
            days,
            remaining = updated.remaining_leave_days,
            "Leave deducted"
        );
        Ok(updated)
    }

    /// Gives back `days` of leave after a cancellation.
    ///
    /// Used days never drop below zero.
    ///
    /// # Errors
    ///
    /// - `InvalidDays` if `days <= 0` (no I/O)
    /// - `BalanceNotFound` if no row exists
    pub async fn add_leave_to_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        year: i32,
        days: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        if days <= 0 {
            return Err(LeaveError::InvalidDays(days));
        }

        let now = self.clock.now();
        let key = BalanceKey::new(employee_id, leave_type_id, year);

        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let mut balance = lock_canonical(txn, key, now)
                    .await?
                    .ok_or_else(|| key.not_found())?;
                balance.add_leave(days)?;
                update_balance(txn, &balance, now).await
            })
        })
        .await?;

        info!(
            %employee_id,
            %leave_type_id,
            year,
            days,
            remaining = updated.remaining_leave_days,
            "Leave restored"
        );
        Ok(updated)
    }

    /// True if `days` fit in the remaining days right now.
    ///
    /// Not atomic with a later deduction; use
    /// [`Self::deduct_leave_from_balance`] for that.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if no row exists.
    pub async fn has_sufficient_leave_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        year: i32,
        days: i32,
    ) -> Result<bool, LeaveError> {
        let balance = self
            .get_leave_balance(employee_id, leave_type_id, year)
            .await?;
        Ok(balance.can_take_leave(days))
    }

    /// Carries unused days of `year` into the next year's balance.
    ///
    /// Transfers `min(remaining, max_carry_over)` (never negative) into the
    /// `year + 1` row's carry-over, creating that row with zero granted
    /// days when absent. Re-running replaces the carried amount.
    ///
    /// # Errors
    ///
    /// - `Validation` if `max_carry_over` is negative
    /// - `BalanceNotFound` if `year` has no balance
    /// - `Validation` if the next year already uses more than the result allows
    pub async fn carry_over_to_next_year(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        year: i32,
        max_carry_over: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        if max_carry_over < 0 {
            return Err(LeaveError::Validation(format!(
                "max carry-over must not be negative, got {max_carry_over}"
            )));
        }

        let now = self.clock.now();
        let key = BalanceKey::new(employee_id, leave_type_id, year);

        let next = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let source = lock_canonical(txn, key, now)
                    .await?
                    .ok_or_else(|| key.not_found())?;
                let carried = source.remaining_leave_days.clamp(0, max_carry_over);

                let next_key = key.next_year()?;
                match lock_canonical(txn, next_key, now).await? {
                    None => {
                        let fresh = LeaveBalance::new(
                            next_key.employee_id,
                            next_key.leave_type_id,
                            next_key.balance_year,
                            0,
                        )
                        .with_carry_over(carried);
                        fresh.validate()?;
                        insert_balance(txn, &fresh, now).await
                    }
                    Some(mut target) => {
                        target.carry_over_days = carried;
                        target.calculate_remaining_days();
                        target.validate()?;
                        update_balance(txn, &target, now).await
                    }
                }
            })
        })
        .await?;

        info!(
            %employee_id,
            %leave_type_id,
            from_year = year,
            carried = next.carry_over_days,
            "Leave carried over"
        );
        Ok(next)
    }
}

/// Converts a stored row, recomputing the derived remaining days.
pub(crate) fn model_to_balance(model: leave_balance::Model) -> LeaveBalance {
    let mut balance = LeaveBalance {
        leave_balance_id: Some(LeaveBalanceId(model.leave_balance_id)),
        employee_id: EmployeeId(model.employee_id),
        leave_type_id: LeaveTypeId(model.leave_type_id),
        total_leave_days: model.total_leave_days,
        used_leave_days: model.used_leave_days,
        remaining_leave_days: model.remaining_leave_days,
        carry_over_days: model.carry_over_days,
        balance_year: model.balance_year,
        last_updated: model.last_updated,
    };
    balance.calculate_remaining_days();
    balance
}

fn find_by_key(key: BalanceKey) -> Select<leave_balance::Entity> {
    leave_balance::Entity::find()
        .filter(leave_balance::Column::EmployeeId.eq(key.employee_id.into_inner()))
        .filter(leave_balance::Column::LeaveTypeId.eq(key.leave_type_id.into_inner()))
        .filter(leave_balance::Column::BalanceYear.eq(key.balance_year))
        .order_by_asc(leave_balance::Column::LeaveBalanceId)
}

/// Sums consecutive rows sharing a key. Input must be ordered by key.
fn fold_by_key(
    balances: impl IntoIterator<Item = LeaveBalance>,
) -> Result<Vec<LeaveBalance>, LeaveError> {
    let mut folded: Vec<LeaveBalance> = Vec::new();
    for balance in balances {
        match folded.last_mut() {
            Some(last) if last.key() == balance.key() => *last = last.merge_with(&balance)?,
            _ => folded.push(balance),
        }
    }
    Ok(folded)
}

/// Locks every row of `key` and folds duplicates into the lowest-id row.
///
/// Duplicate rows are deleted and the merged sum is written to the
/// canonical row before it is returned, all inside `txn`.
async fn lock_canonical(
    txn: &DatabaseTransaction,
    key: BalanceKey,
    now: DateTime<FixedOffset>,
) -> Result<Option<LeaveBalance>, LeaveError> {
    let rows = for_update(find_by_key(key), txn)
        .all(txn)
        .await
        .map_err(db_err)?;

    let mut balances = rows.into_iter().map(model_to_balance);
    let Some(canonical) = balances.next() else {
        return Ok(None);
    };
    let duplicates: Vec<LeaveBalance> = balances.collect();
    if duplicates.is_empty() {
        return Ok(Some(canonical));
    }

    warn!(
        %key,
        duplicates = duplicates.len(),
        "Merging duplicate leave balance rows"
    );
    let merged = merge_duplicates(&canonical, &duplicates)?;

    let duplicate_ids: Vec<i32> = duplicates
        .iter()
        .filter_map(|d| d.leave_balance_id)
        .map(LeaveBalanceId::into_inner)
        .collect();
    leave_balance::Entity::delete_many()
        .filter(leave_balance::Column::LeaveBalanceId.is_in(duplicate_ids))
        .exec(txn)
        .await
        .map_err(db_err)?;

    update_balance(txn, &merged, now).await.map(Some)
}

fn to_active_model(
    balance: &LeaveBalance,
    now: DateTime<FixedOffset>,
) -> leave_balance::ActiveModel {
    leave_balance::ActiveModel {
        leave_balance_id: balance
            .leave_balance_id
            .map_or(NotSet, |id| Set(id.into_inner())),
        employee_id: Set(balance.employee_id.into_inner()),
        leave_type_id: Set(balance.leave_type_id.into_inner()),
        total_leave_days: Set(balance.total_leave_days),
        used_leave_days: Set(balance.used_leave_days),
        remaining_leave_days: Set(balance
            .available_days()
            .saturating_sub(balance.used_leave_days)),
        carry_over_days: Set(balance.carry_over_days),
        balance_year: Set(balance.balance_year),
        last_updated: Set(Some(now)),
    }
}

async fn insert_balance(
    conn: &impl ConnectionTrait,
    balance: &LeaveBalance,
    now: DateTime<FixedOffset>,
) -> Result<LeaveBalance, LeaveError> {
    let mut active = to_active_model(balance, now);
    active.leave_balance_id = NotSet;
    let model = active.insert(conn).await.map_err(db_err)?;
    Ok(model_to_balance(model))
}

async fn update_balance(
    conn: &impl ConnectionTrait,
    balance: &LeaveBalance,
    now: DateTime<FixedOffset>,
) -> Result<LeaveBalance, LeaveError> {
    if balance.leave_balance_id.is_none() {
        return Err(LeaveError::Validation(
            "cannot update a leave balance without an id".to_string(),
        ));
    }
    let model = to_active_model(balance, now)
        .update(conn)
        .await
        .map_err(db_err)?;
    Ok(model_to_balance(model))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, leave_type: i32, total: i32, used: i32) -> LeaveBalance {
        let mut balance = LeaveBalance::new(EmployeeId(1), LeaveTypeId(leave_type), 2025, total)
            .with_used(used);
        balance.leave_balance_id = Some(LeaveBalanceId(id));
        balance
    }

    #[test]
    fn test_model_conversion_recomputes_remaining() {
        let model = leave_balance::Model {
            leave_balance_id: 4,
            employee_id: 1,
            leave_type_id: 2,
            total_leave_days: 15,
            used_leave_days: 5,
            remaining_leave_days: 99,
            carry_over_days: 2,
            balance_year: 2025,
            last_updated: None,
        };
        let balance = model_to_balance(model);
        assert_eq!(balance.remaining_leave_days, 12);
        assert_eq!(balance.leave_balance_id, Some(LeaveBalanceId(4)));
    }

    #[test]
    fn test_fold_by_key_merges_adjacent_duplicates() {
        let folded = fold_by_key(vec![row(1, 2, 10, 2), row(2, 2, 5, 1), row(3, 3, 7, 0)]).unwrap();
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].total_leave_days, 15);
        assert_eq!(folded[0].used_leave_days, 3);
        assert_eq!(folded[0].leave_balance_id, Some(LeaveBalanceId(1)));
        assert_eq!(folded[1].total_leave_days, 7);
    }

    #[test]
    fn test_active_model_omits_missing_id() {
        let balance = LeaveBalance::new(EmployeeId(1), LeaveTypeId(2), 2025, 15);
        let active = to_active_model(&balance, chrono::Utc::now().fixed_offset());
        assert!(active.leave_balance_id.is_not_set());
        assert_eq!(active.remaining_leave_days, Set(15));
    }
}
