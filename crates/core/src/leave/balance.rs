//! Leave balance record and its arithmetic.
//!
//! A balance is the entitlement of one employee for one leave type in one
//! calendar year. `remaining_leave_days` is derived, never authoritative:
//!
//! `remaining = total + carry_over - used`
//!
//! Two reconciliation policies exist for balances sharing a key:
//! - [`LeaveBalance::merge_with`] is additive and folds true duplicate rows
//!   found in storage (partial accrual batches).
//! - [`LeaveBalance::resolve_conflict`] is an overlay: the incoming record's
//!   non-zero fields replace the canonical row's values.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use hris_shared::types::{EmployeeId, LeaveBalanceId, LeaveTypeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::leave::error::LeaveError;

/// Upper bound for any single day count on a balance.
pub const MAX_LEAVE_DAYS: i32 = 10_000;

/// Logical key of a balance row: one per employee, leave type and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type_id: LeaveTypeId,
    /// Calendar year the entitlement applies to.
    pub balance_year: i32,
}

impl BalanceKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(employee_id: EmployeeId, leave_type_id: LeaveTypeId, balance_year: i32) -> Self {
        Self {
            employee_id,
            leave_type_id,
            balance_year,
        }
    }

    /// The same employee and leave type one year later.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the year cannot be advanced.
    pub fn next_year(self) -> Result<Self, LeaveError> {
        let balance_year = self.balance_year.checked_add(1).ok_or_else(|| {
            LeaveError::Validation(format!("balance year {} has no successor", self.balance_year))
        })?;
        Ok(Self {
            balance_year,
            ..self
        })
    }

    /// Builds the `BalanceNotFound` error for this key.
    #[must_use]
    pub fn not_found(self) -> LeaveError {
        LeaveError::BalanceNotFound {
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            year: self.balance_year,
        }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(employee {}, leave type {}, year {})",
            self.employee_id, self.leave_type_id, self.balance_year
        )
    }
}

/// Leave balance of one employee, leave type and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Surrogate key, `None` until persisted.
    pub leave_balance_id: Option<LeaveBalanceId>,
    /// Employee.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type_id: LeaveTypeId,
    /// Days granted for the year.
    pub total_leave_days: i32,
    /// Days consumed by approved leave.
    pub used_leave_days: i32,
    /// Derived: total + carry-over - used.
    pub remaining_leave_days: i32,
    /// Unused days brought forward from the previous year.
    pub carry_over_days: i32,
    /// Calendar year.
    pub balance_year: i32,
    /// Last mutation, in the configured civil timezone.
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl LeaveBalance {
    /// Creates an unpersisted balance with nothing used and nothing carried over.
    #[must_use]
    pub fn new(
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        balance_year: i32,
        total_leave_days: i32,
    ) -> Self {
        let mut balance = Self {
            leave_balance_id: None,
            employee_id,
            leave_type_id,
            total_leave_days,
            used_leave_days: 0,
            remaining_leave_days: 0,
            carry_over_days: 0,
            balance_year,
            last_updated: None,
        };
        balance.calculate_remaining_days();
        balance
    }

    /// Sets used days and recomputes remaining.
    #[must_use]
    pub fn with_used(mut self, used_leave_days: i32) -> Self {
        self.used_leave_days = used_leave_days;
        self.calculate_remaining_days();
        self
    }

    /// Sets carry-over days and recomputes remaining.
    #[must_use]
    pub fn with_carry_over(mut self, carry_over_days: i32) -> Self {
        self.carry_over_days = carry_over_days;
        self.calculate_remaining_days();
        self
    }

    /// The logical key of this balance.
    #[must_use]
    pub const fn key(&self) -> BalanceKey {
        BalanceKey::new(self.employee_id, self.leave_type_id, self.balance_year)
    }

    /// Total entitlement: granted plus carried over.
    #[must_use]
    pub const fn available_days(&self) -> i32 {
        self.total_leave_days.saturating_add(self.carry_over_days)
    }

    /// Recomputes the derived remaining days.
    ///
    /// Must run after every load and every change to total, used or carry-over.
    pub fn calculate_remaining_days(&mut self) {
        self.remaining_leave_days = self.available_days().saturating_sub(self.used_leave_days);
    }

    /// True iff `days` is positive and fits in the remaining days.
    #[must_use]
    pub const fn can_take_leave(&self, days: i32) -> bool {
        days > 0 && days <= self.remaining_leave_days
    }

    /// Consumes `days` of leave.
    ///
    /// On error nothing is mutated.
    ///
    /// # Errors
    ///
    /// - `InvalidDays` if `days <= 0`
    /// - `InsufficientBalance` if `days` exceeds the remaining days
    pub fn deduct_leave(&mut self, days: i32) -> Result<(), LeaveError> {
        if days <= 0 {
            return Err(LeaveError::InvalidDays(days));
        }
        if !self.can_take_leave(days) {
            return Err(LeaveError::InsufficientBalance {
                requested: days,
                remaining: self.remaining_leave_days,
            });
        }
        self.used_leave_days = self.used_leave_days.saturating_add(days);
        self.calculate_remaining_days();
        Ok(())
    }

    /// Gives back `days` of leave, e.g. after a cancellation.
    ///
    /// Used days are clamped at zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDays` if `days <= 0`; nothing is mutated.
    pub fn add_leave(&mut self, days: i32) -> Result<(), LeaveError> {
        if days <= 0 {
            return Err(LeaveError::InvalidDays(days));
        }
        self.used_leave_days = self.used_leave_days.saturating_sub(days).max(0);
        self.calculate_remaining_days();
        Ok(())
    }

    /// Used days as a percentage of the total entitlement, two decimals.
    ///
    /// Zero when the entitlement is zero.
    #[must_use]
    pub fn utilization_rate(&self) -> Decimal {
        let available = self.available_days();
        if available <= 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.used_leave_days) * Decimal::ONE_HUNDRED / Decimal::from(available))
            .round_dp(2)
    }

    /// True if all day counts are non-negative and used fits the entitlement.
    #[must_use]
    pub fn is_valid_balance(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks the balance invariants.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::Validation` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), LeaveError> {
        if self.balance_year <= 0 {
            return Err(LeaveError::Validation(format!(
                "balance year must be positive, got {}",
                self.balance_year
            )));
        }
        if self.total_leave_days < 0 || self.used_leave_days < 0 || self.carry_over_days < 0 {
            return Err(LeaveError::Validation(format!(
                "leave days must not be negative (total {}, used {}, carry-over {})",
                self.total_leave_days, self.used_leave_days, self.carry_over_days
            )));
        }
        if self.total_leave_days > MAX_LEAVE_DAYS
            || self.used_leave_days > MAX_LEAVE_DAYS
            || self.carry_over_days > MAX_LEAVE_DAYS
        {
            return Err(LeaveError::Validation(format!(
                "leave days must not exceed {MAX_LEAVE_DAYS} (total {}, used {}, carry-over {})",
                self.total_leave_days, self.used_leave_days, self.carry_over_days
            )));
        }
        if self.used_leave_days > self.available_days() {
            return Err(LeaveError::Validation(format!(
                "used days {} exceed total {} plus carry-over {}",
                self.used_leave_days, self.total_leave_days, self.carry_over_days
            )));
        }
        Ok(())
    }

    /// Sums two balances of the same key into a new one.
    ///
    /// Total, used and carry-over are added; identity and timestamp come
    /// from `self`. Duplicates are partial accrual batches, so the
    /// reduction is order-independent.
    ///
    /// # Errors
    ///
    /// Returns `KeyMismatch` if the keys differ, or `Validation` if a sum
    /// does not fit in a day count.
    pub fn merge_with(&self, other: &Self) -> Result<Self, LeaveError> {
        self.ensure_same_key(other)?;
        let mut merged = Self {
            total_leave_days: sum_days(self.total_leave_days, other.total_leave_days)?,
            used_leave_days: sum_days(self.used_leave_days, other.used_leave_days)?,
            carry_over_days: sum_days(self.carry_over_days, other.carry_over_days)?,
            ..self.clone()
        };
        merged.calculate_remaining_days();
        Ok(merged)
    }

    /// Overlays an incoming correction onto this canonical balance.
    ///
    /// Each of the incoming total, used and carry-over replaces the
    /// canonical value when it is non-zero. Identity stays with `self`.
    ///
    /// # Errors
    ///
    /// Returns `KeyMismatch` if the keys differ.
    pub fn resolve_conflict(&self, incoming: &Self) -> Result<Self, LeaveError> {
        self.ensure_same_key(incoming)?;
        let overlay = |current: i32, new: i32| if new == 0 { current } else { new };
        let mut resolved = Self {
            total_leave_days: overlay(self.total_leave_days, incoming.total_leave_days),
            used_leave_days: overlay(self.used_leave_days, incoming.used_leave_days),
            carry_over_days: overlay(self.carry_over_days, incoming.carry_over_days),
            last_updated: incoming.last_updated.or(self.last_updated),
            ..self.clone()
        };
        resolved.calculate_remaining_days();
        Ok(resolved)
    }

    fn ensure_same_key(&self, other: &Self) -> Result<(), LeaveError> {
        if self.key() == other.key() {
            Ok(())
        } else {
            Err(LeaveError::KeyMismatch {
                left: self.key(),
                right: other.key(),
            })
        }
    }
}

fn sum_days(a: i32, b: i32) -> Result<i32, LeaveError> {
    a.checked_add(b)
        .ok_or_else(|| LeaveError::Validation(format!("day count overflow adding {a} and {b}")))
}

/// Folds duplicate rows into the canonical row with repeated `merge_with`.
///
/// # Errors
///
/// Returns `KeyMismatch` if any duplicate has a different key.
pub fn merge_duplicates(
    canonical: &LeaveBalance,
    duplicates: &[LeaveBalance],
) -> Result<LeaveBalance, LeaveError> {
    duplicates
        .iter()
        .try_fold(canonical.clone(), |acc, duplicate| acc.merge_with(duplicate))
}
