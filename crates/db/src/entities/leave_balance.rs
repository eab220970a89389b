//! `SeaORM` Entity for the leavebalance table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leavebalance")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "leaveBalanceId")]
    pub leave_balance_id: i32,
    #[sea_orm(column_name = "employeeId")]
    pub employee_id: i32,
    #[sea_orm(column_name = "leaveTypeId")]
    pub leave_type_id: i32,
    #[sea_orm(column_name = "totalLeaveDays")]
    pub total_leave_days: i32,
    #[sea_orm(column_name = "usedLeaveDays")]
    pub used_leave_days: i32,
    #[sea_orm(column_name = "remainingLeaveDays")]
    pub remaining_leave_days: i32,
    #[sea_orm(column_name = "carryOverDays")]
    pub carry_over_days: i32,
    #[sea_orm(column_name = "balanceYear")]
    pub balance_year: i32,
    #[sea_orm(column_name = "lastUpdated")]
    pub last_updated: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
