//! `SeaORM` Entity for the leaverequest table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leaverequest")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "leaveRequestId")]
    pub leave_request_id: i32,
    #[sea_orm(column_name = "employeeId")]
    pub employee_id: i32,
    #[sea_orm(column_name = "leaveTypeId")]
    pub leave_type_id: i32,
    #[sea_orm(column_name = "leaveStart")]
    pub leave_start: Date,
    #[sea_orm(column_name = "leaveEnd")]
    pub leave_end: Date,
    #[sea_orm(column_name = "leaveReason", column_type = "Text", nullable)]
    pub leave_reason: Option<String>,
    /// One of `Pending`, `Approved`, `Rejected`.
    #[sea_orm(column_name = "approvalStatus")]
    pub approval_status: String,
    #[sea_orm(column_name = "dateCreated")]
    pub date_created: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "dateApproved")]
    pub date_approved: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "supervisorNotes", column_type = "Text", nullable)]
    pub supervisor_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leave_approval_log::Entity")]
    LeaveApprovalLog,
}

impl Related<super::leave_approval_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveApprovalLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
