//! `SeaORM` Entity for the leave_approval_log audit table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_approval_log")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "logId")]
    pub log_id: i32,
    #[sea_orm(column_name = "leaveRequestId")]
    pub leave_request_id: i32,
    #[sea_orm(column_name = "approverId")]
    pub approver_id: i32,
    /// `APPROVED` or `REJECTED`.
    pub action: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_name = "actionDate")]
    pub action_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::leave_request::Entity",
        from = "Column::LeaveRequestId",
        to = "super::leave_request::Column::LeaveRequestId"
    )]
    LeaveRequest,
}

impl Related<super::leave_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
