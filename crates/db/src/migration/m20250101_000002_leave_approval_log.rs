//! Audit log of leave approval decisions.
//!
//! Optional at runtime: approvals still commit when this table is absent.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_leave_tables::LeaveRequest;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaveApprovalLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaveApprovalLog::LogId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaveApprovalLog::LeaveRequestId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeaveApprovalLog::ApproverId).integer().not_null())
                    .col(ColumnDef::new(LeaveApprovalLog::Action).string_len(20).not_null())
                    .col(ColumnDef::new(LeaveApprovalLog::Notes).text())
                    .col(
                        ColumnDef::new(LeaveApprovalLog::ActionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_approval_log_request")
                            .from(LeaveApprovalLog::Table, LeaveApprovalLog::LeaveRequestId)
                            .to(LeaveRequest::Table, LeaveRequest::LeaveRequestId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leave_approval_log_request")
                    .table(LeaveApprovalLog::Table)
                    .col(LeaveApprovalLog::LeaveRequestId)
                    .col(LeaveApprovalLog::ActionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(LeaveApprovalLog::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum LeaveApprovalLog {
    #[sea_orm(iden = "leave_approval_log")]
    Table,
    #[sea_orm(iden = "logId")]
    LogId,
    #[sea_orm(iden = "leaveRequestId")]
    LeaveRequestId,
    #[sea_orm(iden = "approverId")]
    ApproverId,
    Action,
    Notes,
    #[sea_orm(iden = "actionDate")]
    ActionDate,
}
