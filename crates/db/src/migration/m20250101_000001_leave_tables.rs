//! Leave balance and leave request tables.
//!
//! The balance key `(employeeId, leaveTypeId, balanceYear)` is indexed but
//! not unique: legacy imports contain duplicate rows, which the balance
//! repository folds into one canonical row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaveBalance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaveBalance::LeaveBalanceId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeaveBalance::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(LeaveBalance::LeaveTypeId).integer().not_null())
                    .col(
                        ColumnDef::new(LeaveBalance::TotalLeaveDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LeaveBalance::UsedLeaveDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LeaveBalance::RemainingLeaveDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LeaveBalance::CarryOverDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LeaveBalance::BalanceYear).integer().not_null())
                    .col(ColumnDef::new(LeaveBalance::LastUpdated).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leavebalance_key")
                    .table(LeaveBalance::Table)
                    .col(LeaveBalance::EmployeeId)
                    .col(LeaveBalance::LeaveTypeId)
                    .col(LeaveBalance::BalanceYear)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeaveRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaveRequest::LeaveRequestId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeaveRequest::EmployeeId).integer().not_null())
                    .col(ColumnDef::new(LeaveRequest::LeaveTypeId).integer().not_null())
                    .col(ColumnDef::new(LeaveRequest::LeaveStart).date().not_null())
                    .col(ColumnDef::new(LeaveRequest::LeaveEnd).date().not_null())
                    .col(ColumnDef::new(LeaveRequest::LeaveReason).text())
                    .col(
                        ColumnDef::new(LeaveRequest::ApprovalStatus)
                            .string_len(20)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(LeaveRequest::DateCreated).timestamp_with_time_zone())
                    .col(ColumnDef::new(LeaveRequest::DateApproved).timestamp_with_time_zone())
                    .col(ColumnDef::new(LeaveRequest::SupervisorNotes).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leaverequest_employee_start")
                    .table(LeaveRequest::Table)
                    .col(LeaveRequest::EmployeeId)
                    .col(LeaveRequest::LeaveStart)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaveRequest::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveBalance::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LeaveBalance {
    #[sea_orm(iden = "leavebalance")]
    Table,
    #[sea_orm(iden = "leaveBalanceId")]
    LeaveBalanceId,
    #[sea_orm(iden = "employeeId")]
    EmployeeId,
    #[sea_orm(iden = "leaveTypeId")]
    LeaveTypeId,
    #[sea_orm(iden = "totalLeaveDays")]
    TotalLeaveDays,
    #[sea_orm(iden = "usedLeaveDays")]
    UsedLeaveDays,
    #[sea_orm(iden = "remainingLeaveDays")]
    RemainingLeaveDays,
    #[sea_orm(iden = "carryOverDays")]
    CarryOverDays,
    #[sea_orm(iden = "balanceYear")]
    BalanceYear,
    #[sea_orm(iden = "lastUpdated")]
    LastUpdated,
}

#[derive(DeriveIden)]
pub(super) enum LeaveRequest {
    #[sea_orm(iden = "leaverequest")]
    Table,
    #[sea_orm(iden = "leaveRequestId")]
    LeaveRequestId,
    #[sea_orm(iden = "employeeId")]
    EmployeeId,
    #[sea_orm(iden = "leaveTypeId")]
    LeaveTypeId,
    #[sea_orm(iden = "leaveStart")]
    LeaveStart,
    #[sea_orm(iden = "leaveEnd")]
    LeaveEnd,
    #[sea_orm(iden = "leaveReason")]
    LeaveReason,
    #[sea_orm(iden = "approvalStatus")]
    ApprovalStatus,
    #[sea_orm(iden = "dateCreated")]
    DateCreated,
    #[sea_orm(iden = "dateApproved")]
    DateApproved,
    #[sea_orm(iden = "supervisorNotes")]
    SupervisorNotes,
}
