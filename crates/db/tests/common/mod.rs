//! Shared setup for repository integration tests.
//!
//! Each test gets its own in-memory SQLite database migrated with the real
//! `Migrator`. The pool holds a single connection so every query sees the
//! same in-memory database.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use hris_db::entities::{leave_balance, leave_request};
use hris_db::migration::{Migrator, MigratorTrait};
use hris_shared::config::DatabaseConfig;
use hris_shared::types::LeaveRequestId;
use hris_shared::{Clock, FixedClock};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

async fn connect() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    hris_db::connect(&config)
        .await
        .expect("Failed to open in-memory database")
}

/// Fresh database with every migration applied.
pub async fn setup() -> DatabaseConnection {
    let db = connect().await;
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// Fresh database without the `leave_approval_log` table.
pub async fn setup_without_audit_log() -> DatabaseConnection {
    let db = connect().await;
    Migrator::up(&db, Some(1)).await.expect("Failed to migrate");
    db
}

/// Clock frozen at 2025-01-06 09:00 in Manila.
pub fn clock() -> Arc<dyn Clock> {
    Arc::new(
        FixedClock::at_local(chrono_tz::Asia::Manila, 2025, 1, 6, 9, 0)
            .expect("Valid Manila wall time"),
    )
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("Valid date")
}

/// Inserts a balance row directly, bypassing conflict resolution.
pub async fn insert_raw_balance(
    db: &DatabaseConnection,
    employee_id: i32,
    leave_type_id: i32,
    year: i32,
    total: i32,
    used: i32,
) -> i32 {
    leave_balance::ActiveModel {
        employee_id: Set(employee_id),
        leave_type_id: Set(leave_type_id),
        total_leave_days: Set(total),
        used_leave_days: Set(used),
        remaining_leave_days: Set(total - used),
        carry_over_days: Set(0),
        balance_year: Set(year),
        last_updated: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert balance row")
    .leave_balance_id
}

/// Inserts a request row with an arbitrary status.
pub async fn insert_raw_request(
    db: &DatabaseConnection,
    employee_id: i32,
    start: NaiveDate,
    end: NaiveDate,
    status: &str,
) -> LeaveRequestId {
    let model = leave_request::ActiveModel {
        employee_id: Set(employee_id),
        leave_type_id: Set(2),
        leave_start: Set(start),
        leave_end: Set(end),
        leave_reason: Set(None),
        approval_status: Set(status.to_string()),
        date_created: Set(Some(clock().now())),
        date_approved: Set(None),
        supervisor_notes: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert request row");
    LeaveRequestId(model.leave_request_id)
}
