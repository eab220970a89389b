//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and written with the
//! schema builder so the same steps run on Postgres and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_leave_tables;
mod m20250101_000002_leave_approval_log;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_leave_tables::Migration),
            Box::new(m20250101_000002_leave_approval_log::Migration),
        ]
    }
}
