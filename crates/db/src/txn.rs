//! Scoped transactions and storage error translation.
//!
//! Every multi-step leave operation runs through [`with_transaction`]:
//! the callback's `Ok` commits, any `Err` (or a dropped future) rolls back.
//!
//! # Usage
//!
//! ```ignore
//! use hris_db::txn::with_transaction;
//!
//! let balance = with_transaction(&db, move |txn| {
//!     Box::pin(async move {
//!         let row = LeaveBalance::find_by_id(id).one(txn).await.map_err(db_err)?;
//!         // ...
//!         Ok(row)
//!     })
//! })
//! .await?;
//! ```

use std::future::Future;
use std::pin::Pin;

use hris_core::leave::LeaveError;
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, QuerySelect, TransactionError,
    TransactionTrait,
};

/// Boxed future returned by transaction callbacks.
pub type TxnFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, LeaveError>> + Send + 'c>>;

/// Translates a storage error into `LeaveError::Database`, logging it.
///
/// `DbErr` never leaves the repository layer.
pub fn db_err(err: DbErr) -> LeaveError {
    tracing::error!(error = %err, "Storage operation failed");
    LeaveError::Database(err.to_string())
}

/// Runs `callback` inside a database transaction.
///
/// Commits when the callback returns `Ok`, rolls back otherwise.
/// Failures to begin or commit surface as `LeaveError::Database`.
///
/// # Errors
///
/// Returns the callback's error unchanged, or a storage error.
pub async fn with_transaction<C, F, T>(db: &C, callback: F) -> Result<T, LeaveError>
where
    C: TransactionTrait,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send,
    T: Send,
{
    db.transaction::<F, T, LeaveError>(callback)
        .await
        .map_err(|err| match err {
            TransactionError::Connection(db) => db_err(db),
            TransactionError::Transaction(leave) => leave,
        })
}

/// Runs `callback` in a savepoint nested in `txn`.
///
/// An error rolls back to the savepoint only; the enclosing transaction
/// stays usable and the caller decides whether to continue.
///
/// # Errors
///
/// Returns the callback's error, or a storage error from the savepoint.
pub async fn with_savepoint<F, T>(txn: &DatabaseTransaction, callback: F) -> Result<T, LeaveError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send,
    T: Send,
{
    with_transaction(txn, callback).await
}

/// Adds `FOR UPDATE` to a read inside a transaction.
///
/// SQLite has no row locks and serialises writers itself, so the clause
/// is only emitted for Postgres and MySQL.
pub fn for_update<Q>(query: Q, conn: &impl ConnectionTrait) -> Q
where
    Q: QuerySelect,
{
    match conn.get_database_backend() {
        DbBackend::Sqlite => query,
        _ => query.lock_exclusive(),
    }
}
