//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every operation returns `Result<_, LeaveError>`; `DbErr` never escapes.

pub mod leave_balance;
pub mod leave_request;

pub use leave_balance::LeaveBalanceRepository;
pub use leave_request::LeaveRequestRepository;
