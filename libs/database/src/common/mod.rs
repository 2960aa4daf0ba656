//! Pieces shared by every backend

pub mod error;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult, HealthStatus};
pub use retry::{RetryConfig, retry_with_backoff};
