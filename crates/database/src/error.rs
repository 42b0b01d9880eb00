//! Database error types.

use narinyland_core::LedgerError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Coupon was redeemed before
    #[error("coupon already redeemed: {id}")]
    AlreadyRedeemed { id: String },

    /// Points ledger rejected the operation
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Input failed validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Stored value could not be decoded
    #[error("corrupt {entity} row: {detail}")]
    Corrupt { entity: &'static str, detail: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
