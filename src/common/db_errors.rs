//! Database error categorization
//!
//! Maps raw `DbErr` values onto a small set of categories so services can turn
//! constraint failures into field errors instead of opaque database errors.

use sea_orm::{DbErr, SqlErr};

/// Categories of database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Query returned no row where one was required
    NotFound,

    /// Unique or primary key constraint violation
    UniqueViolation,

    /// Foreign key constraint violation
    ForeignKeyViolation,

    /// Could not reach or hold a connection
    ConnectionError,

    /// Anything else
    Unknown,
}

impl DbErrorKind {
    /// Categorize a sea_orm database error
    pub fn from_db_err(err: &DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return Self::UniqueViolation,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Self::ForeignKeyViolation,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::ConnectionError,
            DbErr::Exec(_) | DbErr::Query(_) => {
                let msg_lower = err.to_string().to_lowercase();
                if msg_lower.contains("unique") || msg_lower.contains("duplicate") {
                    Self::UniqueViolation
                } else if msg_lower.contains("foreign key") {
                    Self::ForeignKeyViolation
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }
}
