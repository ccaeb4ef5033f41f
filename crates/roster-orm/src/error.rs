//! Error types for the ORM.
//!
//! Expected absence is never an error: lookups by identifier return
//! `Option`, and single-result queries distinguish `NotFound` (zero rows)
//! from `NonUniqueResult` (more than one row). Everything else propagates.

use std::fmt;

use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// No row found where exactly one was expected.
    #[error("object not found")]
    NotFound,

    /// More than one row found where exactly one was expected.
    #[error("non-unique result: more than one row matched")]
    NonUniqueResult,

    /// A uniqueness, foreign-key, or not-null constraint was violated.
    #[error("constraint violation: {0}")]
    ConstraintViolation(ConstraintKind),

    /// A composed query could not be lowered to SQL.
    #[error("query error: {0}")]
    Query(#[from] roster_query::QueryError),
}

/// The kind of constraint that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Uniqueness constraint.
    Unique,
    /// Foreign-key constraint.
    ForeignKey,
    /// NOT NULL constraint.
    NotNull,
    /// CHECK constraint.
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique => write!(f, "unique"),
            Self::ForeignKey => write!(f, "foreign key"),
            Self::NotNull => write!(f, "not null"),
            Self::Check => write!(f, "check"),
        }
    }
}

impl From<sqlx::Error> for OrmError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            use sqlx::error::ErrorKind;
            match db.kind() {
                ErrorKind::UniqueViolation => {
                    return Self::ConstraintViolation(ConstraintKind::Unique)
                }
                ErrorKind::ForeignKeyViolation => {
                    return Self::ConstraintViolation(ConstraintKind::ForeignKey)
                }
                ErrorKind::NotNullViolation => {
                    return Self::ConstraintViolation(ConstraintKind::NotNull)
                }
                ErrorKind::CheckViolation => {
                    return Self::ConstraintViolation(ConstraintKind::Check)
                }
                _ => {}
            }
        }
        Self::Database(e)
    }
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
