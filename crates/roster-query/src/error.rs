//! Error type for query composition.

use thiserror::Error;

/// Error raised when a composed query cannot be lowered to SQL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The select list is empty.
    #[error("select list is empty")]
    EmptyProjection,

    /// HAVING was specified without a GROUP BY clause.
    #[error("HAVING requires a GROUP BY clause")]
    HavingWithoutGroupBy,
}
