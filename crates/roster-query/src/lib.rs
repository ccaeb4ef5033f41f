//! # roster-query
//!
//! A composable SQL query builder that lowers a small expression AST to
//! parameterized SQL.
//!
//! This crate provides:
//! - `SqlValue` for safe, parameterized values
//! - `Column` references and `Expr` projection expressions
//! - `Predicate` trees combinable with AND, OR, and NOT
//! - `Select` for building full statements with joins, grouping,
//!   ordering, and pagination
//!
//! Queries are built declaratively and lowered in one step:
//!
//! ```
//! use roster_query::{col, Select};
//!
//! let (sql, params) = Select::from("member")
//!     .project(col("username"))
//!     .filter(col("username").eq("member1").and(col("age").between(10, 20)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT username FROM member WHERE (username = ?) AND (age BETWEEN ? AND ?)"
//! );
//! assert_eq!(params.len(), 3);
//! ```
//!
//! The builder never inlines values into the SQL text; every value becomes a
//! `?` placeholder with a matching entry in the parameter list, in source
//! order across the SELECT list, joins, WHERE, and HAVING clauses.

mod error;
mod expr;
mod predicate;
mod select;
pub mod value;

pub use error::QueryError;
pub use expr::{case, col, constant, count_all, subquery, CaseBuilder, CaseWhen, Column, Expr};
pub use predicate::{CompareOp, Predicate};
pub use select::{Join, JoinKind, NullOrder, OrderDirection, OrderSpec, Select};
pub use value::{SqlValue, ToSqlValue};
