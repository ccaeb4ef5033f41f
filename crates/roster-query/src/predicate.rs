//! Predicate trees for WHERE, HAVING, and join ON clauses.
//!
//! Predicates compare arbitrary expressions, so the same tree covers
//! column-to-value filters, column-to-column join conditions, and
//! comparisons against scalar subqueries.

use std::fmt;

use crate::error::QueryError;
use crate::expr::Expr;
use crate::value::SqlValue;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
        }
    }
}

/// A filter expression that can be combined with other expressions.
///
/// # Example
///
/// ```
/// use roster_query::col;
///
/// // Simple equality
/// let filter = col("username").eq("member1");
///
/// // Conjunction and disjunction
/// let filter = col("username").eq("member1").and(col("age").between(10, 20));
/// let filter = col("age").lt(10).or(col("age").gt(60));
/// ```
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Comparison between two expressions.
    Compare {
        /// Left-hand side.
        lhs: Expr,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        rhs: Expr,
    },
    /// BETWEEN range check (inclusive on both ends).
    Between {
        /// Tested expression.
        expr: Expr,
        /// Lower bound.
        low: Expr,
        /// Upper bound.
        high: Expr,
    },
    /// IS NULL check.
    IsNull(Expr),
    /// IS NOT NULL check.
    IsNotNull(Expr),
    /// LIKE pattern match (case-sensitive).
    Like {
        /// Tested expression.
        expr: Expr,
        /// Match pattern, `%` as wildcard.
        pattern: String,
    },
    /// AND combination.
    And(Box<Predicate>, Box<Predicate>),
    /// OR combination.
    Or(Box<Predicate>, Box<Predicate>),
    /// NOT negation.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Combines this predicate with another using AND.
    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Combines this predicate with another using OR.
    #[must_use]
    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Negates this predicate with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Lowers the predicate into the SQL buffer, appending parameters in
    /// source order.
    pub(crate) fn render(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
    ) -> Result<(), QueryError> {
        match self {
            Self::Compare { lhs, op, rhs } => {
                lhs.render(sql, params)?;
                sql.push_str(&format!(" {op} "));
                rhs.render(sql, params)
            }
            Self::Between { expr, low, high } => {
                expr.render(sql, params)?;
                sql.push_str(" BETWEEN ");
                low.render(sql, params)?;
                sql.push_str(" AND ");
                high.render(sql, params)
            }
            Self::IsNull(expr) => {
                expr.render(sql, params)?;
                sql.push_str(" IS NULL");
                Ok(())
            }
            Self::IsNotNull(expr) => {
                expr.render(sql, params)?;
                sql.push_str(" IS NOT NULL");
                Ok(())
            }
            Self::Like { expr, pattern } => {
                expr.render(sql, params)?;
                sql.push_str(" LIKE ?");
                params.push(SqlValue::Text(pattern.clone()));
                Ok(())
            }
            Self::And(left, right) => {
                sql.push('(');
                left.render(sql, params)?;
                sql.push_str(") AND (");
                right.render(sql, params)?;
                sql.push(')');
                Ok(())
            }
            Self::Or(left, right) => {
                sql.push('(');
                left.render(sql, params)?;
                sql.push_str(") OR (");
                right.render(sql, params)?;
                sql.push(')');
                Ok(())
            }
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, params)?;
                sql.push(')');
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    fn build(p: &Predicate) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        p.render(&mut sql, &mut params).unwrap();
        (sql, params)
    }

    #[test]
    fn test_simple_eq() {
        let (sql, params) = build(&col("username").eq("member1"));
        assert_eq!(sql, "username = ?");
        assert_eq!(params, vec![SqlValue::Text(String::from("member1"))]);
    }

    #[test]
    fn test_and_combination() {
        let p = col("username").eq("member1").and(col("age").between(10, 20));
        let (sql, params) = build(&p);
        assert_eq!(sql, "(username = ?) AND (age BETWEEN ? AND ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_or_combination() {
        let p = col("age").lt(10).or(col("age").gt(60));
        let (sql, params) = build(&p);
        assert_eq!(sql, "(age < ?) OR (age > ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_not() {
        let (sql, params) = build(&col("username").eq("member1").not());
        assert_eq!(sql, "NOT (username = ?)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_column_to_column() {
        let p = col("member.username").eq_col(col("team.name"));
        let (sql, params) = build(&p);
        assert_eq!(sql, "member.username = team.name");
        assert!(params.is_empty());
    }

    #[test]
    fn test_is_null() {
        let (sql, params) = build(&col("username").is_null());
        assert_eq!(sql, "username IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_like() {
        let (sql, params) = build(&col("username").like("member%"));
        assert_eq!(sql, "username LIKE ?");
        assert_eq!(params, vec![SqlValue::Text(String::from("member%"))]);
    }
}
