//! Projection expressions: columns, values, aggregates, CASE, string
//! concatenation, and scalar subqueries.

use crate::error::QueryError;
use crate::predicate::{CompareOp, Predicate};
use crate::select::{OrderDirection, OrderSpec, Select};
use crate::value::{SqlValue, ToSqlValue};

/// Creates a column reference.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        qualifier: None,
        name: String::from(name),
    }
}

/// A column reference, optionally qualified by a table name or alias.
#[derive(Debug, Clone)]
pub struct Column {
    /// Optional table name or alias qualifier.
    pub qualifier: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(qualifier: &str, name: &str) -> Self {
        Self {
            qualifier: Some(String::from(qualifier)),
            name: String::from(name),
        }
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Wraps the column into a projection expression.
    #[must_use]
    pub fn expr(self) -> Expr {
        Expr::Column(self)
    }

    /// Creates an equality predicate against a value.
    #[must_use]
    pub fn eq<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    /// Creates an inequality predicate against a value.
    #[must_use]
    pub fn ne<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    /// Creates a greater-than predicate against a value.
    #[must_use]
    pub fn gt<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal predicate against a value.
    #[must_use]
    pub fn gte<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Gte, value)
    }

    /// Creates a less-than predicate against a value.
    #[must_use]
    pub fn lt<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal predicate against a value.
    #[must_use]
    pub fn lte<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Lte, value)
    }

    /// Creates an equality predicate against another column.
    ///
    /// This is the building block for ad-hoc joins that are not backed by a
    /// declared association.
    #[must_use]
    pub fn eq_col(self, other: Column) -> Predicate {
        Predicate::Compare {
            lhs: Expr::Column(self),
            op: CompareOp::Eq,
            rhs: Expr::Column(other),
        }
    }

    /// Creates an equality predicate against an arbitrary expression, such
    /// as a scalar subquery.
    #[must_use]
    pub fn eq_expr(self, rhs: Expr) -> Predicate {
        Predicate::Compare {
            lhs: Expr::Column(self),
            op: CompareOp::Eq,
            rhs,
        }
    }

    /// Creates a BETWEEN predicate (inclusive).
    #[must_use]
    pub fn between<V: ToSqlValue>(self, low: V, high: V) -> Predicate {
        Predicate::Between {
            expr: Expr::Column(self),
            low: Expr::Value(low.to_sql_value()),
            high: Expr::Value(high.to_sql_value()),
        }
    }

    /// Creates a LIKE predicate (case-sensitive pattern match).
    #[must_use]
    pub fn like(self, pattern: &str) -> Predicate {
        Predicate::Like {
            expr: Expr::Column(self),
            pattern: String::from(pattern),
        }
    }

    /// Creates an IS NULL predicate.
    #[must_use]
    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(Expr::Column(self))
    }

    /// Creates an IS NOT NULL predicate.
    #[must_use]
    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(Expr::Column(self))
    }

    /// Creates a COUNT(column) aggregate.
    #[must_use]
    pub fn count(self) -> Expr {
        Expr::Aggregate {
            func: AggFunc::Count,
            arg: Some(self),
        }
    }

    /// Creates a SUM(column) aggregate.
    #[must_use]
    pub fn sum(self) -> Expr {
        Expr::Aggregate {
            func: AggFunc::Sum,
            arg: Some(self),
        }
    }

    /// Creates an AVG(column) aggregate.
    #[must_use]
    pub fn avg(self) -> Expr {
        Expr::Aggregate {
            func: AggFunc::Avg,
            arg: Some(self),
        }
    }

    /// Creates a MAX(column) aggregate.
    #[must_use]
    pub fn max(self) -> Expr {
        Expr::Aggregate {
            func: AggFunc::Max,
            arg: Some(self),
        }
    }

    /// Creates a MIN(column) aggregate.
    #[must_use]
    pub fn min(self) -> Expr {
        Expr::Aggregate {
            func: AggFunc::Min,
            arg: Some(self),
        }
    }

    /// Concatenates this column with another expression.
    #[must_use]
    pub fn concat(self, other: impl Into<Expr>) -> Expr {
        self.expr().concat(other)
    }

    /// Converts the column to text (CAST(column AS TEXT)).
    ///
    /// Used for numeric-to-string conversion inside a projected expression.
    #[must_use]
    pub fn as_text(self) -> Expr {
        Expr::CastText(Box::new(Expr::Column(self)))
    }

    /// Creates an ascending order specification.
    #[must_use]
    pub fn asc(self) -> OrderSpec {
        OrderSpec::new(Expr::Column(self), OrderDirection::Asc)
    }

    /// Creates a descending order specification.
    #[must_use]
    pub fn desc(self) -> OrderSpec {
        OrderSpec::new(Expr::Column(self), OrderDirection::Desc)
    }

    fn compare<V: ToSqlValue>(self, op: CompareOp, value: V) -> Predicate {
        Predicate::Compare {
            lhs: Expr::Column(self),
            op,
            rhs: Expr::Value(value.to_sql_value()),
        }
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// COUNT aggregate
    Count,
    /// SUM aggregate
    Sum,
    /// AVG aggregate
    Avg,
    /// MAX aggregate
    Max,
    /// MIN aggregate
    Min,
}

impl AggFunc {
    fn name(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Max => "MAX",
            Self::Min => "MIN",
        }
    }
}

/// A projection expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference.
    Column(Column),
    /// Literal value, emitted as a bound parameter.
    Value(SqlValue),
    /// Aggregate function call; `None` argument means `COUNT(*)`.
    Aggregate {
        /// The aggregate function.
        func: AggFunc,
        /// The argument column, or `None` for COUNT(*).
        arg: Option<Column>,
    },
    /// CASE WHEN ... THEN ... ELSE ... END.
    Case(Box<CaseExpr>),
    /// String concatenation of the parts with `||`.
    Concat(Vec<Expr>),
    /// CAST(expr AS TEXT).
    CastText(Box<Expr>),
    /// Scalar subquery, rendered in parentheses.
    Subquery(Box<Select>),
}

impl Expr {
    /// Concatenates this expression with another.
    #[must_use]
    pub fn concat(self, other: impl Into<Expr>) -> Expr {
        match self {
            Expr::Concat(mut parts) => {
                parts.push(other.into());
                Expr::Concat(parts)
            }
            first => Expr::Concat(vec![first, other.into()]),
        }
    }

    /// Converts this expression to text (CAST(expr AS TEXT)).
    #[must_use]
    pub fn as_text(self) -> Expr {
        Expr::CastText(Box::new(self))
    }

    /// Creates an equality predicate against a value.
    #[must_use]
    pub fn eq<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    /// Creates a greater-than predicate against a value.
    #[must_use]
    pub fn gt<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal predicate against a value.
    #[must_use]
    pub fn gte<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Gte, value)
    }

    /// Creates a less-than predicate against a value.
    #[must_use]
    pub fn lt<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal predicate against a value.
    #[must_use]
    pub fn lte<V: ToSqlValue>(self, value: V) -> Predicate {
        self.compare(CompareOp::Lte, value)
    }

    fn compare<V: ToSqlValue>(self, op: CompareOp, value: V) -> Predicate {
        Predicate::Compare {
            lhs: self,
            op,
            rhs: Expr::Value(value.to_sql_value()),
        }
    }

    /// Lowers the expression into the SQL buffer, appending parameters in
    /// source order.
    pub(crate) fn render(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
    ) -> Result<(), QueryError> {
        match self {
            Self::Column(c) => {
                sql.push_str(&c.to_sql());
                Ok(())
            }
            Self::Value(v) => {
                sql.push('?');
                params.push(v.clone());
                Ok(())
            }
            Self::Aggregate { func, arg } => {
                sql.push_str(func.name());
                sql.push('(');
                match arg {
                    Some(c) => sql.push_str(&c.to_sql()),
                    None => sql.push('*'),
                }
                sql.push(')');
                Ok(())
            }
            Self::Case(case) => case.render(sql, params),
            Self::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" || ");
                    }
                    part.render(sql, params)?;
                }
                Ok(())
            }
            Self::CastText(inner) => {
                sql.push_str("CAST(");
                inner.render(sql, params)?;
                sql.push_str(" AS TEXT)");
                Ok(())
            }
            Self::Subquery(select) => {
                sql.push('(');
                select.render_into(sql, params)?;
                sql.push(')');
                Ok(())
            }
        }
    }
}

/// Creates a COUNT(*) aggregate expression.
#[must_use]
pub fn count_all() -> Expr {
    Expr::Aggregate {
        func: AggFunc::Count,
        arg: None,
    }
}

/// Creates a constant expression, emitted as a bound parameter.
#[must_use]
pub fn constant<V: ToSqlValue>(value: V) -> Expr {
    Expr::Value(value.to_sql_value())
}

/// Wraps a SELECT statement into a scalar subquery expression.
///
/// Usable both in predicate position (`WHERE age = (subquery)`) and in the
/// select list. Correlation is expressed by qualifying columns with the
/// outer and inner source aliases.
#[must_use]
pub fn subquery(select: Select) -> Expr {
    Expr::Subquery(Box::new(select))
}

/// A complete CASE expression with its default branch.
#[derive(Debug, Clone)]
pub struct CaseExpr {
    arms: Vec<(Predicate, Expr)>,
    otherwise: Expr,
}

impl CaseExpr {
    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<(), QueryError> {
        sql.push_str("CASE");
        for (when, then) in &self.arms {
            sql.push_str(" WHEN ");
            when.render(sql, params)?;
            sql.push_str(" THEN ");
            then.render(sql, params)?;
        }
        sql.push_str(" ELSE ");
        self.otherwise.render(sql, params)?;
        sql.push_str(" END");
        Ok(())
    }
}

/// Starts a CASE expression.
///
/// ```
/// use roster_query::{case, col};
///
/// let label = case()
///     .when(col("age").between(0, 10))
///     .then("junior")
///     .otherwise("other");
/// ```
#[must_use]
pub fn case() -> CaseBuilder {
    CaseBuilder { arms: Vec::new() }
}

/// Builder for CASE expressions.
///
/// The only way to obtain the finished expression is `otherwise`, so every
/// CASE carries a default branch.
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    arms: Vec<(Predicate, Expr)>,
}

impl CaseBuilder {
    /// Adds a WHEN branch; follow with `then` to give its result.
    #[must_use]
    pub fn when(self, predicate: Predicate) -> CaseWhen {
        CaseWhen {
            arms: self.arms,
            when: predicate,
        }
    }

    /// Finishes the expression with the default branch.
    #[must_use]
    pub fn otherwise<V: ToSqlValue>(self, value: V) -> Expr {
        self.otherwise_expr(Expr::Value(value.to_sql_value()))
    }

    /// Finishes the expression with an arbitrary default expression.
    #[must_use]
    pub fn otherwise_expr(self, expr: Expr) -> Expr {
        Expr::Case(Box::new(CaseExpr {
            arms: self.arms,
            otherwise: expr,
        }))
    }
}

/// A CASE builder holding an open WHEN branch.
#[derive(Debug, Clone)]
pub struct CaseWhen {
    arms: Vec<(Predicate, Expr)>,
    when: Predicate,
}

impl CaseWhen {
    /// Gives the result value of the open WHEN branch.
    #[must_use]
    pub fn then<V: ToSqlValue>(self, value: V) -> CaseBuilder {
        self.then_expr(Expr::Value(value.to_sql_value()))
    }

    /// Gives the result expression of the open WHEN branch.
    #[must_use]
    pub fn then_expr(mut self, expr: Expr) -> CaseBuilder {
        self.arms.push((self.when, expr));
        CaseBuilder { arms: self.arms }
    }
}
