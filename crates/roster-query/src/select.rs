//! SELECT statement builder.
//!
//! A `Select` collects projections, joins, filters, grouping, ordering, and
//! pagination, and lowers the whole statement to parameterized SQL in a
//! single `build` step. Composition mistakes that would produce malformed
//! SQL surface as `QueryError` at build time.

use crate::error::QueryError;
use crate::expr::Expr;
use crate::predicate::Predicate;
use crate::value::SqlValue;

/// Join variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN
    Inner,
    /// LEFT OUTER JOIN
    Left,
}

/// A join clause.
///
/// The ON predicate covers both association joins (foreign key equality)
/// and ad-hoc joins on arbitrary conditions; extra restrictions on the
/// joined side compose into the same predicate with `and`.
///
/// # Example
///
/// ```
/// use roster_query::{col, Join};
///
/// let join = Join::left("team")
///     .on(col("member.team_id")
///         .eq_col(col("team.team_id"))
///         .and(col("team.name").eq("teamA")));
/// ```
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    on: Option<Predicate>,
    fetch: bool,
}

impl Join {
    /// Creates an INNER JOIN against the given table.
    #[must_use]
    pub fn inner(table: &str) -> Self {
        Self::new(JoinKind::Inner, table)
    }

    /// Creates a LEFT OUTER JOIN against the given table.
    #[must_use]
    pub fn left(table: &str) -> Self {
        Self::new(JoinKind::Left, table)
    }

    fn new(kind: JoinKind, table: &str) -> Self {
        Self {
            kind,
            table: String::from(table),
            alias: None,
            on: None,
            fetch: false,
        }
    }

    /// Aliases the joined table.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(String::from(alias));
        self
    }

    /// Sets the ON predicate.
    #[must_use]
    pub fn on(mut self, predicate: Predicate) -> Self {
        self.on = Some(predicate);
        self
    }

    /// Marks this join as a fetch join.
    ///
    /// The generated join clause is identical to a plain join; the flag is
    /// read by the execution layer to hydrate the joined entity eagerly.
    #[must_use]
    pub fn fetch(mut self) -> Self {
        self.fetch = true;
        self
    }

    /// Returns whether this join was marked as a fetch join.
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        self.fetch
    }

    /// Returns the joined table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<(), QueryError> {
        match self.kind {
            JoinKind::Inner => sql.push_str("INNER JOIN "),
            JoinKind::Left => sql.push_str("LEFT JOIN "),
        }
        sql.push_str(&self.table);
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        if let Some(on) = &self.on {
            sql.push_str(" ON ");
            on.render(sql, params)?;
        }
        Ok(())
    }
}

/// Order direction for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    Desc,
}

/// Placement of NULL values, distinct from the collation of non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrder {
    /// NULLS FIRST
    First,
    /// NULLS LAST
    Last,
}

/// An ordering specification.
#[derive(Debug, Clone)]
pub struct OrderSpec {
    expr: Expr,
    direction: OrderDirection,
    nulls: Option<NullOrder>,
}

impl OrderSpec {
    /// Creates an ordering specification.
    #[must_use]
    pub fn new(expr: Expr, direction: OrderDirection) -> Self {
        Self {
            expr,
            direction,
            nulls: None,
        }
    }

    /// Sorts NULL values after all non-null values.
    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrder::Last);
        self
    }

    /// Sorts NULL values before all non-null values.
    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrder::First);
        self
    }

    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<(), QueryError> {
        self.expr.render(sql, params)?;
        match self.direction {
            OrderDirection::Asc => sql.push_str(" ASC"),
            OrderDirection::Desc => sql.push_str(" DESC"),
        }
        match self.nulls {
            Some(NullOrder::First) => sql.push_str(" NULLS FIRST"),
            Some(NullOrder::Last) => sql.push_str(" NULLS LAST"),
            None => {}
        }
        Ok(())
    }
}

/// A SELECT statement builder.
///
/// Builders are value types; every method consumes and returns the builder,
/// so partial queries can be cloned and extended independently.
///
/// # Example
///
/// ```
/// use roster_query::{col, Select};
///
/// let (sql, params) = Select::from("member")
///     .project(col("username"))
///     .filter(col("age").eq(10))
///     .order_by(col("username").desc())
///     .offset(1)
///     .limit(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     "SELECT username FROM member WHERE age = ? \
///      ORDER BY username DESC LIMIT 2 OFFSET 1"
/// );
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    projections: Vec<(Expr, Option<String>)>,
    from: String,
    from_alias: Option<String>,
    joins: Vec<Join>,
    filters: Vec<Predicate>,
    group_by: Vec<Expr>,
    having: Option<Predicate>,
    order_by: Vec<OrderSpec>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Creates a SELECT over the given table.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            projections: Vec::new(),
            from: String::from(table),
            from_alias: None,
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Creates a SELECT over the given table under an alias.
    ///
    /// Aliased sources make self-referential subqueries unambiguous.
    #[must_use]
    pub fn from_as(table: &str, alias: &str) -> Self {
        let mut select = Self::from(table);
        select.from_alias = Some(String::from(alias));
        select
    }

    /// Adds a projection expression.
    #[must_use]
    pub fn project(mut self, expr: impl Into<Expr>) -> Self {
        self.projections.push((expr.into(), None));
        self
    }

    /// Adds an aliased projection expression (`expr AS alias`).
    #[must_use]
    pub fn project_as(mut self, expr: impl Into<Expr>, alias: &str) -> Self {
        self.projections.push((expr.into(), Some(String::from(alias))));
        self
    }

    /// Adds a filter predicate.
    ///
    /// Multiple filters are combined with AND.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Adds a join clause.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds a grouping key.
    #[must_use]
    pub fn group_by(mut self, expr: impl Into<Expr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Sets the post-aggregation HAVING predicate.
    ///
    /// Building a query with HAVING but no GROUP BY is a `QueryError`.
    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    /// Adds an ordering key.
    #[must_use]
    pub fn order_by(mut self, spec: OrderSpec) -> Self {
        self.order_by.push(spec);
        self
    }

    /// Limits the number of result rows.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` result rows.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Caps the row limit at `n`. A smaller existing limit is kept.
    ///
    /// Single-result execution uses this to fetch at most one row beyond
    /// the first without widening a query already limited to one.
    #[must_use]
    pub fn cap_limit(mut self, n: u64) -> Self {
        self.limit = Some(self.limit.map_or(n, |limit| limit.min(n)));
        self
    }

    /// Returns whether any join is marked as a fetch join.
    #[must_use]
    pub fn has_fetch_join(&self) -> bool {
        self.joins.iter().any(Join::is_fetch)
    }

    /// Builds the statement, returning SQL and parameters in source order.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render_into(&mut sql, &mut params)?;
        Ok((sql, params))
    }

    pub(crate) fn render_into(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
    ) -> Result<(), QueryError> {
        if self.projections.is_empty() {
            return Err(QueryError::EmptyProjection);
        }
        if self.having.is_some() && self.group_by.is_empty() {
            return Err(QueryError::HavingWithoutGroupBy);
        }

        sql.push_str("SELECT ");
        for (i, (expr, alias)) in self.projections.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            expr.render(sql, params)?;
            if let Some(alias) = alias {
                sql.push_str(" AS ");
                sql.push_str(alias);
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        if let Some(alias) = &self.from_alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }

        for join in &self.joins {
            sql.push(' ');
            join.render(sql, params)?;
        }

        for (i, filter) in self.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            filter.render(sql, params)?;
        }

        for (i, key) in self.group_by.iter().enumerate() {
            sql.push_str(if i == 0 { " GROUP BY " } else { ", " });
            key.render(sql, params)?;
        }

        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            having.render(sql, params)?;
        }

        for (i, spec) in self.order_by.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            spec.render(sql, params)?;
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite requires a LIMIT clause before OFFSET.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        Ok(())
    }
}
