//! Session: one transactional unit of work.
//!
//! A `Session` wraps a single transaction and a first-level cache of
//! members by identifier. Dropping a session without committing rolls the
//! transaction back, so test and request scopes get rollback-on-exit for
//! free.

use std::collections::HashMap;

use roster_query::{Select, SqlValue};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::entity::{Member, Team};
use crate::error::{OrmError, Result};
use crate::graph::EntityGraph;

/// Opens an in-memory SQLite pool with foreign keys enforced.
///
/// The pool is capped at one connection: every pooled connection would
/// otherwise get its own private in-memory database.
pub async fn connect_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// A transactional unit of work.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
    /// First-level cache of members by identifier.
    members: HashMap<i64, Member>,
}

impl Session {
    /// Begins a new session on its own transaction.
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
            members: HashMap::new(),
        })
    }

    /// Commits the transaction, ending the session.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Rolls the transaction back, ending the session.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Clears the first-level cache. Entities fetched afterwards are
    /// re-hydrated from the database.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub(crate) fn cached_member(&self, id: i64) -> Option<&Member> {
        self.members.get(&id)
    }

    pub(crate) fn cache_member(&mut self, member: &Member) {
        if let Some(id) = member.id {
            self.members.insert(id, member.clone());
        }
    }

    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Inserts a team and writes the storage-assigned identifier back.
    pub async fn persist_team(&mut self, team: &mut Team) -> Result<()> {
        let sql = "INSERT INTO team (name) VALUES (?)";
        debug!(target: "roster_orm::sql", sql, name = %team.name, "persist team");
        let result = sqlx::query(sql)
            .bind(&team.name)
            .execute(&mut *self.tx)
            .await?;
        team.id = Some(result.last_insert_rowid());
        Ok(())
    }

    /// Inserts a member and writes the storage-assigned identifier back.
    ///
    /// Constraint failures (for example a dangling team foreign key)
    /// surface as `ConstraintViolation`.
    pub async fn persist_member(&mut self, member: &mut Member) -> Result<()> {
        let sql = "INSERT INTO member (username, age, team_id) VALUES (?, ?, ?)";
        debug!(target: "roster_orm::sql", sql, "persist member");
        let result = sqlx::query(sql)
            .bind(&member.username)
            .bind(member.age)
            .bind(member.team_id)
            .execute(&mut *self.tx)
            .await?;
        member.id = Some(result.last_insert_rowid());
        self.cache_member(member);
        Ok(())
    }

    /// Persists an entity graph: teams first, then members with their
    /// foreign keys resolved through the membership index.
    pub async fn persist_graph(&mut self, graph: &mut EntityGraph) -> Result<()> {
        for key in graph.team_keys() {
            if graph.team(key).id.is_none() {
                self.persist_team(graph.team_mut(key)).await?;
            }
        }
        for key in graph.member_keys() {
            let team_id = graph.team_of(key).and_then(|team| graph.team(team).id);
            let member = graph.member_mut(key);
            member.team_id = team_id;
            if member.id.is_none() {
                self.persist_member(member).await?;
            }
        }
        Ok(())
    }

    /// Executes a built query and returns the raw rows.
    pub async fn fetch_rows(&mut self, select: &Select) -> Result<Vec<SqliteRow>> {
        let (sql, params) = select.build()?;
        debug!(target: "roster_orm::sql", %sql, "executing query");
        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_value(query, param);
        }
        Ok(query.fetch_all(&mut *self.tx).await?)
    }

    /// Executes a built query and maps every row through `FromRow`.
    pub async fn fetch_as<T>(&mut self, select: &Select) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, params) = select.build()?;
        debug!(target: "roster_orm::sql", %sql, "executing query");
        let mut query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            query = bind_value_as(query, param);
        }
        Ok(query.fetch_all(&mut *self.tx).await?)
    }

    /// Executes a single-result query: `None` for zero rows,
    /// `NonUniqueResult` for more than one.
    pub async fn fetch_optional_as<T>(&mut self, select: &Select) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        // Two rows are enough to detect non-uniqueness; a caller-set
        // smaller limit is kept.
        let mut results = self.fetch_as(&select.clone().cap_limit(2)).await?;
        match results.len() {
            0 => Ok(None),
            1 => Ok(results.pop()),
            _ => Err(OrmError::NonUniqueResult),
        }
    }

    /// Executes a single-result query, failing fast with `NotFound` or
    /// `NonUniqueResult`.
    pub async fn fetch_one_as<T>(&mut self, select: &Select) -> Result<T>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.fetch_optional_as(select).await?.ok_or(OrmError::NotFound)
    }
}

/// Binds a SqlValue parameter to a raw query.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
    }
}

/// Binds a SqlValue parameter to a query_as query.
fn bind_value_as<'q, T>(
    query: sqlx::query::QueryAs<'q, Sqlite, T, sqlx::sqlite::SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::QueryAs<'q, Sqlite, T, sqlx::sqlite::SqliteArguments<'q>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
    }
}
