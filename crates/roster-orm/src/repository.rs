//! Member data access.
//!
//! Every listing operation exists twice: once as a literal SQL string with
//! bound parameters, once as a composed `Select`. The two implementations
//! must return identical result sets for identical inputs; the test suite
//! holds them to that.

use roster_query::{Join, Predicate, Select};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use tracing::debug;

use crate::entity::Member;
use crate::error::{OrmError, Result};
use crate::schema::{members, teams};
use crate::session::Session;

const SELECT_MEMBER: &str = "SELECT member_id, username, age, team_id FROM member";

/// Repository for member database operations.
///
/// Repositories are stateless; every operation runs against the session it
/// is handed.
pub struct MemberRepository;

impl MemberRepository {
    /// Inserts a new member; after return the member carries its
    /// storage-assigned identifier.
    pub async fn save(session: &mut Session, member: &mut Member) -> Result<()> {
        session.persist_member(member).await
    }

    /// Looks a member up by identifier. A missing identifier is `Ok(None)`,
    /// never an error. The session's first-level cache is consulted first.
    pub async fn find_by_id(session: &mut Session, id: i64) -> Result<Option<Member>> {
        if let Some(member) = session.cached_member(id) {
            return Ok(Some(member.clone()));
        }
        let sql = "SELECT member_id, username, age, team_id FROM member WHERE member_id = ?";
        debug!(target: "roster_orm::sql", sql, "find member by id");
        let member = sqlx::query_as::<_, Member>(sql)
            .bind(id)
            .fetch_optional(session.conn())
            .await?;
        if let Some(member) = &member {
            session.cache_member(member);
        }
        Ok(member)
    }

    /// Returns every member, via a literal query.
    pub async fn find_all(session: &mut Session) -> Result<Vec<Member>> {
        debug!(target: "roster_orm::sql", sql = SELECT_MEMBER, "find all members");
        let rows = sqlx::query_as::<_, Member>(SELECT_MEMBER)
            .fetch_all(session.conn())
            .await?;
        Ok(rows)
    }

    /// Returns every member, via the query builder.
    pub async fn find_all_built(session: &mut Session) -> Result<Vec<Member>> {
        session.fetch_as(&Self::select_members()).await
    }

    /// Returns all members with the exact, case-sensitive username, via a
    /// literal query.
    pub async fn find_by_name(session: &mut Session, name: &str) -> Result<Vec<Member>> {
        let sql = "SELECT member_id, username, age, team_id FROM member WHERE username = ?";
        debug!(target: "roster_orm::sql", sql, "find members by name");
        let rows = sqlx::query_as::<_, Member>(sql)
            .bind(name)
            .fetch_all(session.conn())
            .await?;
        Ok(rows)
    }

    /// Returns all members with the exact, case-sensitive username, via the
    /// query builder.
    pub async fn find_by_name_built(session: &mut Session, name: &str) -> Result<Vec<Member>> {
        session
            .fetch_as(&Self::select_members().filter(members::username().eq(name)))
            .await
    }

    /// The canonical entity projection: all member columns, qualified so the
    /// query stays unambiguous under joins.
    #[must_use]
    pub fn select_members() -> Select {
        Select::from(members::TABLE)
            .project(members::id())
            .project(members::username())
            .project(members::age())
            .project(members::team_id())
    }

    /// The entity projection with the team fetch-joined: the hydrated
    /// members come back with their team association `Loaded`.
    #[must_use]
    pub fn select_members_with_team() -> Select {
        Self::select_members()
            .project_as(teams::name(), "team_name")
            .join(Join::inner(teams::TABLE).on(Self::team_join()).fetch())
    }

    /// The declared member-to-team association as a join predicate.
    #[must_use]
    pub fn team_join() -> Predicate {
        members::team_id().eq_col(teams::id())
    }

    /// Executes a composed query and hydrates members. When the select
    /// carries a fetch join of team the association comes back `Loaded`,
    /// otherwise `NotLoaded`.
    pub async fn fetch_members(session: &mut Session, select: &Select) -> Result<Vec<Member>> {
        let fetch_join = select.has_fetch_join();
        let rows = session.fetch_rows(select).await?;
        hydrate(&rows, fetch_join)
    }

    /// Executes a composed single-result query, failing fast with
    /// `NotFound` on zero rows and `NonUniqueResult` on more than one.
    pub async fn fetch_one_member(session: &mut Session, select: &Select) -> Result<Member> {
        let fetch_join = select.has_fetch_join();
        let rows = session.fetch_rows(&select.clone().cap_limit(2)).await?;
        let mut hydrated = hydrate(&rows, fetch_join)?;
        if hydrated.len() > 1 {
            return Err(OrmError::NonUniqueResult);
        }
        hydrated.pop().ok_or(OrmError::NotFound)
    }
}

fn hydrate(rows: &[SqliteRow], fetch_join: bool) -> Result<Vec<Member>> {
    rows.iter()
        .map(|row| {
            if fetch_join {
                Member::from_row_with_team(row)
            } else {
                Member::from_row(row)
            }
        })
        .collect::<sqlx::Result<Vec<_>>>()
        .map_err(OrmError::from)
}
