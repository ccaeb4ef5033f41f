//! Table metadata and DDL for the roster schema.
//!
//! The column helpers play the role of a generated metamodel: query
//! composition refers to `members::username()` rather than string literals
//! scattered through call sites.

use roster_query::Column;
use sqlx::SqlitePool;

use crate::error::Result;

/// DDL for the team table. Identifiers are storage-assigned on insert.
pub const CREATE_TEAM: &str = "\
CREATE TABLE IF NOT EXISTS team (
    team_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)";

/// DDL for the member table, with the foreign key to team.
pub const CREATE_MEMBER: &str = "\
CREATE TABLE IF NOT EXISTS member (
    member_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT,
    age INTEGER NOT NULL DEFAULT 0,
    team_id INTEGER REFERENCES team(team_id)
)";

/// Creates both tables.
pub async fn create_all(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_TEAM).execute(pool).await?;
    sqlx::query(CREATE_MEMBER).execute(pool).await?;
    Ok(())
}

/// Column references for the member table.
pub mod members {
    use super::Column;

    /// Table name.
    pub const TABLE: &str = "member";

    /// member.member_id
    #[must_use]
    pub fn id() -> Column {
        Column::qualified(TABLE, "member_id")
    }

    /// member.username
    #[must_use]
    pub fn username() -> Column {
        Column::qualified(TABLE, "username")
    }

    /// member.age
    #[must_use]
    pub fn age() -> Column {
        Column::qualified(TABLE, "age")
    }

    /// member.team_id
    #[must_use]
    pub fn team_id() -> Column {
        Column::qualified(TABLE, "team_id")
    }
}

/// Column references for the team table.
pub mod teams {
    use super::Column;

    /// Table name.
    pub const TABLE: &str = "team";

    /// team.team_id
    #[must_use]
    pub fn id() -> Column {
        Column::qualified(TABLE, "team_id")
    }

    /// team.name
    #[must_use]
    pub fn name() -> Column {
        Column::qualified(TABLE, "name")
    }
}
