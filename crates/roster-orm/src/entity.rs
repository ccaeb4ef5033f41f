//! The entity model: members and the teams they belong to.
//!
//! Association loading is explicit. A hydrated `Member` states whether its
//! team was materialized by the query that produced it; there is no
//! deferred fetch behind an accessor.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Load state of a to-one association.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Association<T> {
    /// The association was not materialized by the producing query.
    #[default]
    NotLoaded,
    /// The association was materialized; `None` means there is no target.
    Loaded(Option<T>),
}

impl<T> Association<T> {
    /// Returns whether the association has been materialized.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns the target if it was materialized and exists.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(Some(t)) => Some(t),
            _ => None,
        }
    }
}

/// A team. Holds no member collection of its own; the member side owns the
/// foreign key, and the reverse collection lives in the entity graph index.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Storage-assigned identifier, `None` until persisted.
    pub id: Option<i64>,
    /// Team name.
    pub name: String,
}

impl Team {
    /// Creates an unsaved team.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: String::from(name),
        }
    }
}

impl FromRow<'_, SqliteRow> for Team {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: Some(row.try_get("team_id")?),
            name: row.try_get("name")?,
        })
    }
}

/// A member, optionally belonging to one team.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Storage-assigned identifier, `None` until persisted.
    pub id: Option<i64>,
    /// Username, nullable.
    pub username: Option<String>,
    /// Age, defaults to 0.
    pub age: i64,
    /// Foreign key to the member's team.
    pub team_id: Option<i64>,
    /// Team association with explicit load state.
    pub team: Association<Team>,
}

impl Member {
    /// Creates an unsaved member with no team.
    #[must_use]
    pub fn new(username: Option<&str>, age: i64) -> Self {
        Self {
            id: None,
            username: username.map(String::from),
            age,
            team_id: None,
            team: Association::NotLoaded,
        }
    }

    /// Creates an unsaved member with age 0 and no team.
    #[must_use]
    pub fn named(username: &str) -> Self {
        Self::new(Some(username), 0)
    }

    /// Returns whether this member has been persisted.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Hydrates a member from a fetch-joined row carrying the aliased
    /// `team_name` column. The team association comes back `Loaded`.
    pub(crate) fn from_row_with_team(row: &SqliteRow) -> sqlx::Result<Self> {
        let mut member = Self::from_row(row)?;
        let team_name: Option<String> = row.try_get("team_name")?;
        member.team = match (member.team_id, team_name) {
            (Some(id), Some(name)) => Association::Loaded(Some(Team { id: Some(id), name })),
            _ => Association::Loaded(None),
        };
        Ok(member)
    }
}

impl FromRow<'_, SqliteRow> for Member {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: Some(row.try_get("member_id")?),
            username: row.try_get("username")?,
            age: row.try_get("age")?,
            team_id: row.try_get("team_id")?,
            // Plain hydration never materializes the association.
            team: Association::NotLoaded,
        })
    }
}
