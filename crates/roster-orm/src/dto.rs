//! Projection targets: shapes other than the source entity.

use sqlx::FromRow;

/// A member projection with the source column names.
///
/// Obtainable three equivalent ways: derived `FromRow` (field-name
/// binding), explicit per-column row reads, or `new` over a tuple row.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct MemberDto {
    /// Username, nullable.
    pub username: Option<String>,
    /// Age.
    pub age: i64,
}

impl MemberDto {
    /// Constructor-style projection.
    #[must_use]
    pub fn new(username: Option<String>, age: i64) -> Self {
        Self { username, age }
    }
}

/// A projection whose `name` field differs from the source column; the
/// query must alias `username AS name` explicitly for hydration to bind.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserDto {
    /// The member's username, under a different field name.
    pub name: Option<String>,
    /// Age.
    pub age: i64,
}
