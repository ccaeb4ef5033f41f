//! # roster-orm
//!
//! A minimal ORM over sqlx/SQLite for the roster schema: members and the
//! teams they belong to.
//!
//! This crate provides:
//! - `Member` and `Team` entities with explicit association load state
//! - `EntityGraph` for bidirectional association maintenance before save
//! - `Session` for one transactional unit of work with a first-level cache
//! - `MemberRepository` with literal-SQL and query-builder lookups
//! - DTO projection targets for reshaped query output
//!
//! ## Quick Start
//!
//! ```ignore
//! use roster_orm::{connect_memory, schema, Member, MemberRepository, Session};
//!
//! let pool = connect_memory().await?;
//! schema::create_all(&pool).await?;
//!
//! let mut session = Session::begin(&pool).await?;
//! let mut member = Member::named("member1");
//! MemberRepository::save(&mut session, &mut member).await?;
//!
//! let found = MemberRepository::find_by_id(&mut session, member.id.unwrap()).await?;
//! assert_eq!(found.as_ref(), Some(&member));
//! session.commit().await?;
//! ```
//!
//! ## Composed queries
//!
//! Listing operations exist both as literal SQL and as composed `Select`
//! queries from `roster-query`; the repository executes the latter and
//! hydrates entities, honoring the fetch-join flag:
//!
//! ```ignore
//! use roster_orm::schema::members;
//! use roster_orm::MemberRepository;
//!
//! let select = MemberRepository::select_members()
//!     .filter(members::username().eq("member1"));
//! let found = MemberRepository::fetch_one_member(&mut session, &select).await?;
//! assert!(!found.team.is_loaded());
//! ```

mod dto;
mod entity;
mod error;
mod graph;
mod repository;
pub mod schema;
mod session;

pub use dto::{MemberDto, UserDto};
pub use entity::{Association, Member, Team};
pub use error::{ConstraintKind, OrmError, Result};
pub use graph::{EntityGraph, MemberKey, TeamKey};
pub use repository::MemberRepository;
pub use session::{connect_memory, Session};

// Re-export the query-builder surface the repository API speaks.
pub use roster_query::{Join, OrderSpec, Predicate, Select};
