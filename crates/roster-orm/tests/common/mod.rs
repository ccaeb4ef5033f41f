#![allow(dead_code)]

use roster_orm::{connect_memory, schema, EntityGraph, Member, Session};
use sqlx::SqlitePool;

/// Opens a fresh in-memory database with the roster schema applied.
pub async fn pool() -> SqlitePool {
    let pool = connect_memory().await.expect("in-memory pool");
    schema::create_all(&pool).await.expect("schema");
    pool
}

/// Seeds teamA/teamB with one member each, the exploratory suite's
/// baseline state: member1 (age 10, teamA) and member2 (age 20, teamB).
pub async fn seed(session: &mut Session) -> EntityGraph {
    let mut graph = EntityGraph::new();
    let team_a = graph.add_team("teamA");
    let team_b = graph.add_team("teamB");
    graph.add_member(Some("member1"), 10, Some(team_a));
    graph.add_member(Some("member2"), 20, Some(team_b));
    session.persist_graph(&mut graph).await.expect("seed");
    graph
}

/// Extends the baseline seed with member3 (age 30) and member4 (age 40),
/// both in teamB, for pagination and correlation scenarios.
pub async fn seed_four(session: &mut Session) -> EntityGraph {
    let mut graph = EntityGraph::new();
    let team_a = graph.add_team("teamA");
    let team_b = graph.add_team("teamB");
    graph.add_member(Some("member1"), 10, Some(team_a));
    graph.add_member(Some("member2"), 20, Some(team_b));
    graph.add_member(Some("member3"), 30, Some(team_b));
    graph.add_member(Some("member4"), 40, Some(team_b));
    session.persist_graph(&mut graph).await.expect("seed");
    graph
}

/// Extracts usernames in result order.
pub fn usernames(members: &[Member]) -> Vec<Option<String>> {
    members.iter().map(|m| m.username.clone()).collect()
}
