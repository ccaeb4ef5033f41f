//! In-memory entity graph with bidirectional association maintenance.
//!
//! Members and teams are stored in arenas keyed by insertion order, and the
//! member/team relationship is kept as two indexes (member -> team and
//! team -> members) instead of embedded object references. All association
//! changes go through `change_team`, the single mutator that keeps both
//! sides consistent; reassigning a member also removes it from its previous
//! team's roster.

use crate::entity::{Member, Team};

/// Arena key for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberKey(usize);

/// Arena key for a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamKey(usize);

/// A unit of unsaved or partially saved entities and their associations.
#[derive(Debug, Default)]
pub struct EntityGraph {
    members: Vec<Member>,
    teams: Vec<Team>,
    /// member -> team index (the foreign-key side).
    membership: Vec<Option<TeamKey>>,
    /// team -> members index (the reverse collection).
    rosters: Vec<Vec<MemberKey>>,
}

impl EntityGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a team to the graph.
    pub fn add_team(&mut self, name: &str) -> TeamKey {
        let key = TeamKey(self.teams.len());
        self.teams.push(Team::new(name));
        self.rosters.push(Vec::new());
        key
    }

    /// Adds a member to the graph, linking both sides of the association
    /// when a team is given.
    pub fn add_member(
        &mut self,
        username: Option<&str>,
        age: i64,
        team: Option<TeamKey>,
    ) -> MemberKey {
        let key = MemberKey(self.members.len());
        self.members.push(Member::new(username, age));
        self.membership.push(None);
        if let Some(team) = team {
            self.change_team(key, team);
        }
        key
    }

    /// Moves a member to the given team, updating both the membership index
    /// and the rosters of the old and new teams.
    pub fn change_team(&mut self, member: MemberKey, team: TeamKey) {
        if let Some(old) = self.membership[member.0] {
            if old == team {
                return;
            }
            self.rosters[old.0].retain(|k| *k != member);
        }
        self.membership[member.0] = Some(team);
        self.rosters[team.0].push(member);
        self.members[member.0].team_id = self.teams[team.0].id;
    }

    /// Returns the member under the given key.
    #[must_use]
    pub fn member(&self, key: MemberKey) -> &Member {
        &self.members[key.0]
    }

    /// Returns the member under the given key, mutably.
    pub fn member_mut(&mut self, key: MemberKey) -> &mut Member {
        &mut self.members[key.0]
    }

    /// Returns the team under the given key.
    #[must_use]
    pub fn team(&self, key: TeamKey) -> &Team {
        &self.teams[key.0]
    }

    /// Returns the team under the given key, mutably.
    pub fn team_mut(&mut self, key: TeamKey) -> &mut Team {
        &mut self.teams[key.0]
    }

    /// Returns the team a member belongs to, if any.
    #[must_use]
    pub fn team_of(&self, member: MemberKey) -> Option<TeamKey> {
        self.membership[member.0]
    }

    /// Returns the members of a team.
    #[must_use]
    pub fn roster(&self, team: TeamKey) -> &[MemberKey] {
        &self.rosters[team.0]
    }

    /// Returns all member keys in insertion order.
    #[must_use]
    pub fn member_keys(&self) -> Vec<MemberKey> {
        (0..self.members.len()).map(MemberKey).collect()
    }

    /// Returns all team keys in insertion order.
    #[must_use]
    pub fn team_keys(&self) -> Vec<TeamKey> {
        (0..self.teams.len()).map(TeamKey).collect()
    }
}
