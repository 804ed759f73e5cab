//! Team entity.

use crate::model::member::MemberId;
use serde::{Deserialize, Serialize};

/// Store-generated team identity.
pub type TeamId = i64;

/// Insert payload for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Persisted team with its member collection (inverse side).
///
/// The collection mirrors `member.team_id` at load time. It has no public
/// mutator: members join or leave a team only through
/// [`MemberRepository::change_team`](crate::repo::member_repo::MemberRepository::change_team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    members: Vec<MemberId>,
}

impl Team {
    pub(crate) fn from_parts(id: TeamId, name: String, mut members: Vec<MemberId>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self { id, name, members }
    }

    /// Member ids currently referencing this team, ascending.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn has_member(&self, member_id: MemberId) -> bool {
        self.members.binary_search(&member_id).is_ok()
    }
}
