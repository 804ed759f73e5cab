//! Member entity.
//!
//! # Invariants
//! - `team_id` is the owning side of the member/team association.
//! - Once persisted, `team_id` changes only via `change_team`.

use crate::model::team::TeamId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-generated member identity.
pub type MemberId = i64;

/// Insert payload for a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
}

impl NewMember {
    /// Member without a team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: username.into(),
            age,
            team_id: None,
        }
    }

    /// Member joining `team_id` as part of the insert.
    pub fn with_team(username: impl Into<String>, age: i32, team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            ..Self::new(username, age)
        }
    }

    /// Member with age `0` and no team.
    pub fn named(username: impl Into<String>) -> Self {
        Self::new(username, 0)
    }
}

/// Persisted member.
///
/// The team is loaded lazily: only its id is carried here, the `Team` row is
/// fetched on demand through the team repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    team_id: Option<TeamId>,
}

impl Member {
    pub(crate) fn from_parts(
        id: MemberId,
        username: String,
        age: i32,
        team_id: Option<TeamId>,
    ) -> Self {
        Self {
            id,
            username,
            age,
            team_id,
        }
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Member(id={}, username={}, age={})",
            self.id, self.username, self.age
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Member, NewMember};

    #[test]
    fn constructors_match_expected_defaults() {
        assert_eq!(NewMember::named("solo").age, 0);
        assert_eq!(NewMember::new("m", 10).team_id, None);
        assert_eq!(NewMember::with_team("m", 10, 7).team_id, Some(7));
    }

    #[test]
    fn display_omits_team() {
        let member = Member::from_parts(4, "member1".to_string(), 10, Some(1));
        assert_eq!(member.to_string(), "Member(id=4, username=member1, age=10)");
    }
}
