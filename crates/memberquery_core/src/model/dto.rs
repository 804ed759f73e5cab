//! Flat carriers crossing the repository boundary.
//!
//! None of these types carry behavior beyond construction. Filter building
//! for [`MemberSearchCondition`] lives in `search::condition`.

use crate::model::member::MemberId;
use crate::model::team::TeamId;
use serde::{Deserialize, Serialize};

/// Optional search constraints. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSearchCondition {
    /// Case-insensitive substring of `member.username`.
    pub username: Option<String>,
    /// Case-insensitive substring of `team.name`.
    pub team_name: Option<String>,
    /// Inclusive lower age bound.
    pub age_goe: Option<i32>,
    /// Inclusive upper age bound.
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    pub fn username(mut self, value: impl Into<String>) -> Self {
        self.username = Some(value.into());
        self
    }

    pub fn team_name(mut self, value: impl Into<String>) -> Self {
        self.team_name = Some(value.into());
        self
    }

    pub fn age_goe(mut self, value: i32) -> Self {
        self.age_goe = Some(value);
        self
    }

    pub fn age_loe(mut self, value: i32) -> Self {
        self.age_loe = Some(value);
        self
    }
}

/// Member row joined with its (optional) team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamDto {
    pub member_id: MemberId,
    pub username: String,
    pub age: i32,
    /// `None` when the member has no team (left join).
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

/// Username/age projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: String,
    pub age: i32,
}
