//! Member/team use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for callers above the repositories.
//! - Resolve the lazy member -> team reference on demand.
//! - Seed the sample roster used for local runs.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Team membership changes only go through `change_team`.

use crate::model::dto::{MemberSearchCondition, MemberTeamDto};
use crate::model::member::{Member, MemberId, NewMember};
use crate::model::team::{NewTeam, Team, TeamId};
use crate::repo::member_repo::{MemberRepository, RepoError, RepoResult};
use crate::repo::team_repo::TeamRepository;
use crate::search::page::{Page, PageRequest};
use log::info;
use serde::{Deserialize, Serialize};

const SEED_TEAM_A: &str = "teamA";
const SEED_TEAM_B: &str = "teamB";

/// Which pagination query shape to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// Content and total from one statement.
    #[default]
    Simple,
    /// Separate content and count statements.
    Complex,
}

/// Ids created by [`MemberService::seed_sample_roster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub members: Vec<MemberId>,
}

/// Use-case service over member and team repositories.
pub struct MemberService<M: MemberRepository, T: TeamRepository> {
    members: M,
    teams: T,
}

impl<M: MemberRepository, T: TeamRepository> MemberService<M, T> {
    pub fn new(members: M, teams: T) -> Self {
        Self { members, teams }
    }

    pub fn create_team(&self, name: impl Into<String>) -> RepoResult<TeamId> {
        self.teams.save_team(&NewTeam::new(name))
    }

    pub fn register_member(&self, member: &NewMember) -> RepoResult<MemberId> {
        self.members.save_member(member)
    }

    pub fn find_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.members.find_member(id)
    }

    /// Loads the team a member currently belongs to.
    ///
    /// Returns `NotFound` for an unknown member and `Ok(None)` for a member
    /// without a team.
    pub fn team_of(&self, member_id: MemberId) -> RepoResult<Option<Team>> {
        let member = self
            .members
            .find_member(member_id)?
            .ok_or(RepoError::NotFound(member_id))?;
        match member.team_id() {
            Some(team_id) => self.teams.find_team(team_id),
            None => Ok(None),
        }
    }

    pub fn change_team(&self, member_id: MemberId, team_id: Option<TeamId>) -> RepoResult<()> {
        self.members.change_team(member_id, team_id)
    }

    pub fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>> {
        self.members.search(condition)
    }

    pub fn search_page(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
        strategy: PageStrategy,
    ) -> RepoResult<Page<MemberTeamDto>> {
        match strategy {
            PageStrategy::Simple => self.members.search_page_simple(condition, request),
            PageStrategy::Complex => self.members.search_page_complex(condition, request),
        }
    }

    /// Inserts `teamA`, `teamB` and `count` members named `member{i}` with
    /// age `i`; even indexes join `teamA`, odd ones `teamB`.
    ///
    /// Each insert commits on its own; `bootstrap::seed_roster` wraps this
    /// in one transaction.
    pub fn seed_sample_roster(&self, count: u32) -> RepoResult<SeedSummary> {
        let team_a = self.create_team(SEED_TEAM_A)?;
        let team_b = self.create_team(SEED_TEAM_B)?;

        let mut members = Vec::with_capacity(count as usize);
        for index in 0..count {
            let team_id = if index % 2 == 0 { team_a } else { team_b };
            let age = i32::try_from(index)
                .map_err(|_| RepoError::InvalidData(format!("seed age {index} out of range")))?;
            members.push(self.members.save_member(&NewMember::with_team(
                format!("member{index}"),
                age,
                team_id,
            ))?);
        }

        info!(
            "event=roster_seed module=service status=ok teams=2 members={}",
            members.len()
        );
        Ok(SeedSummary {
            team_a,
            team_b,
            members,
        })
    }
}
