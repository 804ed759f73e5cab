//! Member/team store with dynamic search and pagination.
//! This crate owns the schema, the association invariant and every query.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use bootstrap::{open_store, seed_roster};
pub use config::{ConfigError, CoreConfig, Profile};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::dto::{MemberDto, MemberSearchCondition, MemberTeamDto};
pub use model::member::{Member, MemberId, NewMember};
pub use model::team::{NewTeam, Team, TeamId};
pub use repo::member_repo::{MemberRepository, RepoError, RepoResult, SqliteMemberRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use search::page::{Direction, Order, Page, PageRequest, Sort};
pub use search::predicate::{Column, Filter, Operand, Predicate};
pub use service::member_service::{MemberService, PageStrategy, SeedSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
