//! Team repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A loaded `Team` lists exactly the members whose `team_id` points at it.
//! - Teams are never deleted through this repository.

use crate::model::member::MemberId;
use crate::model::team::{NewTeam, Team, TeamId};
use crate::repo::member_repo::{ensure_connection_ready, RepoResult};
use log::debug;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// Repository interface for teams.
pub trait TeamRepository {
    /// Inserts a team and returns its generated id.
    fn save_team(&self, team: &NewTeam) -> RepoResult<TeamId>;
    /// Loads one team together with its member ids.
    fn find_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn find_all_teams(&self) -> RepoResult<Vec<Team>>;
    /// Exact name match; names are not unique.
    fn find_team_by_name(&self, name: &str) -> RepoResult<Vec<Team>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn load_teams(&self, name: Option<&str>) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_id, name
             FROM team
             WHERE (?1 IS NULL OR name = ?1)
             ORDER BY team_id ASC;",
        )?;
        let headers = stmt
            .query_map([name], |row| {
                Ok((row.get::<_, TeamId>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut members_by_team = self.member_ids_by_team()?;
        Ok(headers
            .into_iter()
            .map(|(id, name)| {
                let members = members_by_team.remove(&id).unwrap_or_default();
                Team::from_parts(id, name, members)
            })
            .collect())
    }

    fn member_ids_by_team(&self) -> RepoResult<BTreeMap<TeamId, Vec<MemberId>>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_id, member_id
             FROM member
             WHERE team_id IS NOT NULL
             ORDER BY member_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut grouped: BTreeMap<TeamId, Vec<MemberId>> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            grouped
                .entry(row.get(0)?)
                .or_default()
                .push(row.get(1)?);
        }
        Ok(grouped)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save_team(&self, team: &NewTeam) -> RepoResult<TeamId> {
        self.conn.execute(
            "INSERT INTO team (name) VALUES (?1);",
            params![team.name.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=team_save module=repo status=ok team_id={id}");
        Ok(id)
    }

    fn find_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM team WHERE team_id = ?1;")?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let name: String = row.get(0)?;

        let mut member_stmt = self.conn.prepare(
            "SELECT member_id FROM member WHERE team_id = ?1 ORDER BY member_id ASC;",
        )?;
        let members = member_stmt
            .query_map([id], |row| row.get::<_, MemberId>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Team::from_parts(id, name, members)))
    }

    fn find_all_teams(&self) -> RepoResult<Vec<Team>> {
        self.load_teams(None)
    }

    fn find_team_by_name(&self, name: &str) -> RepoResult<Vec<Team>> {
        self.load_teams(Some(name))
    }
}
