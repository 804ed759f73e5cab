//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide basic member persistence (save, find, count).
//! - Provide the dynamic search and pagination queries over
//!   `member LEFT JOIN team`.
//! - Own the single mutation path of the member/team association.
//!
//! # Invariants
//! - Unset search fields never constrain a query.
//! - `change_team` updates the association in one immediate transaction;
//!   the team side is derived from `member.team_id`, so no intermediate
//!   state is observable.
//! - Search results are ordered by member id unless a page sort says
//!   otherwise.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::dto::{MemberDto, MemberSearchCondition, MemberTeamDto};
use crate::model::member::{Member, MemberId, NewMember};
use crate::model::team::TeamId;
use crate::search::page::{derived_total, Page, PageRequest, Sort};
use crate::search::predicate::{Filter, Predicate};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite::{Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const MEMBER_SELECT_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id
FROM member m";

const MEMBER_TEAM_SELECT_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    t.team_id AS team_id,
    t.name AS team_name";

const MEMBER_TEAM_FROM_SQL: &str = " FROM member m LEFT JOIN team t ON t.team_id = m.team_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for member/team persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Member id does not exist.
    NotFound(MemberId),
    /// Team id does not exist.
    TeamNotFound(TeamId),
    /// Page request cannot be executed (zero size, offset out of range).
    InvalidPage(String),
    /// Persisted row cannot be mapped to the read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "member not found: {id}"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
            Self::InvalidPage(message) => write!(f, "invalid page request: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for members, including the dynamic search contract.
pub trait MemberRepository {
    /// Inserts a member and returns its generated id.
    fn save_member(&self, member: &NewMember) -> RepoResult<MemberId>;
    fn find_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_all_members(&self) -> RepoResult<Vec<Member>>;
    /// Exact username match.
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    /// Members matching an arbitrary predicate over the member/team join.
    fn find_all_by(&self, predicate: &Predicate) -> RepoResult<Vec<Member>>;
    fn count_members(&self) -> RepoResult<u64>;
    /// Moves a member to `team_id` (or out of any team with `None`).
    fn change_team(&self, member_id: MemberId, team_id: Option<TeamId>) -> RepoResult<()>;
    /// All members matching `condition`, joined with their team.
    fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>>;
    /// One statement returns both the page content and the total count.
    fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberTeamDto>>;
    /// Separate content and count statements; the count is skipped when
    /// the content already determines the total.
    fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberTeamDto>>;
    fn list_member_dtos(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberDto>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_members(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn query_member_team_rows(
        &self,
        filter: &Filter,
        sort: &Sort,
        bounds: Option<(i64, i64)>,
    ) -> RepoResult<Vec<MemberTeamDto>> {
        let (where_sql, mut binds) = filter.where_clause();
        let mut sql = format!(
            "{MEMBER_TEAM_SELECT_SQL}{MEMBER_TEAM_FROM_SQL}{where_sql}{}",
            sort.order_by_clause()
        );
        if let Some((limit, offset)) = bounds {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Value::Integer(limit));
            binds.push(Value::Integer(offset));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut content = Vec::new();
        while let Some(row) = rows.next()? {
            content.push(parse_member_team_row(row)?);
        }
        Ok(content)
    }

    fn count_matching(&self, filter: &Filter, join_team: bool) -> RepoResult<u64> {
        let (where_sql, binds) = filter.where_clause();
        let from_sql = if join_team {
            MEMBER_TEAM_FROM_SQL
        } else {
            " FROM member m"
        };
        let sql = format!("SELECT COUNT(*){from_sql}{where_sql}");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        count_to_u64(count)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save_member(&self, member: &NewMember) -> RepoResult<MemberId> {
        if let Some(team_id) = member.team_id {
            if !team_exists(self.conn, team_id)? {
                return Err(RepoError::TeamNotFound(team_id));
            }
        }

        self.conn.execute(
            "INSERT INTO member (username, age, team_id) VALUES (?1, ?2, ?3);",
            params![member.username.as_str(), member.age, member.team_id],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!(
            "event=member_save module=repo status=ok member_id={} has_team={}",
            id,
            member.team_id.is_some()
        );
        Ok(id)
    }

    fn find_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE m.member_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn find_all_members(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("{MEMBER_SELECT_SQL} ORDER BY m.member_id ASC"),
            Vec::new(),
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.query_members(
            &format!("{MEMBER_SELECT_SQL} WHERE m.username = ? ORDER BY m.member_id ASC"),
            vec![Value::Text(username.to_string())],
        )
    }

    fn find_all_by(&self, predicate: &Predicate) -> RepoResult<Vec<Member>> {
        let filter = Filter::from(predicate.clone());
        let (where_sql, binds) = filter.where_clause();
        let join_sql = if filter.references_team() {
            " LEFT JOIN team t ON t.team_id = m.team_id"
        } else {
            ""
        };
        self.query_members(
            &format!("{MEMBER_SELECT_SQL}{join_sql}{where_sql} ORDER BY m.member_id ASC"),
            binds,
        )
    }

    fn count_members(&self) -> RepoResult<u64> {
        self.count_matching(&Filter::new(), false)
    }

    fn change_team(&self, member_id: MemberId, team_id: Option<TeamId>) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let previous: Option<Option<TeamId>> = tx
            .query_row(
                "SELECT team_id FROM member WHERE member_id = ?1;",
                [member_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(previous) = previous else {
            return Err(RepoError::NotFound(member_id));
        };

        if let Some(team_id) = team_id {
            if !team_exists(&tx, team_id)? {
                return Err(RepoError::TeamNotFound(team_id));
            }
        }

        tx.execute(
            "UPDATE member SET team_id = ?2 WHERE member_id = ?1;",
            params![member_id, team_id],
        )?;
        tx.commit()?;

        debug!(
            "event=member_change_team module=repo status=ok member_id={} from_team={} to_team={}",
            member_id,
            display_team(previous),
            display_team(team_id)
        );
        Ok(())
    }

    fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>> {
        let started_at = Instant::now();
        let filter = condition.to_filter();
        let content = self.query_member_team_rows(&filter, &Sort::unsorted(), None)?;

        debug!(
            "event=member_search module=repo status=ok predicates={} rows={} duration_ms={}",
            filter.predicates().len(),
            content.len(),
            started_at.elapsed().as_millis()
        );
        Ok(content)
    }

    fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberTeamDto>> {
        let started_at = Instant::now();
        let (limit, offset) = page_bounds(request)?;
        let filter = condition.to_filter();
        let (where_sql, mut binds) = filter.where_clause();

        let sql = format!(
            "{MEMBER_TEAM_SELECT_SQL},
    COUNT(*) OVER () AS total_count{MEMBER_TEAM_FROM_SQL}{where_sql}{} LIMIT ? OFFSET ?",
            request.sort.order_by_clause()
        );
        binds.push(Value::Integer(limit));
        binds.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut content = Vec::new();
        let mut windowed_total: Option<i64> = None;
        while let Some(row) = rows.next()? {
            if windowed_total.is_none() {
                windowed_total = Some(row.get("total_count")?);
            }
            content.push(parse_member_team_row(row)?);
        }

        // An empty window carries no count; only a page past the end needs one.
        let (total, count_query) = match windowed_total {
            Some(total) => (count_to_u64(total)?, "window"),
            None if offset == 0 => (0, "skipped"),
            None => (self.count_matching(&filter, true)?, "issued"),
        };

        debug!(
            "event=member_page module=repo status=ok strategy=simple page={} size={} rows={} total={} count_query={} duration_ms={}",
            request.page,
            request.size,
            content.len(),
            total,
            count_query,
            started_at.elapsed().as_millis()
        );
        Ok(Page::new(content, request.clone(), total))
    }

    fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberTeamDto>> {
        let started_at = Instant::now();
        let bounds = page_bounds(request)?;
        let filter = condition.to_filter();

        let content = self.query_member_team_rows(&filter, &request.sort, Some(bounds))?;
        let count_skipped = derived_total(content.len(), request).is_some();
        let page = Page::with_count(content, request.clone(), || {
            self.count_matching(&filter, filter.references_team())
        })?;

        debug!(
            "event=member_page module=repo status=ok strategy=complex page={} size={} rows={} total={} count_query={} duration_ms={}",
            request.page,
            request.size,
            page.number_of_elements(),
            page.total_elements(),
            if count_skipped { "skipped" } else { "issued" },
            started_at.elapsed().as_millis()
        );
        Ok(page)
    }

    fn list_member_dtos(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberDto>> {
        let filter = condition.to_filter();
        let (where_sql, binds) = filter.where_clause();
        let sql = format!(
            "SELECT m.username AS username, m.age AS age{MEMBER_TEAM_FROM_SQL}{where_sql} ORDER BY m.member_id ASC"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut dtos = Vec::new();
        while let Some(row) = rows.next()? {
            dtos.push(MemberDto {
                username: row.get("username")?,
                age: row.get("age")?,
            });
        }
        Ok(dtos)
    }
}

fn page_bounds(request: &PageRequest) -> RepoResult<(i64, i64)> {
    if request.size == 0 {
        return Err(RepoError::InvalidPage(
            "page size must be greater than zero".to_string(),
        ));
    }

    let offset = i64::try_from(request.offset()).map_err(|_| {
        RepoError::InvalidPage(format!(
            "page offset {} exceeds storage range",
            request.offset()
        ))
    })?;
    Ok((i64::from(request.size), offset))
}

fn count_to_u64(count: i64) -> RepoResult<u64> {
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

fn display_team(team_id: Option<TeamId>) -> String {
    team_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

pub(crate) fn team_exists(conn: &Connection, team_id: TeamId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM team WHERE team_id = ?1);",
        [team_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    Ok(Member::from_parts(
        row.get("member_id")?,
        row.get("username")?,
        row.get("age")?,
        row.get("team_id")?,
    ))
}

fn parse_member_team_row(row: &Row<'_>) -> RepoResult<MemberTeamDto> {
    let team_id: Option<TeamId> = row.get("team_id")?;
    let team_name: Option<String> = row.get("team_name")?;
    if team_id.is_some() != team_name.is_some() {
        return Err(RepoError::InvalidData(format!(
            "team columns out of sync for member {}",
            row.get::<_, i64>("member_id")?
        )));
    }

    Ok(MemberTeamDto {
        member_id: row.get("member_id")?,
        username: row.get("username")?,
        age: row.get("age")?,
        team_id,
        team_name,
    })
}

/// Verifies schema version, tables and columns the repositories rely on.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 2] = [
        ("team", &["team_id", "name"]),
        ("member", &["member_id", "username", "age", "team_id"]),
    ];
    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
