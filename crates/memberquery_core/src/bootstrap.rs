//! Store bootstrap driven by [`CoreConfig`].
//!
//! # Invariants
//! - The sample roster is written in one immediate transaction: either every
//!   team and member lands, or none does.

use crate::config::{CoreConfig, Profile};
use crate::db::{open_db, open_db_in_memory};
use crate::repo::member_repo::{MemberRepository, RepoResult, SqliteMemberRepository};
use crate::repo::team_repo::SqliteTeamRepository;
use crate::service::member_service::{MemberService, SeedSummary};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Opens the configured store and, under the `local` profile, seeds the
/// sample roster when the store has no members yet.
pub fn open_store(config: &CoreConfig) -> RepoResult<Connection> {
    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    if config.profile == Profile::Local {
        let seeded = in_immediate_tx(&conn, |tx| {
            if SqliteMemberRepository::try_new(tx)?.count_members()? != 0 {
                return Ok(None);
            }
            roster_service(tx)?
                .seed_sample_roster(config.seed_count)
                .map(Some)
        })?;
        if seeded.is_none() {
            info!("event=roster_seed module=bootstrap status=skipped reason=non_empty_store");
        }
    }

    Ok(conn)
}

/// Seeds `teamA`, `teamB` and `count` members atomically.
pub fn seed_roster(conn: &Connection, count: u32) -> RepoResult<SeedSummary> {
    in_immediate_tx(conn, |tx| roster_service(tx)?.seed_sample_roster(count))
}

fn roster_service(
    conn: &Connection,
) -> RepoResult<MemberService<SqliteMemberRepository<'_>, SqliteTeamRepository<'_>>> {
    Ok(MemberService::new(
        SqliteMemberRepository::try_new(conn)?,
        SqliteTeamRepository::try_new(conn)?,
    ))
}

fn in_immediate_tx<R>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> RepoResult<R>,
) -> RepoResult<R> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    match work(&*tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            error!("event=roster_seed module=bootstrap status=rolled_back error={err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{open_store, seed_roster};
    use crate::config::{CoreConfig, Profile};
    use crate::db::{open_db, open_db_in_memory};
    use crate::repo::member_repo::{MemberRepository, SqliteMemberRepository};
    use crate::repo::team_repo::{SqliteTeamRepository, TeamRepository};
    use rusqlite::Connection;

    const BLOCK_MEMBER3: &str = "CREATE TRIGGER block_member3 BEFORE INSERT ON member
         WHEN NEW.username = 'member3'
         BEGIN SELECT RAISE(ABORT, 'member3 rejected'); END;";

    fn counts(conn: &Connection) -> (u64, usize) {
        let members = SqliteMemberRepository::try_new(conn)
            .unwrap()
            .count_members()
            .unwrap();
        let teams = SqliteTeamRepository::try_new(conn)
            .unwrap()
            .find_all_teams()
            .unwrap()
            .len();
        (members, teams)
    }

    #[test]
    fn test_profile_opens_empty_store() {
        let conn = open_store(&CoreConfig::default()).unwrap();
        assert_eq!(counts(&conn), (0, 0));
    }

    #[test]
    fn local_profile_seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            profile: Profile::Local,
            db_path: Some(dir.path().join("members.sqlite3")),
            seed_count: 6,
            ..CoreConfig::default()
        };

        {
            let conn = open_store(&config).unwrap();
            assert_eq!(counts(&conn), (6, 2));
        }

        let conn = open_store(&config).unwrap();
        assert_eq!(counts(&conn), (6, 2));
    }

    #[test]
    fn failed_seed_leaves_no_rows() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(BLOCK_MEMBER3).unwrap();

        assert!(seed_roster(&conn, 10).is_err());
        assert_eq!(counts(&conn), (0, 0));
    }

    #[test]
    fn local_profile_reseeds_after_failed_first_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.sqlite3");
        open_db(&path).unwrap().execute_batch(BLOCK_MEMBER3).unwrap();
        let config = CoreConfig {
            profile: Profile::Local,
            db_path: Some(path.clone()),
            seed_count: 10,
            ..CoreConfig::default()
        };

        assert!(open_store(&config).is_err());
        assert_eq!(counts(&open_db(&path).unwrap()), (0, 0));

        open_db(&path)
            .unwrap()
            .execute_batch("DROP TRIGGER block_member3;")
            .unwrap();
        let conn = open_store(&config).unwrap();
        assert_eq!(counts(&conn), (10, 2));
    }
}
