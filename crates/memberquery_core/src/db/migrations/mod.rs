//! Ordered schema scripts for the member/team store.
//!
//! Each step bumps `PRAGMA user_version`; all pending steps share one
//! transaction so a failed step leaves the file at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// `(version, name, script)`, strictly increasing by version.
const STEPS: &[(u32, &str, &str)] = &[
    (1, "team_and_member", include_str!("0001_init.sql")),
    (2, "team_name_index", include_str!("0002_team_name_index.sql")),
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the store up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<_> = STEPS
        .iter()
        .filter(|(version, _, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &&(version, name, script) in &pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version,
                name,
                source,
            })?;
        debug!("event=db_migrate_step module=db status=ok version={version} name={name}");
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={found} to_version={supported} steps={}",
        pending.len()
    );
    Ok(())
}
