//! Member/team store: connection setup, SQL functions and schema versions.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection handed to the repositories has `foreign_keys=ON`, the
//!   `fold_case` function registered and every migration applied.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod functions;
pub mod migrations;
mod open;

pub use functions::{register_functions, FOLD_CASE_FN};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading the member store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build with more migrations.
    SchemaTooNew { found: u32, supported: u32 },
    /// One migration script failed; nothing from the batch was committed.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "member store: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "member store schema v{found} is ahead of this build (v{supported}); upgrade memberquery"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "member store migration v{version} `{name}` failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
