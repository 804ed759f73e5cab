//! Application-defined SQL functions.

use crate::db::DbResult;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Unicode lowercase; SQLite's built-in `LOWER` only folds ASCII.
pub const FOLD_CASE_FN: &str = "fold_case";

/// Registers the store's SQL functions on `conn`.
///
/// `open_db` and `open_db_in_memory` already call this; connections opened
/// elsewhere must call it before running member searches.
pub fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
    )?;
    Ok(())
}
