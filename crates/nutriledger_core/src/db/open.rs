//! Connection bootstrap for the snapshot store.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - File databases get their parent directory created on demand.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens (creating if needed) a SQLite file and applies pending migrations.
///
/// # Side effects
/// - Creates the parent directory when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    bootstrap("file", || {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Connection::open(path)?)
    })
}

/// Opens an in-memory SQLite database with migrations applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", || Ok(Connection::open_in_memory()?))
}

fn bootstrap(
    mode: &'static str,
    connect: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect().and_then(|mut conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}
