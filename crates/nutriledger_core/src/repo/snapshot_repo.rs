//! Whole-store snapshot persistence.
//!
//! # Responsibility
//! - Serialize the full ledger state as one JSON blob per storage namespace.
//! - Keep SQL and JSON details behind the `SnapshotRepository` contract.
//!
//! # Invariants
//! - One row per namespace; saving replaces the previous blob.
//! - Blobs written by a newer snapshot format are rejected, not guessed at.
//! - Loaded snapshots are not trusted for derived totals; callers re-derive.

use crate::catalog::food_catalog::FoodCatalog;
use crate::db::DbError;
use crate::model::daily::DailyNutritionRecord;
use crate::model::goals::NutritionGoals;
use crate::model::template::SavedMealTemplate;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot format written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for snapshot save/load.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidNamespace(String),
    UnsupportedFormat { found: u32, supported: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid ledger snapshot payload: {err}"),
            Self::InvalidNamespace(value) => write!(f, "invalid storage namespace: `{value}`"),
            Self::UnsupportedFormat { found, supported } => write!(
                f,
                "snapshot format {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidNamespace(_) | Self::UnsupportedFormat { .. } => None,
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

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Serializable image of the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    pub format_version: u32,
    pub goals: NutritionGoals,
    pub catalog: FoodCatalog,
    pub daily_records: Vec<DailyNutritionRecord>,
    pub saved_meals: Vec<SavedMealTemplate>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            goals: NutritionGoals::default(),
            catalog: FoodCatalog::default(),
            daily_records: Vec::new(),
            saved_meals: Vec::new(),
        }
    }
}

/// Save/load boundary for the whole-store blob.
pub trait SnapshotRepository {
    fn save_snapshot(&self, namespace: &str, snapshot: &LedgerSnapshot) -> RepoResult<()>;
    fn load_snapshot(&self, namespace: &str) -> RepoResult<Option<LedgerSnapshot>>;
    /// Returns whether a blob existed.
    fn delete_snapshot(&self, namespace: &str) -> RepoResult<bool>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn save_snapshot(&self, namespace: &str, snapshot: &LedgerSnapshot) -> RepoResult<()> {
        let namespace = normalize_namespace(namespace)?;
        let payload = serde_json::to_string(snapshot)?;

        let result = self.conn.execute(
            "INSERT INTO ledger_snapshots (namespace, payload, format_version, updated_at)
             VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT(namespace) DO UPDATE SET
                payload = excluded.payload,
                format_version = excluded.format_version,
                updated_at = excluded.updated_at;",
            params![namespace, payload, snapshot.format_version],
        );

        match result {
            Ok(_) => {
                info!(
                    "event=snapshot_save module=repo status=ok records={} templates={} bytes={}",
                    snapshot.daily_records.len(),
                    snapshot.saved_meals.len(),
                    payload.len()
                );
                Ok(())
            }
            Err(err) => {
                error!("event=snapshot_save module=repo status=error error={err}");
                Err(err.into())
            }
        }
    }

    fn load_snapshot(&self, namespace: &str) -> RepoResult<Option<LedgerSnapshot>> {
        let namespace = normalize_namespace(namespace)?;
        let row = self
            .conn
            .query_row(
                "SELECT payload, format_version FROM ledger_snapshots WHERE namespace = ?1;",
                [namespace],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;

        let Some((payload, format_version)) = row else {
            return Ok(None);
        };
        if format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormat {
                found: format_version,
                supported: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let snapshot: LedgerSnapshot = serde_json::from_str(&payload).map_err(|err| {
            error!("event=snapshot_load module=repo status=error error_code=decode_failed");
            RepoError::from(err)
        })?;
        info!(
            "event=snapshot_load module=repo status=ok records={} templates={}",
            snapshot.daily_records.len(),
            snapshot.saved_meals.len()
        );
        Ok(Some(snapshot))
    }

    fn delete_snapshot(&self, namespace: &str) -> RepoResult<bool> {
        let namespace = normalize_namespace(namespace)?;
        let changed = self.conn.execute(
            "DELETE FROM ledger_snapshots WHERE namespace = ?1;",
            [namespace],
        )?;
        Ok(changed > 0)
    }
}

fn normalize_namespace(namespace: &str) -> RepoResult<&str> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidNamespace(namespace.to_string()));
    }
    Ok(trimmed)
}
