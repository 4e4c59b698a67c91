//! Ledger tuning knobs.
//!
//! # Responsibility
//! - Hold the bounded-list and analytics-window sizes used by the ledger.
//! - Name the storage namespace under which the whole store is persisted.
//!
//! # Invariants
//! - Limits and window sizes are strictly positive.
//! - `storage_namespace` is non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of recent food ids kept by the catalog.
pub const DEFAULT_RECENT_LIMIT: usize = 10;
/// Trailing days covered by the weekly window.
pub const DEFAULT_WEEKLY_WINDOW_DAYS: u32 = 7;
/// Trailing days covered by the monthly window.
pub const DEFAULT_MONTHLY_WINDOW_DAYS: u32 = 30;
/// Namespace key of the persisted store blob.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "nutrition-storage";

/// Runtime configuration for a ledger store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub recent_limit: usize,
    pub weekly_window_days: u32,
    pub monthly_window_days: u32,
    pub storage_namespace: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            weekly_window_days: DEFAULT_WEEKLY_WINDOW_DAYS,
            monthly_window_days: DEFAULT_MONTHLY_WINDOW_DAYS,
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Checks that every knob is usable.
    ///
    /// # Errors
    /// - Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_limit == 0 {
            return Err(ConfigError::ZeroLimit("recent_limit"));
        }
        if self.weekly_window_days == 0 {
            return Err(ConfigError::ZeroLimit("weekly_window_days"));
        }
        if self.monthly_window_days == 0 {
            return Err(ConfigError::ZeroLimit("monthly_window_days"));
        }
        if self.storage_namespace.trim().is_empty() {
            return Err(ConfigError::BlankNamespace);
        }
        Ok(())
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroLimit(&'static str),
    BlankNamespace,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLimit(field) => write!(f, "config field `{field}` must be greater than 0"),
            Self::BlankNamespace => write!(f, "storage_namespace cannot be blank"),
        }
    }
}

impl Error for ConfigError {}
