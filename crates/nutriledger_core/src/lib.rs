//! Core domain logic for the nutrition ledger.
//! This crate is the single source of truth for ledger invariants.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::food_catalog::FoodCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, LedgerConfig};
pub use ledger::analytics::{summarize, trailing_window, WindowSummary};
pub use ledger::daily_ledger::DailyLedger;
pub use ledger::saved_meals::SavedMealBook;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::daily::DailyNutritionRecord;
pub use model::food::{FoodId, FoodItem};
pub use model::goals::NutritionGoals;
pub use model::meal::{
    EntryId, MacroTotals, Meal, MealEntry, MealEntryUpdate, MealName, MealNameParseError,
    NewMealEntry,
};
pub use model::template::{NewSavedMeal, SavedMealId, SavedMealTemplate, SavedMealUpdate};
pub use repo::snapshot_repo::{
    LedgerSnapshot, RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository,
    SNAPSHOT_FORMAT_VERSION,
};
pub use service::ledger_service::{LedgerServiceError, NutritionService};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
