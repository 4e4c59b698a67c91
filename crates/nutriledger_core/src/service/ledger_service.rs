//! Nutrition ledger use-case service.
//!
//! # Responsibility
//! - Own the whole store: goals, catalog, daily records and templates.
//! - Expose every presentation-facing operation as a synchronous method.
//! - Funnel template replay through the same entry path as direct logging.
//!
//! # Invariants
//! - "Today" always comes from the injected `Clock`.
//! - Every entry mutation leaves the owning record's totals re-summed.
//! - Unknown ids in update/delete paths are no-ops, never errors.
//! - Goals are snapshotted into a day only when that day is created.

use crate::catalog::food_catalog::FoodCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, LedgerConfig};
use crate::ledger::analytics::{summarize, trailing_window, WindowSummary};
use crate::ledger::daily_ledger::DailyLedger;
use crate::ledger::saved_meals::SavedMealBook;
use crate::model::daily::DailyNutritionRecord;
use crate::model::food::FoodItem;
use crate::model::goals::NutritionGoals;
use crate::model::meal::{EntryId, MealEntry, MealEntryUpdate, MealName, NewMealEntry};
use crate::model::template::{NewSavedMeal, SavedMealId, SavedMealTemplate, SavedMealUpdate};
use crate::repo::snapshot_repo::{
    LedgerSnapshot, RepoError, RepoResult, SnapshotRepository, SNAPSHOT_FORMAT_VERSION,
};
use chrono::NaiveDate;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for building a service from configuration or storage.
#[derive(Debug)]
pub enum LedgerServiceError {
    Config(ConfigError),
    Repo(RepoError),
}

impl Display for LedgerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for LedgerServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for LedgerServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// The nutrition store owned by the application's composition root.
pub struct NutritionService<C: Clock = SystemClock> {
    config: LedgerConfig,
    clock: C,
    goals: NutritionGoals,
    catalog: FoodCatalog,
    ledger: DailyLedger,
    saved_meals: SavedMealBook,
}

impl<C: Clock> NutritionService<C> {
    /// Creates an empty store with default configuration and goals.
    pub fn new(clock: C) -> Self {
        let config = LedgerConfig::default();
        Self {
            catalog: FoodCatalog::with_recent_limit(config.recent_limit),
            config,
            clock,
            goals: NutritionGoals::default(),
            ledger: DailyLedger::new(),
            saved_meals: SavedMealBook::new(),
        }
    }

    /// Creates an empty store with `config`.
    ///
    /// # Errors
    /// - Returns `ConfigError` when `config` fails validation.
    pub fn with_config(clock: C, config: LedgerConfig) -> Result<Self, ConfigError> {
        Self::from_snapshot(LedgerSnapshot::default(), clock, config)
    }

    /// Rebuilds a store from a decoded snapshot.
    ///
    /// Daily and template totals are re-derived from their entries, duplicate
    /// meal slots are merged and recents are re-bounded to `config`.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        clock: C,
        config: LedgerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut catalog = snapshot.catalog;
        catalog.set_recent_limit(config.recent_limit);

        Ok(Self {
            goals: snapshot.goals,
            catalog,
            ledger: DailyLedger::from_records(snapshot.daily_records),
            saved_meals: SavedMealBook::from_templates(snapshot.saved_meals),
            config,
            clock,
        })
    }

    /// Loads the store saved under `config.storage_namespace`, or starts empty.
    pub fn load_from<R: SnapshotRepository>(
        repo: &R,
        clock: C,
        config: LedgerConfig,
    ) -> Result<Self, LedgerServiceError> {
        config.validate()?;
        let snapshot = repo
            .load_snapshot(&config.storage_namespace)?
            .unwrap_or_default();
        Ok(Self::from_snapshot(snapshot, clock, config)?)
    }

    /// Persists the whole store under `config.storage_namespace`.
    pub fn save_to<R: SnapshotRepository>(&self, repo: &R) -> RepoResult<()> {
        repo.save_snapshot(&self.config.storage_namespace, &self.snapshot())
    }

    /// Serializable image of the current state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            goals: self.goals.clone(),
            catalog: self.catalog.clone(),
            daily_records: self.ledger.records().cloned().collect(),
            saved_meals: self.saved_meals.templates().to_vec(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // --- goals ---

    /// Replaces the active goals wholesale. Existing days keep their snapshot.
    pub fn set_goals(&mut self, goals: NutritionGoals) {
        self.goals = goals;
        info!("event=goals_set module=service status=ok");
    }

    pub fn goals(&self) -> &NutritionGoals {
        &self.goals
    }

    // --- catalog ---

    pub fn catalog(&self) -> &FoodCatalog {
        &self.catalog
    }

    /// Adds a looked-up or user-entered food, replacing one with the same id.
    ///
    /// Entries already logged from the old item keep their copied values.
    pub fn upsert_food(&mut self, food: FoodItem) {
        self.catalog.upsert_food(food);
    }

    pub fn remove_food(&mut self, food_id: &str) -> Option<FoodItem> {
        self.catalog.remove_food(food_id)
    }

    pub fn search_foods(&self, query: &str) -> Vec<&FoodItem> {
        self.catalog.search_foods(query)
    }

    pub fn find_food_by_barcode(&self, barcode: &str) -> Option<&FoodItem> {
        self.catalog.find_by_barcode(barcode)
    }

    pub fn add_to_recent(&mut self, food_id: &str) {
        self.catalog.add_to_recent(food_id);
    }

    /// Returns whether `food_id` is a favorite after toggling.
    pub fn toggle_favorite(&mut self, food_id: &str) -> bool {
        self.catalog.toggle_favorite(food_id)
    }

    pub fn get_recent_foods(&self) -> Vec<&FoodItem> {
        self.catalog.get_recent_foods()
    }

    pub fn get_favorite_foods(&self) -> Vec<&FoodItem> {
        self.catalog.get_favorite_foods()
    }

    // --- daily ledger ---

    /// Today's record, or `None` when nothing was logged yet today.
    pub fn get_today_nutrition(&self) -> Option<&DailyNutritionRecord> {
        self.ledger.get(self.clock.today())
    }

    pub fn get_nutrition_for_date(&self, date: NaiveDate) -> Option<&DailyNutritionRecord> {
        self.ledger.get(date)
    }

    /// Every record, oldest first.
    pub fn history(&self) -> Vec<&DailyNutritionRecord> {
        self.ledger.records().collect()
    }

    /// Logs one entry into `meal` on today's record.
    ///
    /// # Contract
    /// - Assigns a fresh id and log time.
    /// - Creates today's record (snapshotting current goals) and the meal slot
    ///   when absent.
    /// - Re-sums the record's totals, then marks the food as recent.
    /// - Performs no numeric validation.
    pub fn add_meal_entry(&mut self, meal: MealName, new: NewMealEntry) -> MealEntry {
        let today = self.clock.today();
        let now = self.clock.now_epoch_ms();
        let entry = self.ledger.add_entry(today, &self.goals, meal, new, now);
        self.catalog.add_to_recent(&entry.food_id);
        debug!(
            "event=entry_add module=service status=ok date={today} meal={meal} entry_id={}",
            entry.id
        );
        entry
    }

    /// Logs `quantity` servings of a catalog food.
    ///
    /// Returns `None` without side effects when `food_id` is not in the catalog.
    pub fn log_food(
        &mut self,
        meal: MealName,
        food_id: &str,
        quantity: f64,
    ) -> Option<MealEntry> {
        let new = NewMealEntry::from_food(self.catalog.get_food(food_id)?, quantity);
        Some(self.add_meal_entry(meal, new))
    }

    /// Applies a partial update to an entry on any day.
    ///
    /// Returns `false` and changes nothing when the id is unknown.
    pub fn update_meal_entry(&mut self, entry_id: EntryId, update: &MealEntryUpdate) -> bool {
        let changed = self.ledger.update_entry(entry_id, update);
        debug!("event=entry_update module=service status=ok entry_id={entry_id} changed={changed}");
        changed
    }

    /// Removes an entry from any day.
    ///
    /// Returns `false` and changes nothing when the id is unknown.
    pub fn remove_meal_entry(&mut self, entry_id: EntryId) -> bool {
        let removed = self.ledger.remove_entry(entry_id);
        debug!("event=entry_remove module=service status=ok entry_id={entry_id} removed={removed}");
        removed
    }

    /// Sets today's water intake to `amount_ml` (absolute, not additive).
    pub fn update_water_intake(&mut self, amount_ml: f64) {
        let today = self.clock.today();
        self.ledger.set_water(today, &self.goals, amount_ml);
    }

    /// Quick-add helper: sets today's water to current + `delta_ml`.
    pub fn add_water_intake(&mut self, delta_ml: f64) -> f64 {
        let current = self
            .get_today_nutrition()
            .map_or(0.0, |record| record.water_intake);
        let updated = current + delta_ml;
        self.update_water_intake(updated);
        updated
    }

    // --- saved meals ---

    /// Stores a template; totals are computed from its meals.
    pub fn save_meal(&mut self, new: NewSavedMeal) -> SavedMealTemplate {
        let template = self.saved_meals.save(new, self.clock.now_epoch_ms());
        info!(
            "event=saved_meal_create module=service status=ok saved_meal_id={} entries={}",
            template.id,
            template.entry_count()
        );
        template
    }

    pub fn update_saved_meal(&mut self, id: SavedMealId, update: SavedMealUpdate) -> bool {
        self.saved_meals.update(id, update)
    }

    pub fn delete_saved_meal(&mut self, id: SavedMealId) -> bool {
        self.saved_meals.delete(id)
    }

    pub fn get_saved_meal(&self, id: SavedMealId) -> Option<&SavedMealTemplate> {
        self.saved_meals.get(id)
    }

    /// Templates, most used first.
    pub fn list_saved_meals(&self) -> Vec<&SavedMealTemplate> {
        self.saved_meals.list_by_usage()
    }

    /// Replays every entry of template `id` into `meal` on today's record.
    ///
    /// # Contract
    /// - Each entry goes through `add_meal_entry` and gets a fresh identity.
    /// - The template's own entries are not modified.
    /// - `use_count` is incremented and `last_used` set to now, even when the
    ///   template holds no entries.
    /// - Unknown ids return `None` and change nothing.
    pub fn use_saved_meal(&mut self, id: SavedMealId, meal: MealName) -> Option<Vec<MealEntry>> {
        let Some(template) = self.saved_meals.get(id) else {
            debug!("event=saved_meal_use module=service status=skipped saved_meal_id={id}");
            return None;
        };
        let replay: Vec<NewMealEntry> = template
            .meals()
            .iter()
            .flat_map(|saved| saved.entries.iter().map(MealEntry::to_new))
            .collect();

        let logged: Vec<MealEntry> = replay
            .into_iter()
            .map(|new| self.add_meal_entry(meal, new))
            .collect();
        self.saved_meals.mark_used(id, self.clock.now_epoch_ms());
        info!(
            "event=saved_meal_use module=service status=ok saved_meal_id={id} meal={meal} entries={}",
            logged.len()
        );
        Some(logged)
    }

    // --- analytics ---

    /// Records from the trailing weekly window, oldest first.
    pub fn get_weekly_nutrition(&self) -> Vec<&DailyNutritionRecord> {
        trailing_window(&self.ledger, self.clock.today(), self.config.weekly_window_days)
    }

    /// Records from the trailing monthly window, oldest first.
    pub fn get_monthly_nutrition(&self) -> Vec<&DailyNutritionRecord> {
        trailing_window(&self.ledger, self.clock.today(), self.config.monthly_window_days)
    }

    pub fn weekly_summary(&self) -> WindowSummary {
        summarize(self.get_weekly_nutrition())
    }

    pub fn monthly_summary(&self) -> WindowSummary {
        summarize(self.get_monthly_nutrition())
    }
}

#[cfg(test)]
mod tests {
    use super::NutritionService;
    use crate::clock::FixedClock;
    use crate::config::{ConfigError, LedgerConfig};
    use crate::model::meal::{MealName, NewMealEntry};
    use crate::model::template::NewSavedMeal;
    use chrono::NaiveDate;

    fn service() -> NutritionService<FixedClock> {
        NutritionService::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        ))
    }

    fn new_entry(food_id: &str, calories: f64) -> NewMealEntry {
        NewMealEntry {
            food_id: food_id.to_string(),
            food_name: "Toast".to_string(),
            serving_size: "1 slice".to_string(),
            quantity: 1.0,
            calories,
            protein: 3.0,
            carbs: 15.0,
            fat: 1.0,
            fiber: None,
            sugar: None,
            sodium: None,
        }
    }

    #[test]
    fn add_meal_entry_marks_food_recent() {
        let mut service = service();
        service.add_meal_entry(MealName::Breakfast, new_entry("f1", 80.0));
        service.add_meal_entry(MealName::Breakfast, new_entry("f2", 80.0));

        assert_eq!(
            service.catalog().recent_ids(),
            ["f2".to_string(), "f1".to_string()]
        );
    }

    #[test]
    fn log_food_unknown_id_has_no_side_effects() {
        let mut service = service();
        assert!(service.log_food(MealName::Lunch, "missing", 1.0).is_none());
        assert!(service.get_today_nutrition().is_none());
        assert!(service.catalog().recent_ids().is_empty());
    }

    #[test]
    fn with_config_rejects_invalid_config() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        let config = LedgerConfig {
            recent_limit: 0,
            ..LedgerConfig::default()
        };
        let err = NutritionService::with_config(clock, config).err().unwrap();
        assert_eq!(err, ConfigError::ZeroLimit("recent_limit"));
    }

    #[test]
    fn custom_recent_limit_is_honored() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        let config = LedgerConfig {
            recent_limit: 3,
            ..LedgerConfig::default()
        };
        let mut service = NutritionService::with_config(clock, config).unwrap();
        for idx in 0..6 {
            service.add_to_recent(&format!("f{idx}"));
        }
        assert_eq!(service.catalog().recent_ids().len(), 3);
        assert_eq!(service.catalog().recent_ids()[0], "f5");
    }

    #[test]
    fn use_saved_meal_distinguishes_empty_template_from_unknown_id() {
        let mut service = service();
        let empty = service.save_meal(NewSavedMeal::from_meals("Empty", Vec::new()));

        let replayed = service.use_saved_meal(empty.id, MealName::Lunch);
        assert_eq!(replayed, Some(Vec::new()));
        let stored = service.get_saved_meal(empty.id).unwrap();
        assert_eq!(stored.use_count(), 1);
        assert!(stored.last_used.is_some());
        assert!(service.get_today_nutrition().is_none());

        assert_eq!(
            service.use_saved_meal(uuid::Uuid::new_v4(), MealName::Lunch),
            None
        );
        assert_eq!(service.get_saved_meal(empty.id).unwrap().use_count(), 1);
    }
}
