//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level ledger functions to Dart via FRB.
//! - Load the persisted store per call and save it back after mutations.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One load-modify-save cycle runs at a time within the process.
//! - Unknown ids are reported as `ok=true, changed=false`, never as failures.
//! - Read-only calls never save the store back.

use nutriledger_core::db::open_db;
use nutriledger_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Clock, DailyNutritionRecord, EntryId, FoodItem, LedgerConfig, Meal, MealEntry,
    MealEntryUpdate, MealName, NewMealEntry, NewSavedMeal, NutritionGoals, NutritionService,
    SavedMealId, SavedMealTemplate, SavedMealUpdate, SqliteSnapshotRepository, SystemClock,
    WindowSummary,
};
use log::warn;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const LEDGER_DB_FILE_NAME: &str = "nutriledger.sqlite3";
static LEDGER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static LEDGER_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Caller-supplied entry values, already multiplied by `quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntryInput {
    pub food_id: String,
    pub food_name: String,
    pub serving_size: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl From<LedgerEntryInput> for NewMealEntry {
    fn from(value: LedgerEntryInput) -> Self {
        Self {
            food_id: value.food_id,
            food_name: value.food_name,
            serving_size: value.serving_size,
            quantity: value.quantity,
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
        }
    }
}

/// Generic action response envelope for ledger commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    /// Whether the call completed (storage and input parsing succeeded).
    pub ok: bool,
    /// Whether the call changed or resolved anything.
    pub changed: bool,
    /// Ids created by the call, in log order.
    pub ids: Vec<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, changed: bool, ids: Vec<String>) -> Self {
        Self {
            ok: true,
            changed,
            ids,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// One logged entry as shown in the day view.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntryView {
    pub entry_id: String,
    pub food_id: String,
    pub food_name: String,
    pub serving_size: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub logged_at: i64,
}

/// One meal slot (`breakfast|lunch|dinner|snacks`) with its entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMealView {
    pub name: String,
    pub entries: Vec<LedgerEntryView>,
}

/// Today's record, or an empty day when nothing was logged yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDayResponse {
    pub ok: bool,
    /// `YYYY-MM-DD`; empty on failure.
    pub date: String,
    pub meals: Vec<LedgerMealView>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub water_intake: f64,
    pub calorie_goal: f64,
    pub message: String,
}

impl LedgerDayResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            date: String::new(),
            meals: Vec::new(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            water_intake: 0.0,
            calorie_goal: 0.0,
            message: message.into(),
        }
    }
}

/// Logs one entry into `meal` on today's record.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `meal` is case-insensitive; unknown names fail without touching storage.
/// - Returns the created entry id in `ids`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_add_entry(meal: String, entry: LedgerEntryInput) -> LedgerActionResponse {
    let meal = match meal.parse::<MealName>() {
        Ok(meal) => meal,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_add_entry failed: {err}"))
        }
    };
    match with_service(|service| service.add_meal_entry(meal, entry.into())) {
        Ok(created) => {
            LedgerActionResponse::success("Entry logged.", true, vec![created.id.to_string()])
        }
        Err(err) => LedgerActionResponse::failure(format!("ledger_add_entry failed: {err}")),
    }
}

/// Removes an entry from any day.
///
/// # FFI contract
/// - Malformed ids fail; well-formed unknown ids are a no-op (`changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_remove_entry(entry_id: String) -> LedgerActionResponse {
    let entry_id: EntryId = match parse_id(&entry_id) {
        Ok(id) => id,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_remove_entry failed: {err}"))
        }
    };
    match with_service(|service| service.remove_meal_entry(entry_id)) {
        Ok(true) => LedgerActionResponse::success("Entry removed.", true, Vec::new()),
        Ok(false) => LedgerActionResponse::success("No matching entry.", false, Vec::new()),
        Err(err) => LedgerActionResponse::failure(format!("ledger_remove_entry failed: {err}")),
    }
}

/// Sets today's water intake in millilitres (absolute, not additive).
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_set_water(amount_ml: f64) -> LedgerActionResponse {
    match with_service(|service| service.update_water_intake(amount_ml)) {
        Ok(()) => LedgerActionResponse::success("Water intake updated.", true, Vec::new()),
        Err(err) => LedgerActionResponse::failure(format!("ledger_set_water failed: {err}")),
    }
}

/// Reads today's record without creating it.
///
/// # FFI contract
/// - Sync call, read-only DB access.
/// - Days with nothing logged report zero totals and the active goals.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_today() -> LedgerDayResponse {
    let result = with_service_read(|service| match service.get_today_nutrition() {
        Some(record) => to_day_response(record),
        None => LedgerDayResponse {
            ok: true,
            date: service.clock().today().to_string(),
            meals: Vec::new(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            water_intake: 0.0,
            calorie_goal: service.goals().calories,
            message: "Nothing logged today.".to_string(),
        },
    });
    result.unwrap_or_else(|err| LedgerDayResponse::failure(format!("ledger_today failed: {err}")))
}

/// Adds or removes `food_id` from favorites.
///
/// `changed` reports whether the food is a favorite after the call.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_toggle_favorite(food_id: String) -> LedgerActionResponse {
    let food_id = food_id.trim().to_string();
    if food_id.is_empty() {
        return LedgerActionResponse::failure("ledger_toggle_favorite failed: food_id is empty");
    }
    match with_service(|service| service.toggle_favorite(&food_id)) {
        Ok(true) => LedgerActionResponse::success("Added to favorites.", true, Vec::new()),
        Ok(false) => LedgerActionResponse::success("Removed from favorites.", false, Vec::new()),
        Err(err) => LedgerActionResponse::failure(format!("ledger_toggle_favorite failed: {err}")),
    }
}

/// Replays a saved meal into `meal` on today's record.
///
/// # FFI contract
/// - Returns the fresh entry ids in `ids`.
/// - Any known template counts as a use (`changed=true`), even one with no entries.
/// - Unknown template ids are a no-op (`changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_use_saved_meal(saved_meal_id: String, meal: String) -> LedgerActionResponse {
    let parsed = parse_id(&saved_meal_id).and_then(|id: SavedMealId| {
        meal.parse::<MealName>()
            .map(|meal| (id, meal))
            .map_err(|err| err.to_string())
    });
    let (saved_meal_id, meal) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_use_saved_meal failed: {err}"))
        }
    };
    match with_service(|service| service.use_saved_meal(saved_meal_id, meal)) {
        Ok(None) => LedgerActionResponse::success("No matching saved meal.", false, Vec::new()),
        Ok(Some(logged)) => {
            let ids: Vec<String> = logged.iter().map(|entry| entry.id.to_string()).collect();
            LedgerActionResponse::success(format!("Logged {} entr(ies).", ids.len()), true, ids)
        }
        Err(err) => LedgerActionResponse::failure(format!("ledger_use_saved_meal failed: {err}")),
    }
}

/// Partial edit of a logged entry; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerEntryUpdateInput {
    pub food_name: Option<String>,
    pub serving_size: Option<String>,
    pub quantity: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl From<LedgerEntryUpdateInput> for MealEntryUpdate {
    fn from(value: LedgerEntryUpdateInput) -> Self {
        Self {
            food_name: value.food_name,
            serving_size: value.serving_size,
            quantity: value.quantity,
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
        }
    }
}

/// Edits an entry on any day; the owning day's totals are re-summed.
///
/// # FFI contract
/// - Malformed ids fail; well-formed unknown ids are a no-op (`changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_update_entry(
    entry_id: String,
    update: LedgerEntryUpdateInput,
) -> LedgerActionResponse {
    let entry_id: EntryId = match parse_id(&entry_id) {
        Ok(id) => id,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_update_entry failed: {err}"))
        }
    };
    let update = MealEntryUpdate::from(update);
    match with_service(|service| service.update_meal_entry(entry_id, &update)) {
        Ok(true) => LedgerActionResponse::success("Entry updated.", true, Vec::new()),
        Ok(false) => LedgerActionResponse::success("No matching entry.", false, Vec::new()),
        Err(err) => LedgerActionResponse::failure(format!("ledger_update_entry failed: {err}")),
    }
}

/// Daily targets as exchanged with Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub water: Option<f64>,
}

impl From<LedgerGoals> for NutritionGoals {
    fn from(value: LedgerGoals) -> Self {
        Self {
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
            water: value.water,
        }
    }
}

impl From<&NutritionGoals> for LedgerGoals {
    fn from(value: &NutritionGoals) -> Self {
        Self {
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
            water: value.water,
        }
    }
}

/// Goals read envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerGoalsResponse {
    pub ok: bool,
    /// `None` on failure.
    pub goals: Option<LedgerGoals>,
    pub message: String,
}

/// Replaces the active goals. Days already created keep their snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_set_goals(goals: LedgerGoals) -> LedgerActionResponse {
    match with_service(|service| service.set_goals(goals.into())) {
        Ok(()) => LedgerActionResponse::success("Goals updated.", true, Vec::new()),
        Err(err) => LedgerActionResponse::failure(format!("ledger_set_goals failed: {err}")),
    }
}

/// Reads the active goals.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_get_goals() -> LedgerGoalsResponse {
    match with_service_read(|service| LedgerGoals::from(service.goals())) {
        Ok(goals) => LedgerGoalsResponse {
            ok: true,
            goals: Some(goals),
            message: String::new(),
        },
        Err(err) => LedgerGoalsResponse {
            ok: false,
            goals: None,
            message: format!("ledger_get_goals failed: {err}"),
        },
    }
}

/// Catalog item as exchanged with Dart; values are per serving.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerFood {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: String,
    pub serving_size_grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub is_custom: bool,
    pub barcode: Option<String>,
}

impl From<LedgerFood> for FoodItem {
    fn from(value: LedgerFood) -> Self {
        Self {
            id: value.id,
            name: value.name,
            brand: value.brand,
            serving_size: value.serving_size,
            serving_size_grams: value.serving_size_grams,
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
            is_custom: value.is_custom,
            barcode: value.barcode,
        }
    }
}

impl From<&FoodItem> for LedgerFood {
    fn from(value: &FoodItem) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            brand: value.brand.clone(),
            serving_size: value.serving_size.clone(),
            serving_size_grams: value.serving_size_grams,
            calories: value.calories,
            protein: value.protein,
            carbs: value.carbs,
            fat: value.fat,
            fiber: value.fiber,
            sugar: value.sugar,
            sodium: value.sodium,
            is_custom: value.is_custom,
            barcode: value.barcode.clone(),
        }
    }
}

/// Food list envelope for search, recents and favorites.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerFoodListResponse {
    pub ok: bool,
    pub foods: Vec<LedgerFood>,
    pub message: String,
}

impl LedgerFoodListResponse {
    fn from_result(op: &str, result: Result<Vec<LedgerFood>, String>) -> Self {
        match result {
            Ok(foods) => Self {
                ok: true,
                message: format!("Found {} food(s).", foods.len()),
                foods,
            },
            Err(err) => Self {
                ok: false,
                foods: Vec::new(),
                message: format!("{op} failed: {err}"),
            },
        }
    }
}

/// Adds a user-entered or looked-up food, replacing one with the same id.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_upsert_food(food: LedgerFood) -> LedgerActionResponse {
    if food.id.trim().is_empty() {
        return LedgerActionResponse::failure("ledger_upsert_food failed: food id is empty");
    }
    let food_id = food.id.clone();
    match with_service(|service| service.upsert_food(food.into())) {
        Ok(()) => LedgerActionResponse::success("Food saved.", true, vec![food_id]),
        Err(err) => LedgerActionResponse::failure(format!("ledger_upsert_food failed: {err}")),
    }
}

/// Case-insensitive substring search over catalog names and brands.
///
/// A blank query returns no foods.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_search_foods(query: String) -> LedgerFoodListResponse {
    let result = with_service_read(|service| to_food_list(service.search_foods(&query)));
    LedgerFoodListResponse::from_result("ledger_search_foods", result)
}

/// Recently logged foods, most recent first.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_recent_foods() -> LedgerFoodListResponse {
    let result = with_service_read(|service| to_food_list(service.get_recent_foods()));
    LedgerFoodListResponse::from_result("ledger_recent_foods", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_favorite_foods() -> LedgerFoodListResponse {
    let result = with_service_read(|service| to_food_list(service.get_favorite_foods()));
    LedgerFoodListResponse::from_result("ledger_favorite_foods", result)
}

/// One meal slot of a template being saved.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSavedMealSlot {
    /// `breakfast|lunch|dinner|snacks`, case-insensitive.
    pub meal: String,
    pub entries: Vec<LedgerEntryInput>,
}

/// Saved meal as listed for Dart; totals are derived from its entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSavedMealView {
    pub saved_meal_id: String,
    pub name: String,
    pub description: Option<String>,
    pub entry_count: u32,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub use_count: u32,
    pub created_at: i64,
    pub last_used: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSavedMealListResponse {
    pub ok: bool,
    /// Most used first.
    pub items: Vec<LedgerSavedMealView>,
    pub message: String,
}

/// Stores a reusable template.
///
/// # FFI contract
/// - Rejects blank names, unknown meal names and templates without entries.
/// - Slots naming the same meal are merged.
/// - Returns the template id in `ids`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_save_meal(
    name: String,
    description: Option<String>,
    slots: Vec<LedgerSavedMealSlot>,
) -> LedgerActionResponse {
    let name = name.trim().to_string();
    if name.is_empty() {
        return LedgerActionResponse::failure("ledger_save_meal failed: name is empty");
    }
    let slots = match parse_slots(slots) {
        Ok(slots) => slots,
        Err(err) => return LedgerActionResponse::failure(format!("ledger_save_meal failed: {err}")),
    };

    let saved = with_service(|service| {
        let logged_at = service.clock().now_epoch_ms();
        let meals = slots
            .into_iter()
            .map(|(meal, entries)| Meal {
                name: meal,
                entries: entries
                    .into_iter()
                    .map(|entry| MealEntry::from_new(entry, logged_at))
                    .collect(),
            })
            .collect();
        service.save_meal(NewSavedMeal {
            name,
            description,
            meals,
        })
    });
    match saved {
        Ok(template) => {
            LedgerActionResponse::success("Meal saved.", true, vec![template.id.to_string()])
        }
        Err(err) => LedgerActionResponse::failure(format!("ledger_save_meal failed: {err}")),
    }
}

/// Renames a template or replaces its description; `None` keeps the field.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_update_saved_meal(
    saved_meal_id: String,
    name: Option<String>,
    description: Option<String>,
) -> LedgerActionResponse {
    let saved_meal_id: SavedMealId = match parse_id(&saved_meal_id) {
        Ok(id) => id,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_update_saved_meal failed: {err}"))
        }
    };
    let name = name.map(|name| name.trim().to_string());
    if name.as_deref() == Some("") {
        return LedgerActionResponse::failure("ledger_update_saved_meal failed: name is empty");
    }
    let update = SavedMealUpdate {
        name,
        description,
        meals: None,
    };
    match with_service(|service| service.update_saved_meal(saved_meal_id, update)) {
        Ok(true) => LedgerActionResponse::success("Saved meal updated.", true, Vec::new()),
        Ok(false) => LedgerActionResponse::success("No matching saved meal.", false, Vec::new()),
        Err(err) => {
            LedgerActionResponse::failure(format!("ledger_update_saved_meal failed: {err}"))
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_delete_saved_meal(saved_meal_id: String) -> LedgerActionResponse {
    let saved_meal_id: SavedMealId = match parse_id(&saved_meal_id) {
        Ok(id) => id,
        Err(err) => {
            return LedgerActionResponse::failure(format!("ledger_delete_saved_meal failed: {err}"))
        }
    };
    match with_service(|service| service.delete_saved_meal(saved_meal_id)) {
        Ok(true) => LedgerActionResponse::success("Saved meal deleted.", true, Vec::new()),
        Ok(false) => LedgerActionResponse::success("No matching saved meal.", false, Vec::new()),
        Err(err) => {
            LedgerActionResponse::failure(format!("ledger_delete_saved_meal failed: {err}"))
        }
    }
}

/// Lists templates, most used first.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_list_saved_meals() -> LedgerSavedMealListResponse {
    let result = with_service_read(|service| {
        service
            .list_saved_meals()
            .into_iter()
            .map(to_saved_meal_view)
            .collect::<Vec<_>>()
    });
    match result {
        Ok(items) => LedgerSavedMealListResponse {
            ok: true,
            message: format!("{} saved meal(s).", items.len()),
            items,
        },
        Err(err) => LedgerSavedMealListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("ledger_list_saved_meals failed: {err}"),
        },
    }
}

/// Rolled-up figures for a trailing window of days.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummaryResponse {
    pub ok: bool,
    /// Days inside the window that have a record.
    pub days_logged: u32,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_water: f64,
    /// Averages over logged days; zero when nothing was logged.
    pub average_calories: f64,
    pub average_protein: f64,
    pub average_carbs: f64,
    pub average_fat: f64,
    pub average_water: f64,
    pub message: String,
}

impl LedgerSummaryResponse {
    fn from_result(op: &str, result: Result<WindowSummary, String>) -> Self {
        let (ok, summary, message) = match result {
            Ok(summary) => (
                true,
                summary,
                format!("{} day(s) logged.", summary.days_logged),
            ),
            Err(err) => (false, WindowSummary::default(), format!("{op} failed: {err}")),
        };
        Self {
            ok,
            days_logged: u32::try_from(summary.days_logged).unwrap_or(u32::MAX),
            total_calories: summary.total_calories,
            total_protein: summary.total_protein,
            total_carbs: summary.total_carbs,
            total_fat: summary.total_fat,
            total_water: summary.total_water,
            average_calories: summary.average_calories,
            average_protein: summary.average_protein,
            average_carbs: summary.average_carbs,
            average_fat: summary.average_fat,
            average_water: summary.average_water,
            message,
        }
    }
}

/// Summary of the trailing weekly window ending today.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_weekly_summary() -> LedgerSummaryResponse {
    let result = with_service_read(|service| service.weekly_summary());
    LedgerSummaryResponse::from_result("ledger_weekly_summary", result)
}

/// Summary of the trailing monthly window ending today.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_monthly_summary() -> LedgerSummaryResponse {
    let result = with_service_read(|service| service.monthly_summary());
    LedgerSummaryResponse::from_result("ledger_monthly_summary", result)
}

/// Parses slot meal names and merges slots that name the same meal.
fn parse_slots(
    slots: Vec<LedgerSavedMealSlot>,
) -> Result<Vec<(MealName, Vec<NewMealEntry>)>, String> {
    let mut parsed: Vec<(MealName, Vec<NewMealEntry>)> = Vec::new();
    for slot in slots {
        let meal = slot.meal.parse::<MealName>().map_err(|err| err.to_string())?;
        let entries = slot.entries.into_iter().map(NewMealEntry::from);
        match parsed.iter_mut().find(|(name, _)| *name == meal) {
            Some((_, existing)) => existing.extend(entries),
            None => parsed.push((meal, entries.collect())),
        }
    }
    parsed.retain(|(_, entries)| !entries.is_empty());
    if parsed.is_empty() {
        return Err("saved meal needs at least one entry".to_string());
    }
    Ok(parsed)
}

fn to_food_list(foods: Vec<&FoodItem>) -> Vec<LedgerFood> {
    foods.into_iter().map(LedgerFood::from).collect()
}

fn to_saved_meal_view(template: &SavedMealTemplate) -> LedgerSavedMealView {
    let totals = template.totals();
    LedgerSavedMealView {
        saved_meal_id: template.id.to_string(),
        name: template.name.clone(),
        description: template.description.clone(),
        entry_count: u32::try_from(template.entry_count()).unwrap_or(u32::MAX),
        calories: totals.calories,
        protein: totals.protein,
        carbs: totals.carbs,
        fat: totals.fat,
        use_count: template.use_count(),
        created_at: template.created_at,
        last_used: template.last_used,
    }
}

fn parse_id(raw: &str) -> Result<uuid::Uuid, String> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid id `{}`: {err}", raw.trim()))
}

fn resolve_ledger_db_path() -> PathBuf {
    LEDGER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("NUTRILEDGER_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LEDGER_DB_FILE_NAME)
        })
        .clone()
}

/// Runs `f` against the persisted store and saves the result.
fn with_service<T>(f: impl FnOnce(&mut NutritionService) -> T) -> Result<T, String> {
    let _guard = LEDGER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_ledger_db_path();
    let conn = open_db(&db_path).map_err(|err| stage_failure("open", err))?;
    let repo = SqliteSnapshotRepository::new(&conn);
    let mut service = NutritionService::load_from(&repo, SystemClock, LedgerConfig::default())
        .map_err(|err| stage_failure("load", err))?;
    let value = f(&mut service);
    service
        .save_to(&repo)
        .map_err(|err| stage_failure("save", err))?;
    Ok(value)
}

fn with_service_read<T>(f: impl FnOnce(&NutritionService) -> T) -> Result<T, String> {
    let _guard = LEDGER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_ledger_db_path();
    let conn = open_db(&db_path).map_err(|err| stage_failure("open", err))?;
    let repo = SqliteSnapshotRepository::new(&conn);
    let service = NutritionService::load_from(&repo, SystemClock, LedgerConfig::default())
        .map_err(|err| stage_failure("load", err))?;
    Ok(f(&service))
}

fn stage_failure(stage: &'static str, err: impl Display) -> String {
    warn!("event=ffi_ledger_call module=ffi status=error stage={stage}");
    format!("ledger {stage} failed: {err}")
}

fn to_day_response(record: &DailyNutritionRecord) -> LedgerDayResponse {
    let totals = record.totals();
    LedgerDayResponse {
        ok: true,
        date: record.date.to_string(),
        meals: record
            .meals()
            .iter()
            .map(|meal| LedgerMealView {
                name: meal.name.as_str().to_string(),
                entries: meal
                    .entries
                    .iter()
                    .map(|entry| LedgerEntryView {
                        entry_id: entry.id.to_string(),
                        food_id: entry.food_id.clone(),
                        food_name: entry.food_name.clone(),
                        serving_size: entry.serving_size.clone(),
                        quantity: entry.quantity,
                        calories: entry.calories,
                        protein: entry.protein,
                        carbs: entry.carbs,
                        fat: entry.fat,
                        logged_at: entry.logged_at,
                    })
                    .collect(),
            })
            .collect(),
        calories: totals.calories,
        protein: totals.protein,
        carbs: totals.carbs,
        fat: totals.fat,
        water_intake: record.water_intake,
        calorie_goal: record.goals().calories,
        message: format!("{} entr(ies) today.", record.entry_count()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ledger_add_entry, ledger_delete_saved_meal,
        ledger_favorite_foods, ledger_get_goals, ledger_list_saved_meals, ledger_monthly_summary,
        ledger_recent_foods, ledger_remove_entry, ledger_save_meal, ledger_search_foods,
        ledger_set_goals, ledger_set_water, ledger_today, ledger_toggle_favorite,
        ledger_update_entry, ledger_update_saved_meal, ledger_upsert_food, ledger_use_saved_meal,
        ledger_weekly_summary, ping, LedgerEntryInput, LedgerEntryUpdateInput, LedgerFood,
        LedgerGoals, LedgerSavedMealSlot,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_entry_shows_up_in_today_and_can_be_removed() {
        let food_id = unique_token("ffi-add");
        let created = ledger_add_entry("Lunch".to_string(), entry_input(&food_id, 420.0));
        assert!(created.ok, "{}", created.message);
        assert!(created.changed);
        let entry_id = created.ids[0].clone();

        let today = ledger_today();
        assert!(today.ok, "{}", today.message);
        let lunch = today
            .meals
            .iter()
            .find(|meal| meal.name == "lunch")
            .expect("lunch slot should exist");
        let logged = lunch
            .entries
            .iter()
            .find(|entry| entry.entry_id == entry_id)
            .expect("created entry should be listed");
        assert_eq!(logged.food_id, food_id);
        assert_eq!(logged.calories, 420.0);
        assert!(today.calories >= 420.0);

        let removed = ledger_remove_entry(entry_id.clone());
        assert!(removed.ok && removed.changed, "{}", removed.message);
        let again = ledger_remove_entry(entry_id);
        assert!(again.ok);
        assert!(!again.changed);
    }

    #[test]
    fn add_entry_rejects_unknown_meal_name() {
        let response = ledger_add_entry("brunch".to_string(), entry_input("f1", 100.0));
        assert!(!response.ok);
        assert!(response.message.contains("brunch"));
    }

    #[test]
    fn remove_entry_rejects_malformed_id() {
        let response = ledger_remove_entry("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid id"));
    }

    #[test]
    fn set_water_is_absolute() {
        assert!(ledger_set_water(750.0).ok);
        assert!(ledger_set_water(500.0).ok);
        let today = ledger_today();
        assert!(today.ok, "{}", today.message);
        assert_eq!(today.water_intake, 500.0);
    }

    #[test]
    fn toggle_favorite_flips_membership() {
        let food_id = unique_token("ffi-fav");
        let first = ledger_toggle_favorite(food_id.clone());
        assert!(first.ok && first.changed, "{}", first.message);
        let second = ledger_toggle_favorite(food_id);
        assert!(second.ok);
        assert!(!second.changed);
        assert!(!ledger_toggle_favorite("  ".to_string()).ok);
    }

    #[test]
    fn use_saved_meal_unknown_id_is_a_no_op() {
        let response = ledger_use_saved_meal(
            "00000000-0000-4000-8000-000000000000".to_string(),
            "dinner".to_string(),
        );
        assert!(response.ok, "{}", response.message);
        assert!(!response.changed);
        assert!(response.ids.is_empty());

        let malformed = ledger_use_saved_meal("nope".to_string(), "dinner".to_string());
        assert!(!malformed.ok);
    }

    #[test]
    fn saved_meal_lifecycle_reports_real_use() {
        let name = unique_token("ffi-template");
        let saved = ledger_save_meal(
            name.clone(),
            Some("weekday lunch".to_string()),
            vec![
                LedgerSavedMealSlot {
                    meal: "lunch".to_string(),
                    entries: vec![entry_input("f-rice", 300.0)],
                },
                LedgerSavedMealSlot {
                    meal: "LUNCH".to_string(),
                    entries: vec![entry_input("f-beans", 200.0)],
                },
            ],
        );
        assert!(saved.ok && saved.changed, "{}", saved.message);
        let saved_meal_id = saved.ids[0].clone();

        let listed = ledger_list_saved_meals();
        let view = listed
            .items
            .iter()
            .find(|item| item.saved_meal_id == saved_meal_id)
            .expect("saved meal should be listed");
        assert_eq!(view.name, name);
        assert_eq!(view.entry_count, 2);
        assert_eq!(view.calories, 500.0);
        assert_eq!(view.use_count, 0);

        let used = ledger_use_saved_meal(saved_meal_id.clone(), "dinner".to_string());
        assert!(used.ok && used.changed, "{}", used.message);
        assert_eq!(used.ids.len(), 2);

        let renamed = ledger_update_saved_meal(
            saved_meal_id.clone(),
            Some(format!("{name}-renamed")),
            None,
        );
        assert!(renamed.ok && renamed.changed, "{}", renamed.message);

        let listed = ledger_list_saved_meals();
        let view = listed
            .items
            .iter()
            .find(|item| item.saved_meal_id == saved_meal_id)
            .expect("saved meal should still be listed");
        assert_eq!(view.use_count, 1);
        assert!(view.last_used.is_some());
        assert_eq!(view.name, format!("{name}-renamed"));
        assert_eq!(view.description.as_deref(), Some("weekday lunch"));

        let deleted = ledger_delete_saved_meal(saved_meal_id.clone());
        assert!(deleted.ok && deleted.changed);
        let after = ledger_use_saved_meal(saved_meal_id, "dinner".to_string());
        assert!(after.ok);
        assert!(!after.changed);

        for id in used.ids {
            assert!(ledger_remove_entry(id).changed);
        }
    }

    #[test]
    fn save_meal_rejects_templates_without_entries() {
        let empty = ledger_save_meal(
            "Nothing".to_string(),
            None,
            vec![LedgerSavedMealSlot {
                meal: "lunch".to_string(),
                entries: Vec::new(),
            }],
        );
        assert!(!empty.ok);
        assert!(empty.message.contains("at least one entry"));

        let bad_slot = ledger_save_meal(
            "Brunch".to_string(),
            None,
            vec![LedgerSavedMealSlot {
                meal: "brunch".to_string(),
                entries: vec![entry_input("f1", 100.0)],
            }],
        );
        assert!(!bad_slot.ok);
        assert!(!ledger_save_meal("  ".to_string(), None, Vec::new()).ok);
    }

    #[test]
    fn update_entry_changes_values_and_ignores_unknown_ids() {
        let food_id = unique_token("ffi-update");
        let created = ledger_add_entry("snacks".to_string(), entry_input(&food_id, 150.0));
        assert!(created.ok, "{}", created.message);
        let entry_id = created.ids[0].clone();

        let updated = ledger_update_entry(
            entry_id.clone(),
            LedgerEntryUpdateInput {
                calories: Some(90.0),
                quantity: Some(0.5),
                ..LedgerEntryUpdateInput::default()
            },
        );
        assert!(updated.ok && updated.changed, "{}", updated.message);

        let today = ledger_today();
        let logged = today
            .meals
            .iter()
            .flat_map(|meal| meal.entries.iter())
            .find(|entry| entry.entry_id == entry_id)
            .expect("updated entry should be listed");
        assert_eq!(logged.calories, 90.0);
        assert_eq!(logged.quantity, 0.5);

        let unknown = ledger_update_entry(
            "00000000-0000-4000-8000-000000000001".to_string(),
            LedgerEntryUpdateInput::default(),
        );
        assert!(unknown.ok);
        assert!(!unknown.changed);
        assert!(!ledger_update_entry("bad".to_string(), LedgerEntryUpdateInput::default()).ok);

        assert!(ledger_remove_entry(entry_id).changed);
    }

    #[test]
    fn goals_round_trip_through_bridge() {
        let goals = LedgerGoals {
            calories: 2200.0,
            protein: 160.0,
            carbs: 240.0,
            fat: 70.0,
            fiber: Some(30.0),
            sugar: None,
            sodium: None,
            water: Some(2500.0),
        };
        let set = ledger_set_goals(goals.clone());
        assert!(set.ok, "{}", set.message);

        let read = ledger_get_goals();
        assert!(read.ok, "{}", read.message);
        assert_eq!(read.goals, Some(goals));
    }

    #[test]
    fn catalog_views_resolve_saved_foods() {
        let food_id = unique_token("ffi-food");
        let brand = unique_token("brand");
        let upserted = ledger_upsert_food(LedgerFood {
            id: food_id.clone(),
            name: "Almond Butter".to_string(),
            brand: Some(brand.clone()),
            serving_size: "2 tbsp".to_string(),
            serving_size_grams: 32.0,
            calories: 190.0,
            protein: 7.0,
            carbs: 6.0,
            fat: 17.0,
            fiber: None,
            sugar: None,
            sodium: None,
            is_custom: true,
            barcode: None,
        });
        assert!(upserted.ok, "{}", upserted.message);

        let found = ledger_search_foods(brand.to_uppercase());
        assert!(found.ok, "{}", found.message);
        assert_eq!(found.foods.len(), 1);
        assert_eq!(found.foods[0].id, food_id);
        assert!(ledger_search_foods("   ".to_string()).foods.is_empty());

        assert!(ledger_toggle_favorite(food_id.clone()).changed);
        let favorites = ledger_favorite_foods();
        assert!(favorites.foods.iter().any(|food| food.id == food_id));

        let created = ledger_add_entry("breakfast".to_string(), entry_input(&food_id, 190.0));
        assert!(created.ok, "{}", created.message);
        let recents = ledger_recent_foods();
        assert!(recents.ok, "{}", recents.message);
        assert!(recents.foods.iter().any(|food| food.id == food_id));

        assert!(!ledger_toggle_favorite(food_id).changed);
        assert!(ledger_remove_entry(created.ids[0].clone()).changed);
        assert!(!ledger_upsert_food(LedgerFood {
            id: " ".to_string(),
            ..found.foods[0].clone()
        })
        .ok);
    }

    #[test]
    fn summaries_include_today() {
        let created = ledger_add_entry(
            "dinner".to_string(),
            entry_input(&unique_token("ffi-summary"), 640.0),
        );
        assert!(created.ok, "{}", created.message);

        let weekly = ledger_weekly_summary();
        assert!(weekly.ok, "{}", weekly.message);
        assert!(weekly.days_logged >= 1);
        assert!(weekly.total_calories >= 640.0);

        let monthly = ledger_monthly_summary();
        assert!(monthly.ok, "{}", monthly.message);
        assert!(monthly.days_logged >= weekly.days_logged);

        assert!(ledger_remove_entry(created.ids[0].clone()).changed);
    }

    fn entry_input(food_id: &str, calories: f64) -> LedgerEntryInput {
        LedgerEntryInput {
            food_id: food_id.to_string(),
            food_name: "Chicken Wrap".to_string(),
            serving_size: "1 wrap".to_string(),
            quantity: 1.0,
            calories,
            protein: 30.0,
            carbs: 40.0,
            fat: 12.0,
            fiber: Some(4.0),
            sugar: None,
            sodium: None,
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
