//! Read-only date-window views over the ledger.
//!
//! # Responsibility
//! - Select records inside trailing day windows.
//! - Roll selected records into summed and averaged figures.
//!
//! # Invariants
//! - Pure: nothing is cached or mutated; every call re-reads the ledger.
//! - Windows are inclusive on both ends: `[today - days, today]`.

use crate::ledger::daily_ledger::DailyLedger;
use crate::model::daily::DailyNutritionRecord;
use chrono::{Days, NaiveDate};

/// Records dated within `days` before `today` through `today`, ascending.
pub fn trailing_window(
    ledger: &DailyLedger,
    today: NaiveDate,
    days: u32,
) -> Vec<&DailyNutritionRecord> {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    ledger.range(start..=today).collect()
}

/// Rolled-up figures for a set of daily records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowSummary {
    /// Records that contributed to the sums.
    pub days_logged: usize,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_water: f64,
    /// Per logged day; zero when `days_logged == 0`.
    pub average_calories: f64,
    pub average_protein: f64,
    pub average_carbs: f64,
    pub average_fat: f64,
    pub average_water: f64,
}

/// Sums and averages `records` over the days actually logged.
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a DailyNutritionRecord>,
) -> WindowSummary {
    let mut summary = WindowSummary::default();
    for record in records {
        let totals = record.totals();
        summary.days_logged += 1;
        summary.total_calories += totals.calories;
        summary.total_protein += totals.protein;
        summary.total_carbs += totals.carbs;
        summary.total_fat += totals.fat;
        summary.total_water += record.water_intake;
    }

    if summary.days_logged > 0 {
        let days = summary.days_logged as f64;
        summary.average_calories = summary.total_calories / days;
        summary.average_protein = summary.total_protein / days;
        summary.average_carbs = summary.total_carbs / days;
        summary.average_fat = summary.total_fat / days;
        summary.average_water = summary.total_water / days;
    }
    summary
}
