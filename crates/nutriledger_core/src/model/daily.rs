//! Per-day nutrition aggregate.
//!
//! # Responsibility
//! - Own the meals and water intake logged on one calendar date.
//! - Keep derived totals equal to the sum of the current entries.
//!
//! # Invariants
//! - `totals` always equals the re-sum of every entry in every meal.
//! - At most one `Meal` per `MealName`.
//! - Meals with no entries are not kept as placeholders.
//! - `goals` is the snapshot taken at creation and never follows later edits.

use crate::model::goals::NutritionGoals;
use crate::model::meal::{EntryId, MacroTotals, Meal, MealEntry, MealEntryUpdate, MealName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of logged food and water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutritionRecord {
    /// Local calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    meals: Vec<Meal>,
    /// Millilitres.
    pub water_intake: f64,
    goals: NutritionGoals,
    totals: MacroTotals,
}

impl DailyNutritionRecord {
    /// Creates an empty day seeded with the currently active goals.
    pub fn new(date: NaiveDate, goals: NutritionGoals) -> Self {
        Self {
            date,
            meals: Vec::new(),
            water_intake: 0.0,
            goals,
            totals: MacroTotals::default(),
        }
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn meal(&self, name: MealName) -> Option<&Meal> {
        self.meals.iter().find(|meal| meal.name == name)
    }

    /// Goals in effect when this day was first logged.
    pub fn goals(&self) -> &NutritionGoals {
        &self.goals
    }

    pub fn totals(&self) -> MacroTotals {
        self.totals
    }

    pub fn total_calories(&self) -> f64 {
        self.totals.calories
    }

    pub fn total_protein(&self) -> f64 {
        self.totals.protein
    }

    pub fn total_carbs(&self) -> f64 {
        self.totals.carbs
    }

    pub fn total_fat(&self) -> f64 {
        self.totals.fat
    }

    pub fn entry_count(&self) -> usize {
        self.meals.iter().map(|meal| meal.entries.len()).sum()
    }

    pub fn find_entry(&self, entry_id: EntryId) -> Option<&MealEntry> {
        self.meals
            .iter()
            .flat_map(|meal| meal.entries.iter())
            .find(|entry| entry.id == entry_id)
    }

    /// Appends `entry` to the meal named `name`, creating the meal if needed.
    pub fn push_entry(&mut self, name: MealName, entry: MealEntry) {
        match self.meals.iter_mut().find(|meal| meal.name == name) {
            Some(meal) => meal.entries.push(entry),
            None => {
                let mut meal = Meal::new(name);
                meal.entries.push(entry);
                self.meals.push(meal);
            }
        }
        self.recompute_totals();
    }

    /// Applies `update` to the entry with `entry_id`.
    ///
    /// Returns `false` without touching state when the entry is not in this day.
    pub fn update_entry(&mut self, entry_id: EntryId, update: &MealEntryUpdate) -> bool {
        let Some(entry) = self
            .meals
            .iter_mut()
            .flat_map(|meal| meal.entries.iter_mut())
            .find(|entry| entry.id == entry_id)
        else {
            return false;
        };
        entry.apply(update);
        self.recompute_totals();
        true
    }

    /// Removes the entry with `entry_id`, dropping its meal when it empties.
    ///
    /// Returns `false` without touching state when the entry is not in this day.
    pub fn remove_entry(&mut self, entry_id: EntryId) -> bool {
        let mut removed = false;
        for meal in &mut self.meals {
            let before = meal.entries.len();
            meal.entries.retain(|entry| entry.id != entry_id);
            if meal.entries.len() != before {
                removed = true;
                break;
            }
        }
        if !removed {
            return false;
        }
        self.meals.retain(|meal| !meal.entries.is_empty());
        self.recompute_totals();
        true
    }

    /// Re-derives totals from the current entries.
    pub fn recompute_totals(&mut self) {
        self.totals = MacroTotals::from_meals(&self.meals);
    }

    /// Restores the shape invariants on state decoded from storage.
    ///
    /// Duplicate meal slots are merged in order and empty meals dropped before
    /// totals are re-derived.
    pub(crate) fn normalize(&mut self) {
        let mut merged: Vec<Meal> = Vec::with_capacity(self.meals.len());
        for meal in self.meals.drain(..) {
            match merged.iter_mut().find(|existing| existing.name == meal.name) {
                Some(existing) => existing.entries.extend(meal.entries),
                None => merged.push(meal),
            }
        }
        merged.retain(|meal| !meal.entries.is_empty());
        self.meals = merged;
        self.recompute_totals();
    }
}
