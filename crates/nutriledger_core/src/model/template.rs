//! Saved meal template model.
//!
//! # Responsibility
//! - Hold a frozen, reusable bundle of meal entries.
//! - Track how often and how recently the bundle was replayed.
//!
//! # Invariants
//! - Entries are copies taken at save time; they never change on replay.
//! - `totals` is re-summed from `meals`, never taken from callers.
//! - `use_count` never decreases.

use crate::model::meal::{MacroTotals, Meal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one saved template.
pub type SavedMealId = Uuid;

/// A named, replayable bundle of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMealTemplate {
    pub id: SavedMealId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    meals: Vec<Meal>,
    totals: MacroTotals,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the latest replay.
    #[serde(default)]
    pub last_used: Option<i64>,
    use_count: u32,
}

impl SavedMealTemplate {
    /// Builds a fresh template from caller input.
    pub fn from_new(new: NewSavedMeal, created_at: i64) -> Self {
        let totals = MacroTotals::from_meals(&new.meals);
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            meals: new.meals,
            totals,
            created_at,
            last_used: None,
            use_count: 0,
        }
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn totals(&self) -> MacroTotals {
        self.totals
    }

    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn entry_count(&self) -> usize {
        self.meals.iter().map(|meal| meal.entries.len()).sum()
    }

    /// Applies every `Some` field of `update`; totals follow new meals.
    pub fn apply(&mut self, update: SavedMealUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(meals) = update.meals {
            self.meals = meals;
            self.totals = MacroTotals::from_meals(&self.meals);
        }
    }

    /// Records one replay at `now`.
    pub fn mark_used(&mut self, now: i64) {
        self.use_count = self.use_count.saturating_add(1);
        self.last_used = Some(now);
    }

    pub(crate) fn recompute_totals(&mut self) {
        self.totals = MacroTotals::from_meals(&self.meals);
    }
}

/// Caller input for a new template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavedMeal {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub meals: Vec<Meal>,
}

impl NewSavedMeal {
    pub fn from_meals(name: impl Into<String>, meals: Vec<Meal>) -> Self {
        Self {
            name: name.into(),
            description: None,
            meals,
        }
    }
}

/// Partial update for a saved template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedMealUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub meals: Option<Vec<Meal>>,
}
