//! Meal slots and logged meal entries.
//!
//! # Responsibility
//! - Define the four meal slots and the entries recorded into them.
//! - Provide the re-sum helper every derived total goes through.
//!
//! # Invariants
//! - Entry nutrition values are already multiplied by `quantity`.
//! - Entry values are a snapshot; catalog edits never reach them.
//! - `MacroTotals` is only ever built by summing entries.

use crate::model::food::{FoodId, FoodItem};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one logged entry.
pub type EntryId = Uuid;

/// Named meal slot inside a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealName {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealName {
    /// All slots in display order.
    pub const ALL: [MealName; 4] = [
        MealName::Breakfast,
        MealName::Lunch,
        MealName::Dinner,
        MealName::Snacks,
    ];

    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snacks => "snacks",
        }
    }
}

impl Display for MealName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a meal slot string is not one of the four known names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealNameParseError(pub String);

impl Display for MealNameParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported meal name `{}`; expected breakfast|lunch|dinner|snacks",
            self.0
        )
    }
}

impl Error for MealNameParseError {}

impl FromStr for MealName {
    type Err = MealNameParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snacks" | "snack" => Ok(Self::Snacks),
            _ => Err(MealNameParseError(value.to_string())),
        }
    }
}

/// Entry input before the ledger assigns identity and log time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealEntry {
    pub food_id: FoodId,
    /// Denormalized name so history renders without the catalog.
    pub food_name: String,
    pub serving_size: String,
    /// Number of reference servings eaten.
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
}

impl NewMealEntry {
    /// Builds an entry from a catalog item, multiplying every per-serving value
    /// by `quantity`.
    ///
    /// No validation: zero or negative quantities are recorded as given.
    pub fn from_food(food: &FoodItem, quantity: f64) -> Self {
        Self {
            food_id: food.id.clone(),
            food_name: food.name.clone(),
            serving_size: food.serving_size.clone(),
            quantity,
            calories: food.calories * quantity,
            protein: food.protein * quantity,
            carbs: food.carbs * quantity,
            fat: food.fat * quantity,
            fiber: food.fiber.map(|value| value * quantity),
            sugar: food.sugar.map(|value| value * quantity),
            sodium: food.sodium.map(|value| value * quantity),
        }
    }
}

/// One recorded act of eating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: EntryId,
    pub food_id: FoodId,
    pub food_name: String,
    pub serving_size: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
    /// Unix epoch milliseconds.
    pub logged_at: i64,
}

impl MealEntry {
    /// Gives `new` a fresh id and the provided log time.
    pub fn from_new(new: NewMealEntry, logged_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            food_id: new.food_id,
            food_name: new.food_name,
            serving_size: new.serving_size,
            quantity: new.quantity,
            calories: new.calories,
            protein: new.protein,
            carbs: new.carbs,
            fat: new.fat,
            fiber: new.fiber,
            sugar: new.sugar,
            sodium: new.sodium,
            logged_at,
        }
    }

    /// Strips identity and log time so the entry can be logged again.
    pub fn to_new(&self) -> NewMealEntry {
        NewMealEntry {
            food_id: self.food_id.clone(),
            food_name: self.food_name.clone(),
            serving_size: self.serving_size.clone(),
            quantity: self.quantity,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
        }
    }

    /// Applies every `Some` field of `update`; `id` and `logged_at` are kept.
    pub fn apply(&mut self, update: &MealEntryUpdate) {
        if let Some(food_name) = &update.food_name {
            self.food_name = food_name.clone();
        }
        if let Some(serving_size) = &update.serving_size {
            self.serving_size = serving_size.clone();
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(calories) = update.calories {
            self.calories = calories;
        }
        if let Some(protein) = update.protein {
            self.protein = protein;
        }
        if let Some(carbs) = update.carbs {
            self.carbs = carbs;
        }
        if let Some(fat) = update.fat {
            self.fat = fat;
        }
        if let Some(fiber) = update.fiber {
            self.fiber = Some(fiber);
        }
        if let Some(sugar) = update.sugar {
            self.sugar = Some(sugar);
        }
        if let Some(sodium) = update.sodium {
            self.sodium = Some(sodium);
        }
    }
}

/// Partial update for an already logged entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealEntryUpdate {
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

/// A named slot holding entries in log order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: MealName,
    pub entries: Vec<MealEntry>,
}

impl Meal {
    pub fn new(name: MealName) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }
}

/// Summed calories and macros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    /// Re-sums every entry of every meal.
    pub fn from_meals(meals: &[Meal]) -> Self {
        meals
            .iter()
            .flat_map(|meal| meal.entries.iter())
            .fold(Self::default(), |mut totals, entry| {
                totals.calories += entry.calories;
                totals.protein += entry.protein;
                totals.carbs += entry.carbs;
                totals.fat += entry.fat;
                totals
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{MacroTotals, Meal, MealEntry, MealEntryUpdate, MealName, NewMealEntry};
    use crate::model::food::FoodItem;

    fn oats() -> FoodItem {
        FoodItem::new("f1", "Oats", "1 cup", 80.0).with_macros(300.0, 10.0, 54.0, 5.0)
    }

    #[test]
    fn meal_name_parses_case_insensitively() {
        assert_eq!("Lunch".parse::<MealName>().unwrap(), MealName::Lunch);
        assert_eq!(" snack ".parse::<MealName>().unwrap(), MealName::Snacks);
        let err = "brunch".parse::<MealName>().unwrap_err();
        assert!(err.to_string().contains("brunch"));
    }

    #[test]
    fn from_food_multiplies_by_quantity() {
        let mut food = oats();
        food.fiber = Some(8.0);
        let entry = NewMealEntry::from_food(&food, 1.5);

        assert_eq!(entry.calories, 450.0);
        assert_eq!(entry.protein, 15.0);
        assert_eq!(entry.carbs, 81.0);
        assert_eq!(entry.fat, 7.5);
        assert_eq!(entry.fiber, Some(12.0));
        assert_eq!(entry.sugar, None);
    }

    #[test]
    fn apply_keeps_identity_and_log_time() {
        let mut entry = MealEntry::from_new(NewMealEntry::from_food(&oats(), 1.0), 42);
        let id = entry.id;
        entry.apply(&MealEntryUpdate {
            quantity: Some(2.0),
            calories: Some(600.0),
            ..MealEntryUpdate::default()
        });

        assert_eq!(entry.id, id);
        assert_eq!(entry.logged_at, 42);
        assert_eq!(entry.quantity, 2.0);
        assert_eq!(entry.calories, 600.0);
        assert_eq!(entry.protein, 10.0);
    }

    #[test]
    fn totals_sum_all_meals() {
        let mut breakfast = Meal::new(MealName::Breakfast);
        breakfast
            .entries
            .push(MealEntry::from_new(NewMealEntry::from_food(&oats(), 1.0), 1));
        let mut lunch = Meal::new(MealName::Lunch);
        lunch
            .entries
            .push(MealEntry::from_new(NewMealEntry::from_food(&oats(), 2.0), 2));

        let totals = MacroTotals::from_meals(&[breakfast, lunch]);
        assert_eq!(totals.calories, 900.0);
        assert_eq!(totals.fat, 15.0);
    }

    #[test]
    fn meal_name_uses_lowercase_wire_value() {
        let json = serde_json::to_value(MealName::Snacks).unwrap();
        assert_eq!(json, "snacks");
    }
}
