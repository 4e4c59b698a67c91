//! Daily nutrition targets.
//!
//! # Responsibility
//! - Hold the user's calorie, macro and water targets.
//!
//! # Invariants
//! - Values are accepted as given; zero or negative targets are not rejected.
//! - Optional targets stay `None` when the user never configured them.

use serde::{Deserialize, Serialize};

/// Active daily targets for one user session.
///
/// Daily records copy this value when they are created, so later edits never
/// rewrite the goals stored on past days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    /// Target energy in kcal.
    pub calories: f64,
    /// Target protein in grams.
    pub protein: f64,
    /// Target carbohydrates in grams.
    pub carbs: f64,
    /// Target fat in grams.
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    /// Milligrams.
    #[serde(default)]
    pub sodium: Option<f64>,
    /// Millilitres.
    #[serde(default)]
    pub water: Option<f64>,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 250.0,
            fat: 65.0,
            fiber: None,
            sugar: None,
            sodium: None,
            water: Some(2000.0),
        }
    }
}
