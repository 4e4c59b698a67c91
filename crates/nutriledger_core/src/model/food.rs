//! Food catalog item model.
//!
//! # Responsibility
//! - Describe one food with its reference serving and per-serving nutrition.
//!
//! # Invariants
//! - `id` is unique inside one catalog.
//! - Nutrition values are per reference serving, never pre-multiplied.

use serde::{Deserialize, Serialize};

/// Catalog identifier. Comes from the lookup service or a custom-food id.
pub type FoodId = String;

/// One known food, either from a lookup result or entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: FoodId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Human-readable reference serving, e.g. `1 cup`.
    pub serving_size: String,
    /// Reference serving weight in grams.
    pub serving_size_grams: f64,
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
    /// `true` for foods typed in by the user instead of looked up.
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl FoodItem {
    /// Creates a non-custom item with required fields and no optional data.
    pub fn new(
        id: impl Into<FoodId>,
        name: impl Into<String>,
        serving_size: impl Into<String>,
        serving_size_grams: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: None,
            serving_size: serving_size.into(),
            serving_size_grams,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: None,
            sugar: None,
            sodium: None,
            is_custom: false,
            barcode: None,
        }
    }

    /// Sets the four core per-serving macro values.
    pub fn with_macros(mut self, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        self.calories = calories;
        self.protein = protein;
        self.carbs = carbs;
        self.fat = fat;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// Marks the item as user-entered.
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }
}
