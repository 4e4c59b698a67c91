//! In-memory food catalog with recents and favorites.
//!
//! # Responsibility
//! - Keep known food items and answer substring searches.
//! - Maintain the bounded recents list and the favorites set.
//!
//! # Invariants
//! - Recents never exceed `recent_limit` and never contain duplicates.
//! - The first recent id is the most recently used one.
//! - Favorites are a set; order carries no meaning.
//! - Derived recent/favorite views skip ids missing from the catalog.

use crate::config::DEFAULT_RECENT_LIMIT;
use crate::model::food::{FoodId, FoodItem};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Catalog items plus the user's recent and favorite ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCatalog {
    #[serde(default)]
    foods: Vec<FoodItem>,
    #[serde(default)]
    recent: Vec<FoodId>,
    #[serde(default)]
    favorites: BTreeSet<FoodId>,
    #[serde(skip, default = "default_recent_limit")]
    recent_limit: usize,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::with_recent_limit(DEFAULT_RECENT_LIMIT)
    }
}

impl FoodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty catalog whose recents keep at most `recent_limit` ids.
    pub fn with_recent_limit(recent_limit: usize) -> Self {
        Self {
            foods: Vec::new(),
            recent: Vec::new(),
            favorites: BTreeSet::new(),
            recent_limit,
        }
    }

    /// Re-applies the recents bound, e.g. after decoding a stored catalog.
    pub fn set_recent_limit(&mut self, recent_limit: usize) {
        self.recent_limit = recent_limit;
        self.recent.truncate(recent_limit);
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn get_food(&self, food_id: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|food| food.id == food_id)
    }

    /// Inserts `food`, replacing any item with the same id in place.
    pub fn upsert_food(&mut self, food: FoodItem) {
        match self.foods.iter_mut().find(|existing| existing.id == food.id) {
            Some(existing) => *existing = food,
            None => self.foods.push(food),
        }
    }

    /// Removes one item. Recent/favorite ids are left as-is and simply stop
    /// resolving.
    pub fn remove_food(&mut self, food_id: &str) -> Option<FoodItem> {
        let position = self.foods.iter().position(|food| food.id == food_id)?;
        Some(self.foods.remove(position))
    }

    pub fn find_by_barcode(&self, barcode: &str) -> Option<&FoodItem> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return None;
        }
        self.foods
            .iter()
            .find(|food| food.barcode.as_deref() == Some(barcode))
    }

    /// Case-insensitive substring match over name and brand.
    ///
    /// The query is trimmed and inner whitespace collapsed; a blank query
    /// matches nothing.
    pub fn search_foods(&self, query: &str) -> Vec<&FoodItem> {
        let Some(needle) = normalize_query(query) else {
            return Vec::new();
        };
        self.foods
            .iter()
            .filter(|food| {
                food.name.to_lowercase().contains(needle.as_str())
                    || food
                        .brand
                        .as_deref()
                        .is_some_and(|brand| brand.to_lowercase().contains(needle.as_str()))
            })
            .collect()
    }

    /// Moves `food_id` to the front of recents, dropping older duplicates and
    /// anything past the limit.
    pub fn add_to_recent(&mut self, food_id: &str) {
        self.recent.retain(|existing| existing != food_id);
        self.recent.insert(0, food_id.to_string());
        self.recent.truncate(self.recent_limit);
    }

    /// Adds `food_id` to favorites, or removes it when already present.
    ///
    /// Returns whether the id is a favorite after the call.
    pub fn toggle_favorite(&mut self, food_id: &str) -> bool {
        if self.favorites.remove(food_id) {
            false
        } else {
            self.favorites.insert(food_id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, food_id: &str) -> bool {
        self.favorites.contains(food_id)
    }

    /// Recent ids, most recent first.
    pub fn recent_ids(&self) -> &[FoodId] {
        &self.recent
    }

    pub fn favorite_ids(&self) -> impl Iterator<Item = &FoodId> {
        self.favorites.iter()
    }

    /// Recent items in recency order, skipping ids no longer in the catalog.
    pub fn get_recent_foods(&self) -> Vec<&FoodItem> {
        self.recent
            .iter()
            .filter_map(|food_id| self.get_food(food_id))
            .collect()
    }

    /// Favorite items, skipping ids no longer in the catalog.
    pub fn get_favorite_foods(&self) -> Vec<&FoodItem> {
        self.favorites
            .iter()
            .filter_map(|food_id| self.get_food(food_id))
            .collect()
    }
}

fn normalize_query(query: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(query.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}
