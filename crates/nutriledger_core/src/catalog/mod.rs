//! Food catalog lookup helpers.
//!
//! # Responsibility
//! - Filter already-resolved food items; remote lookup lives outside core.
//! - Track recently used and favorite foods.

pub mod food_catalog;
