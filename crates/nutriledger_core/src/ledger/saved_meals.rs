//! Saved meal template book.
//!
//! # Responsibility
//! - Store user-created templates independently of daily records.
//! - Apply partial updates, deletions and usage bookkeeping by id.
//!
//! # Invariants
//! - Unknown ids are no-ops for update/delete/usage.
//! - Templates keep insertion order; listing order is computed on demand.

use crate::model::template::{NewSavedMeal, SavedMealId, SavedMealTemplate, SavedMealUpdate};
use std::cmp::Ordering;

/// Collection of saved templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedMealBook {
    templates: Vec<SavedMealTemplate>,
}

impl SavedMealBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from decoded templates, re-deriving their totals.
    ///
    /// Templates repeating an earlier id are dropped.
    pub fn from_templates(templates: impl IntoIterator<Item = SavedMealTemplate>) -> Self {
        let mut book = Self::new();
        for mut template in templates {
            if book.get(template.id).is_some() {
                continue;
            }
            template.recompute_totals();
            book.templates.push(template);
        }
        book
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in creation order.
    pub fn templates(&self) -> &[SavedMealTemplate] {
        &self.templates
    }

    pub fn get(&self, id: SavedMealId) -> Option<&SavedMealTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Stores a new template with fresh id, `created_at` and zero use count.
    pub fn save(&mut self, new: NewSavedMeal, created_at: i64) -> SavedMealTemplate {
        let template = SavedMealTemplate::from_new(new, created_at);
        self.templates.push(template.clone());
        template
    }

    /// Returns whether a template with `id` existed.
    pub fn update(&mut self, id: SavedMealId, update: SavedMealUpdate) -> bool {
        match self.templates.iter_mut().find(|template| template.id == id) {
            Some(template) => {
                template.apply(update);
                true
            }
            None => false,
        }
    }

    /// Returns whether a template with `id` existed.
    pub fn delete(&mut self, id: SavedMealId) -> bool {
        let before = self.templates.len();
        self.templates.retain(|template| template.id != id);
        self.templates.len() != before
    }

    /// Bumps usage for `id`. Returns whether the template exists.
    pub fn mark_used(&mut self, id: SavedMealId, now: i64) -> bool {
        match self.templates.iter_mut().find(|template| template.id == id) {
            Some(template) => {
                template.mark_used(now);
                true
            }
            None => false,
        }
    }

    /// Templates ordered most-used first, then most recently used, then name.
    pub fn list_by_usage(&self) -> Vec<&SavedMealTemplate> {
        let mut listed: Vec<&SavedMealTemplate> = self.templates.iter().collect();
        listed.sort_by(|left, right| compare_usage(left, right));
        listed
    }
}

fn compare_usage(left: &SavedMealTemplate, right: &SavedMealTemplate) -> Ordering {
    right
        .use_count()
        .cmp(&left.use_count())
        .then_with(|| right.last_used.cmp(&left.last_used))
        .then_with(|| left.name.cmp(&right.name))
}

#[cfg(test)]
mod tests {
    use super::SavedMealBook;
    use crate::model::template::{NewSavedMeal, SavedMealUpdate};

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut book = SavedMealBook::new();
        book.save(NewSavedMeal::from_meals("a", Vec::new()), 0);
        let before = book.clone();
        let missing = uuid::Uuid::new_v4();

        assert!(!book.update(missing, SavedMealUpdate::default()));
        assert!(!book.delete(missing));
        assert!(!book.mark_used(missing, 10));
        assert_eq!(book, before);
    }

    #[test]
    fn update_renames_and_delete_removes() {
        let mut book = SavedMealBook::new();
        let saved = book.save(NewSavedMeal::from_meals("a", Vec::new()), 0);

        assert!(book.update(
            saved.id,
            SavedMealUpdate {
                name: Some("renamed".to_string()),
                ..SavedMealUpdate::default()
            }
        ));
        assert_eq!(book.get(saved.id).unwrap().name, "renamed");

        assert!(book.delete(saved.id));
        assert!(book.is_empty());
    }

    #[test]
    fn list_by_usage_orders_by_count_then_recency_then_name() {
        let mut book = SavedMealBook::new();
        let beta = book.save(NewSavedMeal::from_meals("beta", Vec::new()), 0);
        let alpha = book.save(NewSavedMeal::from_meals("alpha", Vec::new()), 0);
        let gamma = book.save(NewSavedMeal::from_meals("gamma", Vec::new()), 0);
        let delta = book.save(NewSavedMeal::from_meals("delta", Vec::new()), 0);
        book.mark_used(gamma.id, 5);
        book.mark_used(gamma.id, 6);
        book.mark_used(delta.id, 1);
        book.mark_used(beta.id, 9);

        let names: Vec<_> = book
            .list_by_usage()
            .iter()
            .map(|template| template.name.clone())
            .collect();
        assert_eq!(names, vec!["gamma", "beta", "delta", "alpha"]);
        assert!(book.get(alpha.id).is_some());
    }
}
