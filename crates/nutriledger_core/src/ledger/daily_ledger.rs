//! Date-keyed table of daily nutrition records.
//!
//! # Responsibility
//! - Own every `DailyNutritionRecord`, one per calendar date.
//! - Route entry mutations to the record that owns the entry.
//!
//! # Invariants
//! - At most one record per date.
//! - Records are created lazily on first write and never deleted.
//! - Every mutation leaves the touched record's totals re-summed.

use crate::model::daily::DailyNutritionRecord;
use crate::model::goals::NutritionGoals;
use crate::model::meal::{EntryId, MealEntry, MealEntryUpdate, MealName, NewMealEntry};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// All daily records, ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLedger {
    records: BTreeMap<NaiveDate, DailyNutritionRecord>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from decoded records, normalizing each one.
    ///
    /// A later record with an already-seen date is merged into the first by
    /// replaying its meals. Water is an absolute value, so the later record's
    /// amount replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = DailyNutritionRecord>) -> Self {
        let mut ledger = Self::new();
        for mut record in records {
            record.normalize();
            match ledger.records.get_mut(&record.date) {
                Some(existing) => {
                    for meal in record.meals() {
                        for entry in &meal.entries {
                            existing.push_entry(meal.name, entry.clone());
                        }
                    }
                    existing.water_intake = record.water_intake;
                }
                None => {
                    ledger.records.insert(record.date, record);
                }
            }
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyNutritionRecord> {
        self.records.get(&date)
    }

    /// Records in ascending date order.
    pub fn records(&self) -> impl Iterator<Item = &DailyNutritionRecord> {
        self.records.values()
    }

    /// Records whose date falls inside `dates`, ascending.
    pub fn range(
        &self,
        dates: RangeInclusive<NaiveDate>,
    ) -> impl Iterator<Item = &DailyNutritionRecord> {
        self.records.range(dates).map(|(_, record)| record)
    }

    /// Returns the record for `date`, creating it with a `goals` snapshot.
    pub fn get_or_create(
        &mut self,
        date: NaiveDate,
        goals: &NutritionGoals,
    ) -> &mut DailyNutritionRecord {
        self.records.entry(date).or_insert_with(|| {
            debug!("event=record_create module=ledger status=ok date={date}");
            DailyNutritionRecord::new(date, goals.clone())
        })
    }

    /// Logs `new` into `meal` on `date`.
    ///
    /// # Contract
    /// - Assigns a fresh id and `logged_at`.
    /// - Creates the day (seeded with `goals`) and the meal slot when absent.
    /// - Totals are re-summed before returning.
    pub fn add_entry(
        &mut self,
        date: NaiveDate,
        goals: &NutritionGoals,
        meal: MealName,
        new: NewMealEntry,
        logged_at: i64,
    ) -> MealEntry {
        let entry = MealEntry::from_new(new, logged_at);
        let record = self.get_or_create(date, goals);
        record.push_entry(meal, entry.clone());
        entry
    }

    /// Applies `update` to the entry with `entry_id` on whichever day owns it.
    ///
    /// Unknown ids leave the ledger untouched and return `false`.
    pub fn update_entry(&mut self, entry_id: EntryId, update: &MealEntryUpdate) -> bool {
        self.records
            .values_mut()
            .any(|record| record.update_entry(entry_id, update))
    }

    /// Removes the entry with `entry_id` from whichever day owns it.
    ///
    /// Unknown ids leave the ledger untouched and return `false`.
    pub fn remove_entry(&mut self, entry_id: EntryId) -> bool {
        self.records
            .values_mut()
            .any(|record| record.remove_entry(entry_id))
    }

    pub fn find_entry(&self, entry_id: EntryId) -> Option<(NaiveDate, &MealEntry)> {
        self.records
            .values()
            .find_map(|record| record.find_entry(entry_id).map(|entry| (record.date, entry)))
    }

    /// Sets (not adds) water intake on `date`, creating the day when absent.
    pub fn set_water(&mut self, date: NaiveDate, goals: &NutritionGoals, amount_ml: f64) {
        self.get_or_create(date, goals).water_intake = amount_ml;
    }
}
