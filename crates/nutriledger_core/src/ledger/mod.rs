//! Daily records, saved templates and window analytics.
//!
//! # Responsibility
//! - Hold the date-keyed daily records and the template book.
//! - Offer read-only window views over the daily history.
//!
//! # Invariants
//! - Every write that touches entries re-sums the owning record's totals.
//! - Template data never aliases daily records; entries are copied by value.

pub mod analytics;
pub mod daily_ledger;
pub mod saved_meals;
