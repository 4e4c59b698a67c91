//! Nutrition ledger domain model.
//!
//! # Responsibility
//! - Define goals, catalog items, entries, daily records and templates.
//! - Keep derived totals behind methods that always re-sum entries.
//!
//! # Invariants
//! - Entries copy nutrition values by value; nothing holds a live catalog link.
//! - Every type serializes to a JSON-compatible shape for the snapshot blob.

pub mod daily;
pub mod food;
pub mod goals;
pub mod meal;
pub mod template;
