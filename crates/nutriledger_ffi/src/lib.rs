//! Flutter-facing bindings for the nutrition ledger core.

pub mod api;
