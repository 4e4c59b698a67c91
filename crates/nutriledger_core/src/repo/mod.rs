//! Persistence boundary for the ledger store.
//!
//! # Responsibility
//! - Define the save/load contract for the whole-store blob.
//! - Isolate SQLite and JSON details from the service layer.
//!
//! # Invariants
//! - Repositories never patch domain state; they store and return it verbatim.

pub mod snapshot_repo;
