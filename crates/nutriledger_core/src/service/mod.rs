//! Core use-case services.
//!
//! # Responsibility
//! - Compose catalog, ledger and template book into one store facade.
//! - Keep presentation/FFI layers decoupled from storage details.

pub mod ledger_service;
