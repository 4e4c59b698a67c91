//! Time source used for date keys and timestamps.
//!
//! # Responsibility
//! - Resolve "today" as a local calendar date.
//! - Provide epoch-millisecond timestamps for entries and templates.
//!
//! # Invariants
//! - Date keys use the device-local calendar; no cross-timezone normalization.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use std::cell::Cell;

/// Injectable clock capability.
pub trait Clock {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
    /// Current time as Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock in the device's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_epoch_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and deterministic hosts.
///
/// Uses interior mutability so a service that owns the clock can still be
/// moved to another day between calls.
#[derive(Debug, Clone)]
pub struct FixedClock {
    today: Cell<NaiveDate>,
    now_epoch_ms: Cell<i64>,
}

impl FixedClock {
    /// Starts at UTC midnight of `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Cell::new(today),
            now_epoch_ms: Cell::new(midnight_epoch_ms(today)),
        }
    }

    /// Moves to `today`, resetting the timestamp to its UTC midnight.
    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
        self.now_epoch_ms.set(midnight_epoch_ms(today));
    }

    /// Advances the timestamp without changing the date key.
    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_epoch_ms.set(self.now_epoch_ms.get() + delta_ms);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }

    fn now_epoch_ms(&self) -> i64 {
        self.now_epoch_ms.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now_epoch_ms(&self) -> i64 {
        (**self).now_epoch_ms()
    }
}

fn midnight_epoch_ms(date: NaiveDate) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&midnight).timestamp_millis()
}
