use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Local};

/// Wall-clock source for the mood simulation.
pub trait Clock {
    /// Current Unix time in milliseconds.
    fn now_ms(&self) -> i64;

    /// Current calendar date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

/// Device clock. Dates follow the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and advance the clock inside a service it gave the other to.
///
/// Dates are derived from the timestamp in UTC.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }

    fn today(&self) -> String {
        DateTime::from_timestamp_millis(self.now.get())
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
