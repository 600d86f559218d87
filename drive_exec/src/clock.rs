//! # Clocks
//!
//! Routines never read the system time directly, they are handed a `Clock`
//! so that tests can step time by hand.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic source of time.
pub trait Clock {
    /// Current time in seconds.
    fn current_time(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock measuring the seconds elapsed since it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

/// A clock which only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time_s: Rc<Cell<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn current_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute time.
    pub fn set(&self, time_s: f64) {
        self.time_s.set(time_s);
    }

    /// Move time forward by `dt_s` seconds.
    pub fn advance(&self, dt_s: f64) {
        self.time_s.set(self.time_s.get() + dt_s);
    }
}

impl Clock for ManualClock {
    fn current_time(&self) -> f64 {
        self.time_s.get()
    }
}
