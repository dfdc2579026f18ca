//! Time sources.
//!
//! The engine never reads wall-clock time. Whoever ticks an
//! [`EntityAttributes`](crate::EntityAttributes) hands it a [`Clock`]
//! reporting monotonically non-decreasing seconds.

use std::cell::Cell;
use std::rc::Rc;

/// A source of monotonically non-decreasing time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<F> Clock for F
where
    F: Fn() -> f64,
{
    fn now(&self) -> f64 {
        self()
    }
}

/// A clock advanced by hand, for simulations and tests.
///
/// Clones share the same time, so one handle can be given to an entity
/// while another drives it.
///
/// # Examples
///
/// ```rust
/// use statforge::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
///
/// clock.advance(0.5);
/// clock.advance(0.25);
/// assert_eq!(shared.now(), 0.75);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// A clock starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at `start`.
    pub fn starting_at(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward. Negative steps are ignored.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            self.now.set(self.now.get() + seconds);
        }
    }

    /// Jump to `time`, if it is not earlier than the current time.
    pub fn set(&self, time: f64) {
        if time >= self.now.get() {
            self.now.set(time);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
