//! Time sources for search timing.
//!
//! Searches read the clock immediately before and after the traversal. Tests
//! swap in [`ManualClock`] so that budget checks never depend on real timing.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source. Readings are offsets from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock: every reading advances time by a fixed step.
///
/// A search reads the clock twice, so each search measures exactly `step`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    step: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step: Cell::new(step),
        }
    }

    pub fn set_step(&self, step: Duration) {
        self.step.set(step);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let t = self.now.get();
        self.now.set(t + self.step.get());
        t
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}
