//! Time sources for timelines

use std::sync::Mutex;
use std::time::Instant;

/// A monotonic time source in milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's origin. Never decreases.
    fn now_ms(&self) -> f64;
}

/// Clock backed by [`Instant`], with its origin at construction time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant this clock counts from.
    #[inline]
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually driven clock for deterministic timing.
///
/// # Example
///
/// ```rust
/// use perf::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(16.0);
/// assert_eq!(clock.now_ms(), 16.0);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Mutex<f64>,
}

impl ManualClock {
    /// Create a clock stopped at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Negative amounts are ignored.
    pub fn advance(&self, ms: f64) {
        if ms.is_nan() || ms <= 0.0 {
            return;
        }
        let mut now = self.now_ms.lock().unwrap_or_else(|e| e.into_inner());
        *now += ms;
    }

    /// Set the clock to an absolute time, if that does not move it backwards.
    pub fn set(&self, ms: f64) {
        let mut now = self.now_ms.lock().unwrap_or_else(|e| e.into_inner());
        if ms > *now {
            *now = ms;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now_ms.lock().unwrap_or_else(|e| e.into_inner())
    }
}
