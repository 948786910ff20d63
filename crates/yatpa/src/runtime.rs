//! Wall-clock time and randomness for the engine.

use chrono::Utc;
use rand::Rng;
use std::time::Instant;
use yatpa_core::{Clock, RandomSource, Timestamp};

/// Milliseconds since the Unix epoch, advanced monotonically from start-up
/// so wall-clock adjustments never shorten a cooldown.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch_millis: u64,
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch_millis: u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0),
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(self.epoch_millis.saturating_add(elapsed))
    }
}

/// Thread-local randomness from `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn range_inclusive(&self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        rand::thread_rng().gen_range(low..=high)
    }
}
