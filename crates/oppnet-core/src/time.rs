//! Simulation clock and ledger timestamps.
//!
//! The trust ledger stamps every observed hop transfer with a
//! wall-clock-like, low-resolution string (`HH.MM.SS`). Whole seconds are
//! the finest granularity, so two transfers inside the same simulated
//! second carry equal stamps; consumers must tolerate such collisions
//! rather than treat them as ordering failures.

use chrono::NaiveTime;

/// Seconds in a day; timestamps wrap past this boundary.
const SECS_PER_DAY: u64 = 86_400;

/// Discrete simulation clock.
///
/// Time starts at zero and advances by a fixed tick length. The clock
/// carries no scheduling policy; the tick driver in `oppnet-sim` decides
/// when to advance it.
#[derive(Clone, Debug)]
pub struct SimClock {
    now: f64,
    tick_secs: f64,
}

impl SimClock {
    /// Create a clock at time zero with the given tick length in seconds.
    #[must_use]
    pub fn new(tick_secs: f64) -> Self {
        Self {
            now: 0.0,
            tick_secs,
        }
    }

    /// Current simulation time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Tick length in seconds.
    #[must_use]
    pub fn tick_secs(&self) -> f64 {
        self.tick_secs
    }

    /// Advance by one tick and return the new time.
    pub fn advance(&mut self) -> f64 {
        self.now += self.tick_secs;
        self.now
    }

    /// Render the current time as a ledger timestamp (`HH.MM.SS`).
    #[must_use]
    pub fn timestamp(&self) -> String {
        format_timestamp(self.now)
    }
}

/// Format seconds-since-start as an `HH.MM.SS` stamp, wrapping at 24h.
#[must_use]
pub fn format_timestamp(secs: f64) -> String {
    let day_secs = (secs.max(0.0) as u64 % SECS_PER_DAY) as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(day_secs, 0)
        .unwrap_or(NaiveTime::MIN);
    time.format("%H.%M.%S").to_string()
}
