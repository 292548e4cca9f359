//! Per-second rate derivation from monotonically increasing counters.

use std::time::Instant;

/// Tracks a cumulative counter and derives its rate between observations.
///
/// The rate is zero on the first observation after construction or reset,
/// when the counter went backwards (e.g. reset by the OS), and when no time
/// has elapsed since the previous observation.
#[derive(Debug, Default)]
pub struct RateMeter {
    last: Option<(u64, Instant)>,
    speed: f64,
}

impl RateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new counter value observed now
    pub fn update(&mut self, value: u64) {
        self.update_at(value, Instant::now());
    }

    /// Record a new counter value observed at `now`
    pub fn update_at(&mut self, value: u64, now: Instant) {
        self.speed = match self.last {
            Some((last_value, last_time)) if value >= last_value => {
                let elapsed = now
                    .checked_duration_since(last_time)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0);

                if elapsed > 0.0 {
                    (value - last_value) as f64 / elapsed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        self.last = Some((value, now));
    }

    /// Forget the baseline so the next update cannot report a stale rate
    pub fn reset(&mut self) {
        self.last = None;
        self.speed = 0.0;
    }

    /// Rate computed by the last update, in counter units per second
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Last observed counter value, if any
    pub fn value(&self) -> Option<u64> {
        self.last.map(|(value, _)| value)
    }
}
