//! Bus-cycle clock and the cosmetic wall-clock throttle.

use std::thread;
use std::time::Duration;

/// Throttle debt below this threshold is carried instead of slept off, so the
/// pacing path never issues sub-millisecond sleeps.
const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Monotonic bus-cycle counter with a nominal cycle period.
///
/// Every bus access advances the counter by exactly one cycle; internal
/// processor cycles advance it without producing a trace record. The period
/// only feeds the optional wall-clock throttle and never changes observable
/// state.
#[derive(Debug, Clone)]
pub struct Clock {
    cycles: u64,
    cycle_period: Duration,
    owed: Duration,
}

impl Clock {
    /// Creates a clock for a nominal rate in MHz.
    ///
    /// A rate of zero (or below) disables throttling entirely.
    #[must_use]
    pub fn new(mhz: f64) -> Self {
        let cycle_period = if mhz > 0.0 {
            Duration::from_secs_f64(1.0 / (mhz * 1_000_000.0))
        } else {
            Duration::ZERO
        };
        Self {
            cycles: 0,
            cycle_period,
            owed: Duration::ZERO,
        }
    }

    /// Cycles elapsed since the last reset.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Nominal duration of one cycle; zero when throttling is disabled.
    #[must_use]
    pub const fn cycle_period(&self) -> Duration {
        self.cycle_period
    }

    /// Advances the counter by `count` cycles and returns the new total.
    pub fn advance(&mut self, count: u64) -> u64 {
        self.cycles += count;
        self.cycles
    }

    /// Clears the counter and any accumulated throttle debt.
    pub fn reset(&mut self) {
        self.cycles = 0;
        self.owed = Duration::ZERO;
    }

    /// Sleeps off the wall-clock debt for `count` cycles, batched so short
    /// instructions do not each pay a scheduler round trip.
    pub fn throttle(&mut self, count: u64) {
        if self.cycle_period.is_zero() {
            return;
        }
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        self.owed += self.cycle_period * count;
        if self.owed >= MIN_SLEEP {
            thread::sleep(self.owed);
            self.owed = Duration::ZERO;
        }
    }
}
