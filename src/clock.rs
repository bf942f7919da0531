use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

const COUNT_MASK: u64 = 0xFFFF_FFFF;
const GENERATION_SHIFT: u32 = 32;

pub trait Clock {
    /// Resets the counter to zero and starts counting.
    fn start(&mut self);
    /// Stops counting. Safe to call more than once; never waits on the ticker.
    fn stop(&mut self);
    fn elapsed_seconds(&self) -> u64;
}

/// Counts whole ticks on a background thread.
///
/// The counter and a run generation share one atomic word: the low half is
/// the count, the high half the generation. A ticker only increments while
/// its generation is current, so bumping the generation in `stop` cuts it off
/// without joining the thread.
pub struct TickClock {
    state: Arc<AtomicU64>,
    period: Duration,
}

impl TickClock {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            state: Arc::new(AtomicU64::new(0)),
            period,
        }
    }

    /// Moves to the next generation and returns it.
    fn bump_generation(&self, keep_count: bool) -> u64 {
        let prev = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(next_generation(v, keep_count))
            })
            .unwrap_or_else(|v| v);
        next_generation(prev, keep_count) >> GENERATION_SHIFT
    }
}

fn next_generation(state: u64, keep_count: bool) -> u64 {
    let generation = ((state >> GENERATION_SHIFT) + 1) & COUNT_MASK;
    let count = if keep_count { state & COUNT_MASK } else { 0 };
    (generation << GENERATION_SHIFT) | count
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TickClock {
    fn start(&mut self) {
        let generation = self.bump_generation(false);
        let state = Arc::clone(&self.state);
        let period = self.period;
        debug!(generation, "clock started");

        thread::spawn(move || loop {
            thread::sleep(period);
            let ticked = state.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                (v >> GENERATION_SHIFT == generation).then_some(v + 1)
            });
            if ticked.is_err() {
                break;
            }
        });
    }

    fn stop(&mut self) {
        let generation = self.bump_generation(true);
        debug!(generation, elapsed = self.elapsed_seconds(), "clock stopped");
    }

    fn elapsed_seconds(&self) -> u64 {
        self.state.load(Ordering::SeqCst) & COUNT_MASK
    }
}

impl Drop for TickClock {
    fn drop(&mut self) {
        self.bump_generation(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_generation_bumps_high_half_only() {
        let state = (7 << GENERATION_SHIFT) | 42;
        assert_eq!(next_generation(state, true), (8 << GENERATION_SHIFT) | 42);
        assert_eq!(next_generation(state, false), 8 << GENERATION_SHIFT);
        assert_eq!(next_generation((COUNT_MASK << GENERATION_SHIFT) | 3, true), 3);
    }

    #[test]
    fn bump_generation_returns_the_new_generation() {
        let clock = TickClock::with_period(Duration::from_secs(60));
        clock.state.store((4 << GENERATION_SHIFT) | 9, Ordering::SeqCst);
        assert_eq!(clock.bump_generation(true), 5);
        assert_eq!(clock.elapsed_seconds(), 9);
        assert_eq!(clock.bump_generation(false), 6);
        assert_eq!(clock.elapsed_seconds(), 0);
    }

    #[test]
    fn counts_while_running() {
        let mut clock = TickClock::with_period(Duration::from_millis(10));
        clock.start();
        thread::sleep(Duration::from_millis(150));
        clock.stop();
        assert!(clock.elapsed_seconds() >= 1);
    }

    #[test]
    fn no_ticks_land_after_stop() {
        let mut clock = TickClock::with_period(Duration::from_millis(5));
        clock.start();
        thread::sleep(Duration::from_millis(60));
        clock.stop();
        let frozen = clock.elapsed_seconds();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(clock.elapsed_seconds(), frozen);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut clock = TickClock::with_period(Duration::from_millis(5));
        clock.stop();
        assert_eq!(clock.elapsed_seconds(), 0);
        clock.start();
        thread::sleep(Duration::from_millis(40));
        clock.stop();
        let frozen = clock.elapsed_seconds();
        clock.stop();
        clock.stop();
        assert_eq!(clock.elapsed_seconds(), frozen);
    }

    #[test]
    fn start_resets_the_count() {
        let mut clock = TickClock::with_period(Duration::from_millis(200));
        clock.start();
        thread::sleep(Duration::from_millis(500));
        clock.stop();
        assert!(clock.elapsed_seconds() >= 1);
        clock.start();
        assert_eq!(clock.elapsed_seconds(), 0);
        clock.stop();
    }
}
