//! Frame pacer
//!
//! Keeps the renderer on a fixed cadence. A frame that runs late by less
//! than the lag allowance is caught up on the following frames; a longer
//! stall moves the schedule instead, so the game never fast-forwards
//! through a burst of back-to-back ticks.

use std::time::{Duration, Instant};

/// Source of time for the pacer
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug)]
pub struct FramePacer<C: Clock = SystemClock> {
    clock: C,
    period: Duration,
    max_lag: Duration,
    /// Deadline of the next frame
    next: Instant,
    /// How late the last `wait` returned relative to its deadline
    lag: Duration,
    resets: u64,
}

impl FramePacer<SystemClock> {
    pub fn new(target_fps: u32, max_lag: Duration) -> Self {
        Self::with_clock(target_fps, max_lag, SystemClock)
    }
}

impl<C: Clock> FramePacer<C> {
    pub fn with_clock(target_fps: u32, max_lag: Duration, clock: C) -> Self {
        let period = Duration::from_secs(1) / target_fps.max(1);
        let next = clock.now() + period;
        Self {
            clock,
            period,
            max_lag,
            next,
            lag: Duration::ZERO,
            resets: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next frame deadline
    pub fn wait(&mut self) {
        let now = self.clock.now();
        if now < self.next {
            self.clock.sleep(self.next - now);
            self.lag = Duration::ZERO;
            self.next += self.period;
            return;
        }

        let late = now - self.next;
        if late > self.max_lag {
            log::debug!("Frame {}ms late, dropping catch-up", late.as_millis());
            self.resets += 1;
            self.lag = Duration::ZERO;
            self.next = now + self.period;
        } else {
            self.lag = late;
            self.next += self.period;
        }
    }

    /// Lateness of the most recent frame
    pub fn lag(&self) -> Duration {
        self.lag
    }

    /// Number of times the schedule was moved after a stall
    pub fn resets(&self) -> u64 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;

    /// Clock that only moves when told to
    #[derive(Debug)]
    struct ManualClock {
        start: Instant,
        elapsed: Cell<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                elapsed: Cell::new(Duration::ZERO),
            }
        }

        fn advance(&self, duration: Duration) {
            self.elapsed.set(self.elapsed.get() + duration);
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> Instant {
            self.start + self.elapsed.get()
        }

        fn sleep(&self, duration: Duration) {
            self.advance(duration);
        }
    }

    #[test]
    fn test_on_time_frames_are_one_period_apart() {
        let clock = ManualClock::new();
        let mut pacer = FramePacer::with_clock(50, Duration::from_millis(100), &clock);
        let mut returns = Vec::new();
        for _ in 0..5 {
            clock.advance(Duration::from_millis(5));
            pacer.wait();
            returns.push((&clock).now());
        }
        for pair in returns.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(20));
        }
        assert_eq!(pacer.resets(), 0);
    }

    #[test]
    fn test_small_delay_is_caught_up() {
        let clock = ManualClock::new();
        let mut pacer = FramePacer::with_clock(50, Duration::from_millis(100), &clock);
        clock.advance(Duration::from_millis(50));
        pacer.wait();
        assert_eq!(pacer.lag(), Duration::from_millis(30));
        // Second frame returns immediately, still behind
        pacer.wait();
        assert_eq!(pacer.lag(), Duration::from_millis(10));
        pacer.wait();
        assert_eq!(pacer.lag(), Duration::ZERO);
        assert_eq!(pacer.resets(), 0);
    }

    #[test]
    fn test_long_stall_resets_schedule() {
        let clock = ManualClock::new();
        let mut pacer = FramePacer::with_clock(50, Duration::from_millis(10), &clock);
        clock.advance(Duration::from_millis(500));
        pacer.wait();
        assert_eq!(pacer.resets(), 1);
        let before = (&clock).now();
        pacer.wait();
        assert_eq!((&clock).now() - before, Duration::from_millis(20));
    }

    proptest! {
        #[test]
        fn prop_drift_bounded_after_stall(
            fps in 10u32..=240,
            max_lag_ms in 1u64..=200,
            stall_at in 0usize..20,
            work_fraction in 0.0f64..0.9,
        ) {
            let clock = ManualClock::new();
            let max_lag = Duration::from_millis(max_lag_ms);
            let mut pacer = FramePacer::with_clock(fps, max_lag, &clock);
            let period = pacer.period();
            let work = period.mul_f64(work_fraction);

            for frame in 0..=stall_at + 10 {
                let cost = if frame == stall_at { period * 3 } else { work };
                clock.advance(cost);
                pacer.wait();
                prop_assert!(pacer.lag() <= max_lag);
            }
        }
    }
}
