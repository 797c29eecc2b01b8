use std::time::Duration;

use super::clock::{MonotonicClock, SharedClock};

/// Timing passed to update callbacks.
///
/// All three values come from the same clock: `last` is the previous tick,
/// `now` the current one and `delta = now - last`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TimeInfo {
    pub last: Duration,
    pub delta: Duration,
    pub now: Duration,
}

impl TimeInfo {
    /// Delta in fractional milliseconds.
    #[inline]
    pub fn delta_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    /// Delta in seconds, the unit most animation code integrates with.
    #[inline]
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameTime {
    /// Reading taken at the previous tick (or at creation/reset).
    pub last: Duration,

    /// Reading taken at this tick.
    pub now: Duration,

    /// `now - last`, saturating at zero if the clock moved backwards.
    pub delta: Duration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    #[inline]
    pub fn time_info(&self) -> TimeInfo {
        TimeInfo {
            last: self.last,
            delta: self.delta,
            now: self.now,
        }
    }
}

impl From<FrameTime> for TimeInfo {
    fn from(ft: FrameTime) -> Self {
        ft.time_info()
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One `FrameClock` per driver, so independent loops do not share delta
/// state. The clock source is injected; tests pass a `ManualClock`.
#[derive(Clone)]
pub struct FrameClock {
    clock: SharedClock,
    last: Duration,
    frame_index: u64,
}

impl FrameClock {
    /// Creates a frame clock on the process-wide monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::shared())
    }

    /// Creates a frame clock reading from `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        let last = clock.now();
        Self {
            clock,
            last,
            frame_index: 0,
        }
    }

    /// The underlying clock.
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Number of ticks produced so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Resets the clock baseline.
    ///
    /// Call when a loop restarts after being stopped so the next delta does
    /// not span the stopped interval.
    pub fn reset(&mut self) {
        self.last = self.clock.now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now();
        let last = self.last;
        self.last = now;

        let ft = FrameTime {
            last,
            now,
            delta: now.saturating_sub(last),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("last", &self.last)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn first_tick_measures_from_creation() {
        let clock = ManualClock::starting_at(ms(100));
        let mut fc = FrameClock::with_clock(clock.shared());
        clock.set_millis(116);

        let ft = fc.tick();
        assert_eq!(ft.last, ms(100));
        assert_eq!(ft.now, ms(116));
        assert_eq!(ft.delta, ms(16));
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn consecutive_ticks_chain() {
        let clock = ManualClock::new();
        let mut fc = FrameClock::with_clock(clock.shared());
        clock.set_millis(10);
        fc.tick();
        clock.set_millis(25);
        let ft = fc.tick();
        assert_eq!(ft.last, ms(10));
        assert_eq!(ft.delta, ms(15));
        assert_eq!(ft.frame_index, 1);
        assert_eq!(fc.frame_index(), 2);
    }

    #[test]
    fn reset_drops_stopped_interval() {
        let clock = ManualClock::new();
        let mut fc = FrameClock::with_clock(clock.shared());
        clock.set_millis(5_000);
        fc.reset();
        clock.set_millis(5_016);
        assert_eq!(fc.tick().delta, ms(16));
    }

    #[test]
    fn backwards_clock_saturates() {
        let clock = ManualClock::starting_at(ms(50));
        let mut fc = FrameClock::with_clock(clock.shared());
        clock.set_millis(20);
        assert_eq!(fc.tick().delta, Duration::ZERO);
    }

    #[test]
    fn time_info_units() {
        let info = TimeInfo { last: ms(0), delta: ms(250), now: ms(250) };
        assert_eq!(info.delta_ms(), 250.0);
        assert_eq!(info.delta_secs(), 0.25);
    }
}
