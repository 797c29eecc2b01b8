use std::cell::Cell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Source of monotonic time.
///
/// Readings are offsets from the clock's own origin. Only differences between
/// readings of the same clock are meaningful.
pub trait Clock {
    /// Returns the current reading.
    fn now(&self) -> Duration;
}

/// Shared clock handle held by items and drivers.
pub type SharedClock = Rc<dyn Clock>;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

fn origin() -> Instant {
    *ORIGIN.get_or_init(Instant::now)
}

/// Current reading of the process-wide monotonic clock.
///
/// The origin is fixed on first use, so values start near zero and never go
/// backwards.
pub fn timestamp() -> Duration {
    Instant::now().saturating_duration_since(origin())
}

/// Wall-clock backed monotonic clock.
///
/// All instances share one origin, so readings from different instances can be
/// compared directly.
#[derive(Debug, Default, Copy, Clone)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }

    /// Convenience constructor for the shared handle type.
    pub fn shared() -> SharedClock {
        Rc::new(Self)
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        timestamp()
    }
}

/// Hand-driven clock.
///
/// Clones share the same reading, so a test can keep one clone and hand the
/// other to a driver:
///
/// ```
/// use std::time::Duration;
/// use pulse_engine::time::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let seen_by_driver = clock.clone();
/// clock.advance(Duration::from_millis(16));
/// assert_eq!(seen_by_driver.now(), Duration::from_millis(16));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock reading `start`.
    pub fn starting_at(start: Duration) -> Self {
        Self { now: Rc::new(Cell::new(start)) }
    }

    /// Jumps to an absolute reading. Moving backwards is allowed but clamps
    /// downstream deltas to zero.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Moves the reading forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Shorthand for `set(Duration::from_millis(ms))`.
    pub fn set_millis(&self, ms: u64) {
        self.set(Duration::from_millis(ms));
    }

    /// Returns a shared handle reading the same time as `self`.
    pub fn shared(&self) -> SharedClock {
        Rc::new(self.clone())
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }
}
