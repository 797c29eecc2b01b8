use std::fmt;
use std::time::Duration;

use pulse_engine::time::{MonotonicClock, SharedClock, TimeInfo};

/// Recurring callback. Receives the item itself, so it can pause, destroy or
/// inspect timing from inside the call.
pub type UpdateFn = Box<dyn FnMut(&mut RenderLoopItem, &TimeInfo)>;

/// Terminal callback, fired at most once.
pub type TimeoutFn = Box<dyn FnOnce()>;

/// Interval used when none is configured.
pub const DEFAULT_UPDATE_DURATION: Duration = Duration::from_millis(1);

/// Removal state of an item.
///
/// `destroy()` only moves an item to `PendingRemoval`; the driver performs the
/// actual removal on its next sweep.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lifecycle {
    Active,
    PendingRemoval,
}

/// Construction settings for a [`RenderLoopItem`].
///
/// Every field is optional. Unset fields take the documented defaults:
/// unlimited lifetime and a 1 ms update interval.
///
/// ```
/// use std::time::Duration;
/// use pulse_loop::ItemSettings;
///
/// let settings = ItemSettings::new()
///     .id("spinner")
///     .update_duration(Duration::from_millis(50))
///     .on_update(|_item, time| log::trace!("spin {:?}", time.delta));
/// ```
#[derive(Default)]
pub struct ItemSettings {
    id: Option<String>,
    duration: Option<Duration>,
    update_duration: Option<Duration>,
    update_callback: Option<UpdateFn>,
    timeout_callback: Option<TimeoutFn>,
}

impl ItemSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup id used by [`RenderLoop::find`](crate::RenderLoop::find).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Active lifetime after which the driver destroys the item.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Lifetime in milliseconds. Negative values mean unlimited.
    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration = u64::try_from(ms).ok().map(Duration::from_millis);
        self
    }

    /// Minimum time between two update callbacks.
    pub fn update_duration(mut self, interval: Duration) -> Self {
        self.update_duration = Some(interval);
        self
    }

    pub fn update_duration_ms(self, ms: u64) -> Self {
        self.update_duration(Duration::from_millis(ms))
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut RenderLoopItem, &TimeInfo) + 'static,
    {
        self.update_callback = Some(Box::new(f));
        self
    }

    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.timeout_callback = Some(Box::new(f));
        self
    }
}

/// One unit of recurring or deferred work.
///
/// The item only holds state and timing math. Iteration, expiry and removal
/// belong to [`RenderLoop`](crate::RenderLoop).
pub struct RenderLoopItem {
    id: Option<String>,
    duration: Option<Duration>,
    update_duration: Duration,
    next_update_time: Duration,

    update_callback: Option<UpdateFn>,
    timeout_callback: Option<TimeoutFn>,

    clock: SharedClock,

    paused: bool,
    start_time: Duration,
    total_stopped_time: Duration,
    last_pause_time: Option<Duration>,
    resume_time: Option<Duration>,

    lifecycle: Lifecycle,
    no_timeout: bool,
}

impl RenderLoopItem {
    /// Creates an item timed by the process-wide monotonic clock.
    pub fn new(settings: ItemSettings) -> Self {
        Self::with_clock(settings, MonotonicClock::shared())
    }

    /// Creates an item timed by `clock`. Items registered with a driver should
    /// share the driver's clock.
    pub fn with_clock(settings: ItemSettings, clock: SharedClock) -> Self {
        let now = clock.now();
        let update_duration = settings.update_duration.unwrap_or(DEFAULT_UPDATE_DURATION);

        let mut item = Self {
            id: settings.id,
            duration: settings.duration,
            update_duration,
            next_update_time: now,
            update_callback: settings.update_callback,
            timeout_callback: settings.timeout_callback,
            clock,
            paused: false,
            start_time: now,
            total_stopped_time: Duration::ZERO,
            last_pause_time: None,
            resume_time: None,
            lifecycle: Lifecycle::Active,
            no_timeout: false,
        };
        item.set_next_update_time();
        item
    }

    // ── timing ────────────────────────────────────────────────────────────

    /// Re-arms the update interval from the current time.
    pub fn set_next_update_time(&mut self) {
        self.next_update_time = self.clock.now().saturating_add(self.update_duration);
    }

    /// True once the current time has passed the next update time.
    pub fn can_update(&self) -> bool {
        self.clock.now() > self.next_update_time
    }

    /// Active time since creation. Paused intervals, including one still in
    /// progress, are not counted.
    pub fn elapsed_time(&self) -> Duration {
        let now = self.clock.now();
        let ongoing_pause = match (self.paused, self.last_pause_time) {
            (true, Some(since)) => now.saturating_sub(since),
            _ => Duration::ZERO,
        };
        now.saturating_sub(self.start_time + self.total_stopped_time + ongoing_pause)
    }

    // ── pause / resume ────────────────────────────────────────────────────

    /// Marks the item paused. The driver skips paused items.
    ///
    /// Pausing twice keeps the first pause instant.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.last_pause_time = Some(self.clock.now());
    }

    /// Clears the pause and accounts the paused interval. No-op if the item is
    /// not paused.
    pub fn resume(&mut self) {
        let Some(paused_at) = self.last_pause_time.take() else {
            self.paused = false;
            return;
        };
        let now = self.clock.now();
        self.resume_time = Some(now);
        self.total_stopped_time += now.saturating_sub(paused_at);
        self.paused = false;
    }

    // ── callbacks ─────────────────────────────────────────────────────────

    /// Fires the update callback if one is set and the item is due, then
    /// re-arms the interval. Returns whether the callback ran.
    pub fn update(&mut self, time: &TimeInfo) -> bool {
        if self.update_callback.is_none() || !self.can_update() {
            return false;
        }

        if let Some(mut cb) = self.update_callback.take() {
            cb(self, time);
            // The callback may have installed a replacement for itself.
            if self.update_callback.is_none() {
                self.update_callback = Some(cb);
            }
        }

        self.set_next_update_time();
        true
    }

    /// Fires the timeout callback unless it was suppressed. Returns whether it
    /// ran; a second call never fires again.
    pub fn timeout(&mut self) -> bool {
        if self.no_timeout {
            return false;
        }
        match self.timeout_callback.take() {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    /// Flags the item for removal on the driver's next sweep.
    ///
    /// `no_timeout` suppresses the timeout callback. Once suppressed it stays
    /// suppressed, even if `destroy(false)` is called later.
    pub fn destroy(&mut self, no_timeout: bool) {
        if no_timeout {
            self.no_timeout = true;
        }
        self.lifecycle = Lifecycle::PendingRemoval;
    }

    pub fn set_update_callback<F>(&mut self, f: F)
    where
        F: FnMut(&mut RenderLoopItem, &TimeInfo) + 'static,
    {
        self.update_callback = Some(Box::new(f));
    }

    pub fn set_timeout_callback<F>(&mut self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.timeout_callback = Some(Box::new(f));
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// `None` means unlimited.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
    }

    pub fn update_duration(&self) -> Duration {
        self.update_duration
    }

    /// Takes effect from the next re-arm.
    pub fn set_update_duration(&mut self, interval: Duration) {
        self.update_duration = interval;
    }

    pub fn next_update_time(&self) -> Duration {
        self.next_update_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn total_stopped_time(&self) -> Duration {
        self.total_stopped_time
    }

    pub fn last_pause_time(&self) -> Option<Duration> {
        self.last_pause_time
    }

    pub fn resume_time(&self) -> Option<Duration> {
        self.resume_time
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Equivalent of a "remove on next tick" flag.
    pub fn is_pending_removal(&self) -> bool {
        self.lifecycle == Lifecycle::PendingRemoval
    }

    pub fn no_timeout(&self) -> bool {
        self.no_timeout
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }
}

impl fmt::Debug for RenderLoopItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoopItem")
            .field("id", &self.id)
            .field("duration", &self.duration)
            .field("update_duration", &self.update_duration)
            .field("next_update_time", &self.next_update_time)
            .field("paused", &self.paused)
            .field("total_stopped_time", &self.total_stopped_time)
            .field("lifecycle", &self.lifecycle)
            .field("no_timeout", &self.no_timeout)
            .finish_non_exhaustive()
    }
}
