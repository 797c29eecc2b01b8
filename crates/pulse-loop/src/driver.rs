use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use pulse_engine::time::{FrameClock, FrameTime, MonotonicClock, SharedClock};

use crate::config::{LoopConfig, PanicPolicy};
use crate::error::LoopError;
use crate::item::{ItemSettings, RenderLoopItem};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Handle to a registered item. Unique for the life of the process.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    pub(crate) fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Outcome of one `tick()`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TickReport {
    pub frame: FrameTime,
    /// Items whose update callback ran.
    pub updated: usize,
    /// Items destroyed because their duration ran out.
    pub expired: usize,
    /// Items swept out of the loop at the end of the tick.
    pub removed: usize,
    /// Callbacks that panicked and were isolated.
    pub panicked: usize,
    /// Items left after the sweep.
    pub remaining: usize,
}

impl TickReport {
    fn new(frame: FrameTime) -> Self {
        Self {
            frame,
            updated: 0,
            expired: 0,
            removed: 0,
            panicked: 0,
            remaining: 0,
        }
    }
}

struct Entry {
    key: ItemKey,
    item: RenderLoopItem,
}

#[derive(Default)]
struct Sweep {
    removed: usize,
    panicked: usize,
}

/// Multiplexes many timed items onto one tick.
///
/// Each `tick()`:
/// 1) computes `TimeInfo { last, delta, now }` from the previous tick
/// 2) walks items in registration order, skipping paused and pending ones,
///    destroying those whose duration has run out and updating the rest
/// 3) sweeps every pending item out of the loop and fires its timeout
///
/// Removal never happens mid-walk, so an item destroyed during the walk (by
/// itself or by expiry) cannot cause a neighbour to be skipped.
pub struct RenderLoop {
    config: LoopConfig,
    frame_clock: FrameClock,
    entries: Vec<Entry>,
    running: bool,
}

impl RenderLoop {
    /// Creates a loop on the process-wide monotonic clock.
    pub fn new(config: LoopConfig) -> Self {
        Self::with_clock(config, MonotonicClock::shared())
    }

    pub fn with_clock(config: LoopConfig, clock: SharedClock) -> Self {
        let running = config.auto_start;
        Self {
            config,
            frame_clock: FrameClock::with_clock(clock),
            entries: Vec::new(),
            running,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        self.frame_clock.clock()
    }

    /// Builds an item that reads time from this loop's clock.
    pub fn create_item(&self, settings: ItemSettings) -> RenderLoopItem {
        RenderLoopItem::with_clock(settings, self.clock().clone())
    }

    /// True if `item` reads the same clock instance as this loop. Items built
    /// through `create_item`/`add` always do.
    pub fn uses_loop_clock(&self, item: &RenderLoopItem) -> bool {
        Rc::ptr_eq(item.clock(), self.clock())
    }

    // ── registration ──────────────────────────────────────────────────────

    /// Adds an item to the end of the update order.
    pub fn register(&mut self, item: RenderLoopItem) -> Result<ItemKey, LoopError> {
        let key = ItemKey::next();
        self.insert_with_key(key, item)?;
        Ok(key)
    }

    /// Shorthand for `register(create_item(settings))`.
    pub fn add(&mut self, settings: ItemSettings) -> Result<ItemKey, LoopError> {
        let item = self.create_item(settings);
        self.register(item)
    }

    pub(crate) fn insert_with_key(&mut self, key: ItemKey, item: RenderLoopItem) -> Result<(), LoopError> {
        if self.config.unique_ids {
            if let Some(id) = item.id() {
                if self.find_key(id).is_some() {
                    return Err(LoopError::DuplicateId(id.to_string()));
                }
            }
        }

        if !self.uses_loop_clock(&item) {
            log::warn!(
                "[{}] {key} reads a different clock than the loop; expiry and TimeInfo may disagree",
                self.config.name
            );
        }

        log::debug!("[{}] register {key} ({:?})", self.config.name, item.id());
        self.entries.push(Entry { key, item });
        Ok(())
    }

    /// Removes an item immediately, without firing its timeout.
    pub fn remove(&mut self, key: ItemKey) -> Option<RenderLoopItem> {
        let idx = self.entries.iter().position(|e| e.key == key)?;
        log::debug!("[{}] remove {key}", self.config.name);
        Some(self.entries.remove(idx).item)
    }

    /// Removes the live item carrying `id`, without firing its timeout.
    pub fn remove_by_id(&mut self, id: &str) -> Option<RenderLoopItem> {
        let key = self.find_key(id)?;
        self.remove(key)
    }

    /// Flags an item for removal on the next sweep; its timeout fires then
    /// unless `no_timeout` is set.
    pub fn destroy(&mut self, key: ItemKey, no_timeout: bool) -> Result<(), LoopError> {
        let item = self.get_mut(key).ok_or(LoopError::UnknownKey(key))?;
        item.destroy(no_timeout);
        Ok(())
    }

    /// Destroys every item and sweeps them out now. Returns how many were
    /// removed.
    pub fn clear(&mut self, fire_timeouts: bool) -> usize {
        for entry in &mut self.entries {
            entry.item.destroy(!fire_timeouts);
        }
        self.sweep().removed
    }

    // ── lookup ────────────────────────────────────────────────────────────

    pub fn get(&self, key: ItemKey) -> Option<&RenderLoopItem> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut RenderLoopItem> {
        self.entries.iter_mut().find(|e| e.key == key).map(|e| &mut e.item)
    }

    /// Looks up a live item by id. Items already pending removal are ignored.
    pub fn find(&self, id: &str) -> Option<&RenderLoopItem> {
        self.find_key(id).and_then(|key| self.get(key))
    }

    pub fn find_key(&self, id: &str) -> Option<ItemKey> {
        self.entries
            .iter()
            .find(|e| !e.item.is_pending_removal() && e.item.id() == Some(id))
            .map(|e| e.key)
    }

    /// Ids of live items with their keys, in update order.
    pub(crate) fn live_ids(&self) -> impl Iterator<Item = (&str, ItemKey)> + '_ {
        self.entries
            .iter()
            .filter(|e| !e.item.is_pending_removal())
            .filter_map(|e| e.item.id().map(|id| (id, e.key)))
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Keys in update order.
    pub fn keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn items(&self) -> impl Iterator<Item = &RenderLoopItem> + '_ {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── run state ─────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resumes ticking. The first delta after a restart is measured from here.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.frame_clock.reset();
            log::debug!("[{}] started", self.config.name);
        }
    }

    /// Stops ticking. Items keep their state; their elapsed time keeps running.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("[{}] stopped", self.config.name);
        }
    }

    pub fn pause_all(&mut self) {
        for entry in &mut self.entries {
            entry.item.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for entry in &mut self.entries {
            entry.item.resume();
        }
    }

    // ── tick ──────────────────────────────────────────────────────────────

    /// Advances every item once. Returns `None` when the loop is stopped.
    pub fn tick(&mut self) -> Option<TickReport> {
        self.tick_with(|_| false, |_| {})
    }

    /// Like `tick`, but items for which `skip` returns true are left alone for
    /// this tick. `skip` is asked right before each item's turn, so it sees
    /// cancellations made by earlier callbacks. `released` hears about every
    /// swept key before any timeout fires.
    pub(crate) fn tick_with(
        &mut self,
        skip: impl Fn(ItemKey) -> bool,
        released: impl Fn(ItemKey),
    ) -> Option<TickReport> {
        if !self.running {
            return None;
        }

        let frame = self.frame_clock.tick();
        let time = frame.time_info();
        let mut report = TickReport::new(frame);
        let policy = self.config.panic_policy;
        let name = self.config.name.as_str();

        for entry in self.entries.iter_mut() {
            let item = &mut entry.item;
            if item.is_pending_removal() || item.is_paused() || skip(entry.key) {
                continue;
            }

            if let Some(limit) = item.duration() {
                if item.elapsed_time() >= limit {
                    log::debug!("[{name}] {} expired after {limit:?}", entry.key);
                    item.destroy(false);
                    report.expired += 1;
                    continue;
                }
            }

            match dispatch(policy, || item.update(&time)) {
                Ok(true) => report.updated += 1,
                Ok(false) => {}
                Err(msg) => {
                    log::error!("[{name}] update callback of {} panicked: {msg}", entry.key);
                    item.destroy(true);
                    report.panicked += 1;
                }
            }
        }

        let swept = self.sweep_with(released);
        report.removed = swept.removed;
        report.panicked += swept.panicked;
        report.remaining = self.entries.len();

        log::trace!(
            "[{}] tick {} dt={:?} updated={} expired={} removed={} remaining={}",
            self.config.name,
            frame.frame_index,
            frame.delta,
            report.updated,
            report.expired,
            report.removed,
            report.remaining,
        );

        Some(report)
    }

    /// Drops every pending item, then fires its timeout. Items are out of the
    /// collection before any timeout runs.
    fn sweep(&mut self) -> Sweep {
        self.sweep_with(|_| {})
    }

    fn sweep_with(&mut self, released: impl Fn(ItemKey)) -> Sweep {
        let mut swept = Sweep::default();
        if !self.entries.iter().any(|e| e.item.is_pending_removal()) {
            return swept;
        }

        let (gone, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.item.is_pending_removal());
        self.entries = kept;
        for entry in &gone {
            released(entry.key);
        }

        let policy = self.config.panic_policy;
        for mut entry in gone {
            log::debug!("[{}] sweep {}", self.config.name, entry.key);
            swept.removed += 1;
            if let Err(msg) = dispatch(policy, || entry.item.timeout()) {
                log::error!(
                    "[{}] timeout callback of {} panicked: {msg}",
                    self.config.name,
                    entry.key
                );
                swept.panicked += 1;
            }
        }

        swept
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(LoopConfig::default())
    }
}

impl fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoop")
            .field("name", &self.config.name)
            .field("running", &self.running)
            .field("items", &self.entries.len())
            .field("frame_clock", &self.frame_clock)
            .finish()
    }
}

/// Runs one callback under the configured panic policy.
fn dispatch<R>(policy: PanicPolicy, f: impl FnOnce() -> R) -> Result<R, String> {
    match policy {
        PanicPolicy::Propagate => Ok(f()),
        PanicPolicy::Isolate => panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use pulse_engine::time::ManualClock;

    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    fn manual_loop() -> (RenderLoop, ManualClock) {
        let clock = ManualClock::new();
        (RenderLoop::with_clock(LoopConfig::named("test"), clock.shared()), clock)
    }

    fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let c = Rc::new(Cell::new(0));
        (c.clone(), c)
    }

    // ── registration / lookup ─────────────────────────────────────────────

    #[test]
    fn register_and_find() {
        let (mut rl, _) = manual_loop();
        let a = rl.add(ItemSettings::new().id("a")).unwrap();
        let b = rl.add(ItemSettings::new()).unwrap();
        assert_ne!(a, b);
        assert_eq!(rl.len(), 2);
        assert_eq!(rl.find_key("a"), Some(a));
        assert!(rl.find("missing").is_none());
        assert_eq!(rl.keys().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn duplicate_id_rejected() {
        let (mut rl, _) = manual_loop();
        rl.add(ItemSettings::new().id("spin")).unwrap();
        let err = rl.add(ItemSettings::new().id("spin")).unwrap_err();
        assert_eq!(err, LoopError::DuplicateId("spin".into()));
    }

    #[test]
    fn duplicate_id_allowed_when_configured() {
        let clock = ManualClock::new();
        let cfg = LoopConfig { unique_ids: false, ..LoopConfig::default() };
        let mut rl = RenderLoop::with_clock(cfg, clock.shared());
        rl.add(ItemSettings::new().id("x")).unwrap();
        rl.add(ItemSettings::new().id("x")).unwrap();
        assert_eq!(rl.len(), 2);
    }

    #[test]
    fn id_reusable_once_pending() {
        let (mut rl, _) = manual_loop();
        let a = rl.add(ItemSettings::new().id("x")).unwrap();
        rl.destroy(a, true).unwrap();
        assert!(rl.add(ItemSettings::new().id("x")).is_ok());
    }

    #[test]
    fn remove_skips_timeout() {
        let (mut rl, _) = manual_loop();
        let (fired, f) = counter();
        let key = rl
            .add(ItemSettings::new().id("t").on_timeout(move || f.set(f.get() + 1)))
            .unwrap();
        let item = rl.remove(key).unwrap();
        assert_eq!(item.id(), Some("t"));
        assert!(rl.is_empty());
        assert!(rl.remove(key).is_none());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn remove_by_id() {
        let (mut rl, _) = manual_loop();
        rl.add(ItemSettings::new().id("a")).unwrap();
        rl.add(ItemSettings::new().id("b")).unwrap();
        assert!(rl.remove_by_id("a").is_some());
        assert!(rl.remove_by_id("a").is_none());
        assert_eq!(rl.len(), 1);
    }

    #[test]
    fn destroy_unknown_key() {
        let (mut rl, _) = manual_loop();
        let key = rl.add(ItemSettings::new()).unwrap();
        rl.remove(key);
        assert_eq!(rl.destroy(key, false), Err(LoopError::UnknownKey(key)));
    }

    #[test]
    fn foreign_clock_is_detected_but_accepted() {
        let (mut rl, _) = manual_loop();
        let own = rl.create_item(ItemSettings::new());
        let foreign = RenderLoopItem::with_clock(ItemSettings::new(), ManualClock::new().shared());
        assert!(rl.uses_loop_clock(&own));
        assert!(!rl.uses_loop_clock(&foreign));
        assert!(rl.register(foreign).is_ok());
        assert_eq!(rl.len(), 1);
    }

    // ── tick ──────────────────────────────────────────────────────────────

    #[test]
    fn skipped_items_sit_out_one_tick() {
        let (mut rl, clock) = manual_loop();
        let (hits, h) = counter();
        let key = rl
            .add(ItemSettings::new().on_update(move |_, _| h.set(h.get() + 1)))
            .unwrap();

        clock.set_millis(5);
        let report = rl.tick_with(|k| k == key, |_| {}).unwrap();
        assert_eq!(report.updated, 0);
        assert_eq!(hits.get(), 0);
        assert!(rl.contains(key));

        clock.set_millis(10);
        rl.tick().unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn time_info_chains_between_ticks() {
        let (mut rl, clock) = manual_loop();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        rl.add(ItemSettings::new().update_duration(Duration::ZERO).on_update(move |_, t| {
            s.borrow_mut().push(*t);
        }))
        .unwrap();

        clock.set_millis(16);
        rl.tick();
        clock.set_millis(33);
        rl.tick();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!((seen[0].last, seen[0].now, seen[0].delta), (ms(0), ms(16), ms(16)));
        assert_eq!((seen[1].last, seen[1].now, seen[1].delta), (ms(16), ms(33), ms(17)));
    }

    #[test]
    fn updates_at_item_cadence() {
        let (mut rl, clock) = manual_loop();
        let (hits, h) = counter();
        rl.add(ItemSettings::new().update_duration_ms(50).on_update(move |_, _| h.set(h.get() + 1)))
            .unwrap();

        for t in (16..=208).step_by(16) {
            clock.set_millis(t);
            rl.tick();
        }
        // Due at >50, >114, >178.
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn destroy_sweeps_on_next_tick_and_fires_timeout() {
        let (mut rl, clock) = manual_loop();
        let (fired, f) = counter();
        let key = rl.add(ItemSettings::new().on_timeout(move || f.set(f.get() + 1))).unwrap();

        rl.destroy(key, false).unwrap();
        assert!(rl.contains(key));
        assert_eq!(fired.get(), 0);

        clock.set_millis(1);
        let report = rl.tick().unwrap();
        assert_eq!(report.removed, 1);
        assert!(!rl.contains(key));
        assert_eq!(fired.get(), 1);

        rl.tick();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn destroy_with_no_timeout_stays_silent() {
        let (mut rl, _) = manual_loop();
        let (fired, f) = counter();
        let key = rl.add(ItemSettings::new().on_timeout(move || f.set(f.get() + 1))).unwrap();
        rl.destroy(key, true).unwrap();
        rl.tick();
        assert!(rl.is_empty());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn duration_expiry() {
        let (mut rl, clock) = manual_loop();
        let (fired, f) = counter();
        rl.add(
            ItemSettings::new()
                .duration(ms(100))
                .on_timeout(move || f.set(f.get() + 1)),
        )
        .unwrap();

        clock.set_millis(99);
        assert_eq!(rl.tick().unwrap().expired, 0);
        assert_eq!(rl.len(), 1);

        clock.set_millis(100);
        let report = rl.tick().unwrap();
        assert_eq!(report.expired, 1);
        assert_eq!(report.removed, 1);
        assert!(rl.is_empty());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn unlimited_item_never_expires() {
        let (mut rl, clock) = manual_loop();
        rl.add(ItemSettings::new()).unwrap();
        clock.set(Duration::from_secs(3600));
        rl.tick();
        assert_eq!(rl.len(), 1);
    }

    #[test]
    fn paused_items_neither_update_nor_expire() {
        let (mut rl, clock) = manual_loop();
        let (hits, h) = counter();
        let key = rl
            .add(
                ItemSettings::new()
                    .duration(ms(100))
                    .update_duration_ms(10)
                    .on_update(move |_, _| h.set(h.get() + 1)),
            )
            .unwrap();

        clock.set_millis(50);
        rl.get_mut(key).unwrap().pause();
        clock.set_millis(500);
        rl.tick();
        assert_eq!(hits.get(), 0);
        assert!(rl.contains(key));

        rl.get_mut(key).unwrap().resume();
        clock.set_millis(520);
        rl.tick();
        assert_eq!(hits.get(), 1);
        assert!(rl.contains(key));

        // 50 ms active before the pause + 50 after resume.
        clock.set_millis(550);
        rl.tick();
        assert!(!rl.contains(key));
    }

    #[test]
    fn self_destroy_does_not_skip_neighbours() {
        let (mut rl, clock) = manual_loop();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let o = order.clone();
            rl.add(ItemSettings::new().id(name).on_update(move |item, _| {
                o.borrow_mut().push(name);
                if item.id() == Some("a") {
                    item.destroy(false);
                }
            }))
            .unwrap();
        }

        clock.set_millis(5);
        let report = rl.tick().unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
        assert_eq!(report.updated, 3);
        assert_eq!(report.removed, 1);
        assert_eq!(report.remaining, 2);
    }

    #[test]
    fn panicking_item_is_isolated() {
        let (mut rl, clock) = manual_loop();
        let (hits, h) = counter();
        let (fired, f) = counter();
        let bad = rl
            .add(
                ItemSettings::new()
                    .on_update(|_, _| panic!("boom"))
                    .on_timeout(move || f.set(f.get() + 1)),
            )
            .unwrap();
        rl.add(ItemSettings::new().on_update(move |_, _| h.set(h.get() + 1))).unwrap();

        clock.set_millis(5);
        let report = rl.tick().unwrap();
        assert_eq!(report.panicked, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(hits.get(), 1);
        assert!(!rl.contains(bad));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn stopped_loop_does_not_tick() {
        let (mut rl, clock) = manual_loop();
        let (hits, h) = counter();
        rl.add(ItemSettings::new().on_update(move |_, _| h.set(h.get() + 1))).unwrap();

        rl.stop();
        clock.set_millis(10);
        assert!(rl.tick().is_none());
        assert_eq!(hits.get(), 0);

        clock.set_millis(1_000);
        rl.start();
        clock.set_millis(1_016);
        let report = rl.tick().unwrap();
        assert_eq!(report.frame.delta, ms(16));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn not_auto_started() {
        let clock = ManualClock::new();
        let cfg = LoopConfig { auto_start: false, ..LoopConfig::default() };
        let mut rl = RenderLoop::with_clock(cfg, clock.shared());
        assert!(!rl.is_running());
        assert!(rl.tick().is_none());
        rl.start();
        assert!(rl.tick().is_some());
    }

    #[test]
    fn clear_fires_timeouts_on_request() {
        let (mut rl, _) = manual_loop();
        let (fired, f) = counter();
        let f2 = f.clone();
        rl.add(ItemSettings::new().on_timeout(move || f.set(f.get() + 1))).unwrap();
        rl.add(ItemSettings::new().on_timeout(move || f2.set(f2.get() + 1))).unwrap();

        assert_eq!(rl.clear(true), 2);
        assert!(rl.is_empty());
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn clear_silently() {
        let (mut rl, _) = manual_loop();
        let (fired, f) = counter();
        rl.add(ItemSettings::new().on_timeout(move || f.set(f.get() + 1))).unwrap();
        assert_eq!(rl.clear(false), 1);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn pause_all_and_resume_all() {
        let (mut rl, clock) = manual_loop();
        rl.add(ItemSettings::new()).unwrap();
        rl.add(ItemSettings::new()).unwrap();
        rl.pause_all();
        assert!(rl.items().all(|i| i.is_paused()));
        clock.set_millis(30);
        rl.resume_all();
        assert!(rl.items().all(|i| !i.is_paused() && i.total_stopped_time() == ms(30)));
    }
}
