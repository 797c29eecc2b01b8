use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use pulse_engine::time::SharedClock;

use crate::config::LoopConfig;
use crate::driver::{ItemKey, RenderLoop, TickReport};
use crate::error::LoopError;
use crate::item::{ItemSettings, RenderLoopItem};

/// Cloneable handle to a shared [`RenderLoop`].
///
/// Components hold a handle instead of their own loop, so they all advance on
/// one tick. Calls made while the loop is mid-tick (from inside a callback)
/// are buffered and applied right after the tick returns. Removals still take
/// effect at once for the rest of the tick: a removed or destroyed item gets
/// no further update callbacks.
#[derive(Clone)]
pub struct RenderLoopHandle {
    shared: Rc<Shared>,
}

struct Shared {
    /// Copy of the loop's clock, readable while the loop is borrowed.
    clock: SharedClock,
    inner: RefCell<RenderLoop>,
    unique_ids: bool,
    deferred: RefCell<Vec<Deferred>>,
    /// Ids taken while the loop is held, live at hold time or registered
    /// since. Lets deferred registrations reject duplicates up front.
    reserved: RefCell<HashMap<String, ItemKey>>,
    /// Keys removed or destroyed while the loop is held.
    cancelled: RefCell<HashSet<ItemKey>>,
}

#[derive(Debug)]
enum Deferred {
    Register(ItemKey, RenderLoopItem),
    Remove(ItemKey),
    RemoveById(String),
    Destroy(ItemKey, bool),
    Start,
    Stop,
}

impl RenderLoopHandle {
    pub fn new(render_loop: RenderLoop) -> Self {
        Self {
            shared: Rc::new(Shared {
                clock: render_loop.clock().clone(),
                unique_ids: render_loop.config().unique_ids,
                inner: RefCell::new(render_loop),
                deferred: RefCell::new(Vec::new()),
                reserved: RefCell::new(HashMap::new()),
                cancelled: RefCell::new(HashSet::new()),
            }),
        }
    }

    pub fn with_config(config: LoopConfig) -> Self {
        Self::new(RenderLoop::new(config))
    }

    /// True if both handles point at the same loop.
    pub fn same_loop(&self, other: &RenderLoopHandle) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// True while a tick (or another `with` call) holds the loop.
    pub fn is_busy(&self) -> bool {
        self.shared.inner.try_borrow_mut().is_err()
    }

    /// Runs `f` against the loop. Fails with [`LoopError::Reentrant`] when
    /// called from inside a callback.
    pub fn with<R>(&self, f: impl FnOnce(&mut RenderLoop) -> R) -> Result<R, LoopError> {
        let out = {
            let mut inner = self.shared.inner.try_borrow_mut().map_err(|_| LoopError::Reentrant)?;
            self.reserve_ids(&inner);
            f(&mut *inner)
        };
        self.release();
        Ok(out)
    }

    /// Builds an item on the loop's clock. Works mid-tick.
    pub fn create_item(&self, settings: ItemSettings) -> RenderLoopItem {
        RenderLoopItem::with_clock(settings, self.shared.clock.clone())
    }

    /// Registers an item. Mid-tick the registration is deferred; the returned
    /// key becomes valid once the tick ends. Duplicate ids are rejected the
    /// same way in both cases. Mid-tick, an id stays taken until its item is
    /// swept or removed through a handle.
    pub fn register(&self, item: RenderLoopItem) -> Result<ItemKey, LoopError> {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.register(item),
            Err(_) => {
                let key = ItemKey::next();
                if let Some(id) = item.id() {
                    let mut reserved = self.shared.reserved.borrow_mut();
                    if self.shared.unique_ids && reserved.contains_key(id) {
                        return Err(LoopError::DuplicateId(id.to_string()));
                    }
                    reserved.entry(id.to_string()).or_insert(key);
                }
                self.defer(Deferred::Register(key, item));
                Ok(key)
            }
        }
    }

    /// Shorthand for `register(create_item(settings))`.
    pub fn add(&self, settings: ItemSettings) -> Result<ItemKey, LoopError> {
        self.register(self.create_item(settings))
    }

    /// Removes an item without firing its timeout. Returns `None` if the key is
    /// unknown or if the call was deferred because the loop is mid-tick; a
    /// deferred removal still stops the item's updates for the current tick.
    pub fn remove(&self, key: ItemKey) -> Option<RenderLoopItem> {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.remove(key),
            Err(_) => {
                self.cancel(key);
                self.shared.reserved.borrow_mut().retain(|_, k| *k != key);
                self.defer(Deferred::Remove(key));
                None
            }
        }
    }

    pub fn remove_by_id(&self, id: &str) -> Option<RenderLoopItem> {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.remove_by_id(id),
            Err(_) => {
                if let Some(key) = self.shared.reserved.borrow_mut().remove(id) {
                    self.cancel(key);
                }
                self.defer(Deferred::RemoveById(id.to_string()));
                None
            }
        }
    }

    /// Flags an item for removal; its timeout fires on the next sweep unless
    /// suppressed.
    pub fn destroy(&self, key: ItemKey, no_timeout: bool) -> Result<(), LoopError> {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.destroy(key, no_timeout),
            Err(_) => {
                self.cancel(key);
                self.defer(Deferred::Destroy(key, no_timeout));
                Ok(())
            }
        }
    }

    pub fn start(&self) {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.start(),
            Err(_) => self.defer(Deferred::Start),
        }
    }

    pub fn stop(&self) {
        match self.shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.stop(),
            Err(_) => self.defer(Deferred::Stop),
        }
    }

    /// Advances the loop once, then applies calls buffered during the tick.
    pub fn tick(&self) -> Result<Option<TickReport>, LoopError> {
        let report = {
            let mut inner = self.shared.inner.try_borrow_mut().map_err(|_| LoopError::Reentrant)?;
            self.reserve_ids(&inner);
            let cancelled = &self.shared.cancelled;
            let reserved = &self.shared.reserved;
            inner.tick_with(
                |key| cancelled.borrow().contains(&key),
                |key| reserved.borrow_mut().retain(|_, k| *k != key),
            )
        };
        self.release();
        Ok(report)
    }

    /// No items registered and nothing waiting to be registered.
    pub fn is_idle(&self) -> bool {
        let pending_registration = self
            .shared
            .deferred
            .borrow()
            .iter()
            .any(|d| matches!(d, Deferred::Register(..)));
        let empty = self
            .shared
            .inner
            .try_borrow()
            .map(|inner| inner.is_empty())
            .unwrap_or(false);
        empty && !pending_registration
    }

    pub fn len(&self) -> Result<usize, LoopError> {
        self.shared
            .inner
            .try_borrow()
            .map(|inner| inner.len())
            .map_err(|_| LoopError::Reentrant)
    }

    pub fn is_running(&self) -> Result<bool, LoopError> {
        self.shared
            .inner
            .try_borrow()
            .map(|inner| inner.is_running())
            .map_err(|_| LoopError::Reentrant)
    }

    /// Snapshots live ids before the loop is lent out.
    fn reserve_ids(&self, inner: &RenderLoop) {
        let mut reserved = self.shared.reserved.borrow_mut();
        reserved.clear();
        for (id, key) in inner.live_ids() {
            reserved.entry(id.to_string()).or_insert(key);
        }
    }

    fn cancel(&self, key: ItemKey) {
        self.shared.cancelled.borrow_mut().insert(key);
    }

    /// Called once the loop is no longer held.
    fn release(&self) {
        self.shared.reserved.borrow_mut().clear();
        self.shared.cancelled.borrow_mut().clear();
        self.flush();
    }

    fn defer(&self, cmd: Deferred) {
        log::trace!("render loop busy, deferring {cmd:?}");
        self.shared.deferred.borrow_mut().push(cmd);
    }

    /// Applies buffered calls. Applying can run user code that buffers more,
    /// so drain until empty.
    fn flush(&self) {
        loop {
            let batch = std::mem::take(&mut *self.shared.deferred.borrow_mut());
            if batch.is_empty() {
                return;
            }
            let Ok(mut inner) = self.shared.inner.try_borrow_mut() else {
                // An outer borrow will flush once it is released.
                let mut deferred = self.shared.deferred.borrow_mut();
                let later = std::mem::replace(&mut *deferred, batch);
                deferred.extend(later);
                return;
            };
            for cmd in batch {
                apply(&mut inner, cmd);
            }
        }
    }
}

impl fmt::Debug for RenderLoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("RenderLoopHandle");
        match self.shared.inner.try_borrow() {
            Ok(inner) => d.field("loop", &*inner),
            Err(_) => d.field("loop", &"<ticking>"),
        };
        d.field("deferred", &self.shared.deferred.borrow().len()).finish()
    }
}

impl Default for RenderLoopHandle {
    fn default() -> Self {
        Self::new(RenderLoop::default())
    }
}

fn apply(inner: &mut RenderLoop, cmd: Deferred) {
    match cmd {
        Deferred::Register(key, item) => {
            if let Err(e) = inner.insert_with_key(key, item) {
                log::warn!("deferred registration of {key} dropped: {e}");
            }
        }
        Deferred::Remove(key) => {
            inner.remove(key);
        }
        Deferred::RemoveById(id) => {
            inner.remove_by_id(&id);
        }
        Deferred::Destroy(key, no_timeout) => {
            if let Err(e) = inner.destroy(key, no_timeout) {
                log::debug!("deferred destroy ignored: {e}");
            }
        }
        Deferred::Start => inner.start(),
        Deferred::Stop => inner.stop(),
    }
}
