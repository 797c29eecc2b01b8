use std::time::Duration;

use pulse_engine::window::DEFAULT_FRAME_INTERVAL;

/// What the driver does when an item callback panics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PanicPolicy {
    /// Catch at the item boundary, log, drop the item without its timeout and
    /// keep ticking the rest.
    #[default]
    Isolate,
    /// Let the panic unwind through `tick()`.
    Propagate,
}

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Shown in log lines, useful when several loops coexist.
    pub name: String,
    pub panic_policy: PanicPolicy,
    /// Start ticking immediately; otherwise `start()` must be called.
    pub auto_start: bool,
    /// Reject registration of an id that is already live.
    pub unique_ids: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            name: "render-loop".to_string(),
            panic_policy: PanicPolicy::Isolate,
            auto_start: true,
            unique_ids: true,
        }
    }
}

impl LoopConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// Settings for [`run_headless`](crate::run_headless).
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub frame_interval: Duration,
    /// Hard stop after this many frames. `None` runs until idle or stopped.
    pub max_frames: Option<u64>,
    /// Return once no items remain.
    pub stop_when_idle: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            max_frames: None,
            stop_when_idle: true,
        }
    }
}
