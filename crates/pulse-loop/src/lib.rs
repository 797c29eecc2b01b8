//! Pulse render loop — many timed callbacks multiplexed onto one tick.
//!
//! # Quick start
//!
//! ```
//! use std::time::Duration;
//! use pulse_loop::{GlobalRenderLoop, ItemSettings};
//!
//! let render_loop = GlobalRenderLoop::handle();
//! let key = render_loop
//!     .add(
//!         ItemSettings::new()
//!             .id("blink")
//!             .update_duration(Duration::from_millis(500))
//!             .duration(Duration::from_secs(5))
//!             .on_update(|_item, time| log::trace!("blink, dt={:?}", time.delta))
//!             .on_timeout(|| log::debug!("blink finished")),
//!     )
//!     .unwrap();
//!
//! // Once per frame, from whatever paces frames:
//! render_loop.tick().unwrap();
//! # render_loop.remove(key);
//! ```
//!
//! Frames can come from the winit runtime ([`run_windowed`]), a sleeping
//! thread ([`run_headless`]) or a host calling [`RenderLoopHandle::tick`].

mod config;
mod driver;
mod error;
mod frame;
mod global;
mod handle;
mod item;

pub use config::{HeadlessConfig, LoopConfig, PanicPolicy};
pub use driver::{ItemKey, RenderLoop, TickReport};
pub use error::LoopError;
pub use frame::{run_headless, run_windowed, LoopApp};
pub use global::GlobalRenderLoop;
pub use handle::RenderLoopHandle;
pub use item::{ItemSettings, Lifecycle, RenderLoopItem, TimeoutFn, UpdateFn, DEFAULT_UPDATE_DURATION};

pub use pulse_engine::time::{timestamp, Clock, ManualClock, MonotonicClock, SharedClock, TimeInfo};
