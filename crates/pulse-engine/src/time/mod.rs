//! Time subsystem.
//!
//! Provides monotonic clocks and frame timing without coupling to any runtime.
//! Intended usage:
//! - `timestamp()` for a one-off reading of the process-wide monotonic clock
//! - one `FrameClock` per driver, `tick()` once per frame to obtain `FrameTime`
//! - `ManualClock` wherever time has to be stepped by hand

mod clock;
mod frame_clock;

pub use clock::{timestamp, Clock, ManualClock, MonotonicClock, SharedClock};
pub use frame_clock::{FrameClock, FrameTime, TimeInfo};
