use winit::window::{Window, WindowId};

use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// `window` is `None` when the frame is driven without a window (tests,
/// embedding hosts that own their own surface).
pub struct FrameCtx<'a> {
    pub window:  Option<WindowCtx<'a>>,
    pub time:    FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a> FrameCtx<'a> {
    /// Builds a context with no window attached.
    pub fn detached(time: FrameTime, runtime: &'a mut RuntimeCtx) -> Self {
        Self { window: None, time, runtime }
    }
}
