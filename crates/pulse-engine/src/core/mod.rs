//! Core engine-facing contracts.
//!
//! This module defines the interface between a frame source (the winit
//! runtime, or a host that ticks by hand) and the code that runs once per
//! frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
