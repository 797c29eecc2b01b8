//! Pulse engine crate.
//!
//! Owns the platform-facing pieces used by the scheduler layer: clocks and
//! frame timing, logger setup, and the winit runtime that paces frames.

pub mod core;
pub mod logging;
pub mod time;
pub mod window;
