//! Window + frame runtime.
//!
//! Owns the `winit` EventLoop and Window and paces frames for a `core::App`.
//! This is the native counterpart of a browser's `requestAnimationFrame`.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx, DEFAULT_FRAME_INTERVAL};
