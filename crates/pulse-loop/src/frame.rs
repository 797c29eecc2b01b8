//! Frame sources that drive a [`RenderLoopHandle`].

use std::thread;

use anyhow::{Context, Result};

use pulse_engine::core::{App, AppControl, FrameCtx};
use pulse_engine::window::{Runtime, RuntimeConfig};

use crate::config::HeadlessConfig;
use crate::handle::RenderLoopHandle;

/// `core::App` that ticks a render loop once per runtime frame.
///
/// The loop keeps its own clock; the runtime only decides when frames happen.
pub struct LoopApp {
    handle: RenderLoopHandle,
    exit_when_idle: bool,
}

impl LoopApp {
    pub fn new(handle: RenderLoopHandle) -> Self {
        Self { handle, exit_when_idle: false }
    }

    /// Ask the runtime to exit once the loop has no items left.
    pub fn exit_when_idle(mut self, yes: bool) -> Self {
        self.exit_when_idle = yes;
        self
    }

    pub fn handle(&self) -> &RenderLoopHandle {
        &self.handle
    }
}

impl App for LoopApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        match self.handle.tick() {
            Ok(Some(report)) if report.panicked > 0 => {
                log::warn!(
                    "frame {}: {} callback(s) panicked and were dropped",
                    ctx.time.frame_index,
                    report.panicked
                );
            }
            Ok(_) => {}
            Err(e) => log::error!("frame {}: {e}", ctx.time.frame_index),
        }

        if self.exit_when_idle && self.handle.is_idle() {
            log::debug!("render loop idle, exiting");
            return AppControl::Exit;
        }
        AppControl::Continue
    }
}

/// Opens a window and ticks `handle` once per frame until the window closes
/// (or, with `exit_when_idle`, until the loop empties).
pub fn run_windowed(handle: RenderLoopHandle, config: RuntimeConfig, exit_when_idle: bool) -> Result<()> {
    Runtime::run(config, LoopApp::new(handle).exit_when_idle(exit_when_idle))
        .context("windowed render loop failed")
}

/// Ticks `handle` on the current thread, sleeping between frames.
///
/// Returns the number of frames ticked. Stops when the loop is idle (if
/// configured), when `max_frames` is reached, or when the loop is stopped.
pub fn run_headless(handle: &RenderLoopHandle, config: &HeadlessConfig) -> Result<u64> {
    let mut frames = 0u64;

    loop {
        if config.stop_when_idle && handle.is_idle() {
            break;
        }
        if config.max_frames.is_some_and(|max| frames >= max) {
            break;
        }

        let report = handle.tick().context("headless tick")?;
        if report.is_none() {
            log::debug!("render loop stopped after {frames} frame(s)");
            break;
        }
        frames += 1;

        thread::sleep(config.frame_interval);
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use pulse_engine::time::{FrameClock, ManualClock};
    use pulse_engine::window::RuntimeCtx;

    use super::*;
    use crate::{ItemSettings, LoopConfig, RenderLoop};

    fn headless(max_frames: Option<u64>) -> HeadlessConfig {
        HeadlessConfig {
            frame_interval: Duration::from_millis(1),
            max_frames,
            stop_when_idle: true,
        }
    }

    #[test]
    fn loop_app_ticks_and_exits_when_idle() {
        let clock = ManualClock::new();
        let handle = RenderLoopHandle::new(RenderLoop::with_clock(LoopConfig::default(), clock.shared()));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        handle
            .add(
                ItemSettings::new()
                    .duration(Duration::from_millis(20))
                    .on_update(move |_, _| h.set(h.get() + 1)),
            )
            .unwrap();

        let mut app = LoopApp::new(handle.clone()).exit_when_idle(true);
        let mut frames = FrameClock::with_clock(clock.shared());
        let mut runtime = RuntimeCtx::default();

        clock.set_millis(10);
        let mut ctx = FrameCtx::detached(frames.tick(), &mut runtime);
        assert_eq!(app.on_frame(&mut ctx), AppControl::Continue);
        assert_eq!(hits.get(), 1);

        clock.set_millis(20);
        let mut ctx = FrameCtx::detached(frames.tick(), &mut runtime);
        assert_eq!(app.on_frame(&mut ctx), AppControl::Exit);
    }

    #[test]
    fn loop_app_keeps_running_by_default() {
        let handle = RenderLoopHandle::default();
        let mut app = LoopApp::new(handle);
        let mut frames = FrameClock::new();
        let mut runtime = RuntimeCtx::default();
        let mut ctx = FrameCtx::detached(frames.tick(), &mut runtime);
        assert_eq!(app.on_frame(&mut ctx), AppControl::Continue);
    }

    #[test]
    fn headless_runs_until_idle() {
        let handle = RenderLoopHandle::default();
        handle.add(ItemSettings::new().duration(Duration::from_millis(5))).unwrap();
        let frames = run_headless(&handle, &headless(Some(10_000))).unwrap();
        assert!(frames >= 1);
        assert!(handle.is_idle());
    }

    #[test]
    fn headless_respects_max_frames() {
        let handle = RenderLoopHandle::default();
        handle.add(ItemSettings::new()).unwrap();
        assert_eq!(run_headless(&handle, &headless(Some(3))).unwrap(), 3);
        assert_eq!(handle.len().unwrap(), 1);
    }

    #[test]
    fn headless_stops_with_loop() {
        let handle = RenderLoopHandle::default();
        let h = handle.clone();
        handle.add(ItemSettings::new().update_duration(Duration::ZERO).on_update(move |_, _| h.stop())).unwrap();
        let frames = run_headless(&handle, &headless(Some(100))).unwrap();
        assert!(frames >= 1 && frames < 100);
    }
}
