use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::time::{FrameClock, FrameTime};

/// Default pacing, roughly one 60 Hz display refresh.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Target time between frames.
    pub frame_interval: Duration,
    pub visible: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "pulse".to_string(),
            initial_size: LogicalSize::new(640.0, 360.0),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            visible: true,
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_frame_interval(&mut self, interval: Duration) {
        self.commands.push(Command::SetFrameInterval(interval));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    /// True if `exit()` was requested during this callback.
    pub fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }
}

#[derive(Debug)]
enum Command {
    SetFrameInterval(Duration),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window and calls `app.on_frame` once per `frame_interval` until
    /// the window closes or the app asks to exit.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    app: A,

    window: Option<Window>,
    clock: FrameClock,
    next_frame: Instant,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app,
            window: None,
            clock: FrameClock::new(),
            next_frame: Instant::now(),
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_visible(self.config.visible);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        log::debug!("window {:?} created", window.id());
        self.window = Some(window);
        Ok(())
    }

    fn run_frame(&mut self) {
        let ft: FrameTime = self.clock.tick();
        let mut runtime_ctx = RuntimeCtx::default();

        let app_control = {
            let window = self.window.as_ref().map(|w| WindowCtx { id: w.id(), window: w });
            let mut ctx = FrameCtx {
                window,
                time: ft,
                runtime: &mut runtime_ctx,
            };
            self.app.on_frame(&mut ctx)
        };

        if app_control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(runtime_ctx);
    }

    fn apply_commands(&mut self, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::SetFrameInterval(interval) => {
                    self.config.frame_interval = interval;
                }
                Command::Exit => self.request_exit(),
            }
        }
    }

    /// Schedules the next frame. Missed frames are dropped rather than
    /// replayed back to back.
    fn schedule_next(&mut self, now: Instant) {
        self.next_frame += self.config.frame_interval;
        if self.next_frame <= now {
            self.next_frame = now + self.config.frame_interval;
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window(event_loop) {
                log::error!("failed to create initial window: {e:#}");
                self.request_exit();
                event_loop.exit();
                return;
            }
        }

        // Time spent suspended must not show up as one huge delta.
        self.clock.reset();
        self.next_frame = Instant::now();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let now = Instant::now();
        if now >= self.next_frame {
            self.run_frame();
            self.schedule_next(now);
        }

        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        if let WindowEvent::CloseRequested = event {
            log::debug!("window {window_id:?} close requested");
            self.window = None;
            self.request_exit();
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_sixty_hertz() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.frame_interval, DEFAULT_FRAME_INTERVAL);
        assert!(cfg.visible);
    }

    #[test]
    fn runtime_ctx_buffers_exit() {
        let mut ctx = RuntimeCtx::default();
        assert!(!ctx.exit_requested());
        ctx.set_frame_interval(Duration::from_millis(8));
        ctx.exit();
        assert!(ctx.exit_requested());
    }
}
