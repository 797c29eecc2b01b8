use crate::config::LoopConfig;
use crate::handle::RenderLoopHandle;

thread_local! {
    static GLOBAL: RenderLoopHandle = RenderLoopHandle::with_config(LoopConfig::named("global"));
}

/// The shared render loop of the current UI thread.
///
/// Created lazily on first access and kept for the life of the thread.
/// Prefer passing a [`RenderLoopHandle`] into components; this is the default
/// place to get one from.
pub struct GlobalRenderLoop;

impl GlobalRenderLoop {
    /// Returns a handle to the shared loop.
    pub fn handle() -> RenderLoopHandle {
        GLOBAL.with(RenderLoopHandle::clone)
    }
}
