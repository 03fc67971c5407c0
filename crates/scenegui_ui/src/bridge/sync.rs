//! One-shot fence around buffer recreation.
//!
//! The render engine may still be reading a buffer the bridge wants to
//! replace. Before the first replacement in a frame the bridge blocks until
//! the engine has consumed everything submitted so far; later replacements in
//! the same frame reuse that rendezvous.

use scenegui_gpu::RenderEngine;

#[derive(Debug, Default)]
pub struct SyncGuard {
    synced: bool,
    waits: usize,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new growth episode. Called at the top of every frame.
    pub fn begin_episode(&mut self) {
        self.synced = false;
    }

    /// Wait for the render thread unless this episode already did.
    ///
    /// Returns `true` if a wait actually happened.
    pub fn sync<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        if self.synced || !engine.supports_threading() {
            return false;
        }
        log::debug!("Waiting for render thread before replacing buffers");
        engine.wait_for_render_thread();
        self.synced = true;
        self.waits += 1;
        true
    }

    pub fn has_synced(&self) -> bool {
        self.synced
    }

    /// Total number of fence waits over the guard's lifetime.
    pub fn wait_count(&self) -> usize {
        self.waits
    }
}
