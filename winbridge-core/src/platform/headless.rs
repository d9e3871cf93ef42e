use crate::app::registry::WindowId;
use crate::error::ContextError;
use crate::gl::format::{SurfaceFormat, SwapBehavior};
use crate::platform::{NativeContext, NativeDrawable, PlatformBackend};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
struct HeadlessState {
    contexts: HashSet<u64>,
    drawables: HashMap<u64, (u32, u32)>,
    swaps: HashMap<u64, u64>,
}

/// An in-memory [PlatformBackend].
///
/// Contexts and drawables are plain handles; swaps are counted per drawable.
pub struct HeadlessBackend {
    formats: Vec<SurfaceFormat>,
    refresh_rate: Option<f64>,
    next_handle: AtomicU64,
    state: Mutex<HeadlessState>,
}

impl HeadlessBackend {
    /// A backend offering a small set of common formats at 60 Hz.
    pub fn new() -> Self {
        Self::with_formats(vec![
            SurfaceFormat::rgba(8).with_depth(24).with_stencil(8),
            SurfaceFormat::rgba(8)
                .with_depth(24)
                .with_stencil(8)
                .with_samples(4),
            SurfaceFormat::rgba(8)
                .with_depth(32)
                .with_stencil(8)
                .with_swap_behavior(SwapBehavior::TripleBuffer),
        ])
    }

    /// A backend offering exactly `formats`.
    pub fn with_formats(formats: Vec<SurfaceFormat>) -> Self {
        Self {
            formats,
            refresh_rate: Some(60.0),
            next_handle: AtomicU64::new(1),
            state: Mutex::new(HeadlessState::default()),
        }
    }

    pub fn with_refresh_rate(mut self, refresh_rate: Option<f64>) -> Self {
        self.refresh_rate = refresh_rate;
        self
    }

    fn next_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of swaps presented on `drawable`.
    pub fn swap_count(&self, drawable: NativeDrawable) -> u64 {
        self.state.lock().swaps.get(&drawable.0).copied().unwrap_or(0)
    }

    /// Last size set on `drawable`.
    pub fn drawable_size(&self, drawable: NativeDrawable) -> Option<(u32, u32)> {
        self.state.lock().drawables.get(&drawable.0).copied()
    }

    /// Number of live contexts.
    pub fn context_count(&self) -> usize {
        self.state.lock().contexts.len()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn pixel_formats(&self) -> Vec<SurfaceFormat> {
        self.formats.clone()
    }

    fn refresh_rate(&self) -> Option<f64> {
        self.refresh_rate
    }

    fn create_context(
        &self,
        _format: &SurfaceFormat,
        share: Option<NativeContext>,
    ) -> Result<NativeContext, ContextError> {
        let mut state = self.state.lock();
        if let Some(share) = share {
            if !state.contexts.contains(&share.0) {
                return Err(ContextError::Backend(format!("unknown share context {}", share.0)));
            }
        }
        let handle = self.next_handle();
        state.contexts.insert(handle);
        Ok(NativeContext(handle))
    }

    fn destroy_context(&self, context: NativeContext) {
        self.state.lock().contexts.remove(&context.0);
    }

    fn create_drawable(&self, _window: WindowId, _format: &SurfaceFormat) -> Result<NativeDrawable, ContextError> {
        let handle = self.next_handle();
        self.state.lock().drawables.insert(handle, (0, 0));
        Ok(NativeDrawable(handle))
    }

    fn destroy_drawable(&self, drawable: NativeDrawable) {
        let mut state = self.state.lock();
        state.drawables.remove(&drawable.0);
        state.swaps.remove(&drawable.0);
    }

    fn make_current(&self, context: NativeContext, drawable: NativeDrawable) -> Result<(), ContextError> {
        let state = self.state.lock();
        if !state.contexts.contains(&context.0) {
            return Err(ContextError::Backend(format!("unknown context {}", context.0)));
        }
        if !state.drawables.contains_key(&drawable.0) {
            return Err(ContextError::InvalidSurface);
        }
        Ok(())
    }

    fn done_current(&self, _context: NativeContext) {}

    fn swap_buffers(&self, _context: NativeContext, drawable: NativeDrawable) -> Result<(), ContextError> {
        let mut state = self.state.lock();
        if !state.drawables.contains_key(&drawable.0) {
            return Err(ContextError::InvalidSurface);
        }
        *state.swaps.entry(drawable.0).or_insert(0) += 1;
        Ok(())
    }

    fn resize_drawable(&self, drawable: NativeDrawable, width: u32, height: u32) {
        if let Some(size) = self.state.lock().drawables.get_mut(&drawable.0) {
            *size = (width, height);
        }
    }
}
