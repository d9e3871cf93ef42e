use crate::app::registry::WindowId;
use crate::error::ContextError;
use crate::gl::format::SurfaceFormat;
use crate::platform::{NativeDrawable, PlatformBackend};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Trait for surfaces a rendering context can bind to.
pub trait SurfaceTrait {
    /// Get the identity of the surface.
    fn id(&self) -> SurfaceId;

    /// Get the window the surface belongs to.
    fn window(&self) -> WindowId;

    /// Get the native drawable.
    ///
    /// # Returns
    /// * `Some(NativeDrawable)` if the surface was created successfully
    /// * `None` if the surface is invalid
    fn drawable(&self) -> Option<NativeDrawable>;

    /// Resize the surface to the given dimensions.
    ///
    /// # Arguments
    /// * `width` - New surface width in pixels
    /// * `height` - New surface height in pixels
    ///
    /// # Returns
    /// * `Ok(())` if resize succeeded
    /// * `Err(ContextError::InvalidSurface)` if the surface is invalid
    fn resize(&mut self, width: u32, height: u32) -> Result<(), ContextError>;

    /// Get the current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Get the surface format.
    fn format(&self) -> SurfaceFormat;

    /// Check if the surface has a native drawable.
    fn is_valid(&self) -> bool {
        self.drawable().is_some()
    }
}

/// A surface backed by one native drawable of a [PlatformBackend].
pub struct Surface {
    id: SurfaceId,
    window: WindowId,
    format: SurfaceFormat,
    size: (u32, u32),
    drawable: Option<NativeDrawable>,
    backend: Arc<dyn PlatformBackend>,
}

impl Surface {
    /// Create the surface for `window`.
    ///
    /// A failed drawable creation yields an invalid surface; every context operation on
    /// it fails with [ContextError::InvalidSurface].
    pub fn new(backend: Arc<dyn PlatformBackend>, window: WindowId, format: SurfaceFormat, width: u32, height: u32) -> Self {
        let drawable = match backend.create_drawable(window, &format) {
            Ok(drawable) => {
                backend.resize_drawable(drawable, width, height);
                Some(drawable)
            },
            Err(err) => {
                log::warn!("Failed to create drawable for {:?}: {}", window, err);
                None
            },
        };

        Self {
            id: SurfaceId::next(),
            window,
            format,
            size: (width, height),
            drawable,
            backend,
        }
    }
}

impl SurfaceTrait for Surface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn window(&self) -> WindowId {
        self.window
    }

    fn drawable(&self) -> Option<NativeDrawable> {
        self.drawable
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), ContextError> {
        let drawable = self.drawable.ok_or(ContextError::InvalidSurface)?;
        self.size = (width, height);
        self.backend.resize_drawable(drawable, width, height);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if let Some(drawable) = self.drawable.take() {
            self.backend.destroy_drawable(drawable);
        }
    }
}
