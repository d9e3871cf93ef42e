//! Platform abstraction for native windowing and rendering.
//!
//! Native event sources post [NativeEvent](events::NativeEvent)s into the
//! [WsiQueue](queue::WsiQueue). Rendering contexts and drawables are driven through the
//! [PlatformBackend] interface, implemented once per target.

use crate::app::registry::WindowId;
use crate::error::ContextError;
use crate::gl::format::SurfaceFormat;

/// Native event types.
pub mod events;

/// A backend that touches no real window system.
pub mod headless;

/// The window-system event queue.
pub mod queue;

#[cfg(feature = "winit")]
pub mod winit;

pub use headless::HeadlessBackend;
pub use queue::WsiQueue;
#[cfg(feature = "winit")]
pub use self::winit::WinitAdapter;

/// Opaque handle of a native rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeContext(pub u64);

/// Opaque handle of a native drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeDrawable(pub u64);

/// Capabilities a native platform provides to the rendering synchronizer.
pub trait PlatformBackend: Send + Sync {
    /// Human readable backend name.
    fn name(&self) -> &str;

    /// Pixel formats the platform can create.
    fn pixel_formats(&self) -> Vec<SurfaceFormat>;

    /// Refresh rate of the display in Hz, if known.
    fn refresh_rate(&self) -> Option<f64>;

    /// Create a context with an already negotiated format, sharing resources with `share`.
    fn create_context(
        &self,
        format: &SurfaceFormat,
        share: Option<NativeContext>,
    ) -> Result<NativeContext, ContextError>;

    fn destroy_context(&self, context: NativeContext);

    /// Create the drawable backing `window`.
    fn create_drawable(&self, window: WindowId, format: &SurfaceFormat) -> Result<NativeDrawable, ContextError>;

    fn destroy_drawable(&self, drawable: NativeDrawable);

    /// Bind `context` and `drawable` on the calling thread.
    fn make_current(&self, context: NativeContext, drawable: NativeDrawable) -> Result<(), ContextError>;

    /// Unbind `context` from the calling thread.
    fn done_current(&self, context: NativeContext);

    /// Present the back buffer of `drawable`.
    fn swap_buffers(&self, context: NativeContext, drawable: NativeDrawable) -> Result<(), ContextError>;

    /// Tell the platform the drawable changed size.
    fn resize_drawable(&self, drawable: NativeDrawable, width: u32, height: u32);
}

/// Platform type used to feed native events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// No real window system; events are posted by the caller.
    Headless,
    /// Events come from a winit event loop.
    #[cfg(feature = "winit")]
    Winit,
}

impl Platform {
    /// Detect the platform to use.
    ///
    /// # Returns
    /// * `Platform::Headless` if `WINBRIDGE_PLATFORM` is set to "headless"
    /// * `Platform::Winit` if the `winit` feature is enabled (default)
    /// * `Platform::Headless` otherwise
    pub fn detect() -> Self {
        let requested = std::env::var("WINBRIDGE_PLATFORM").ok();
        match requested.as_deref().map(str::to_lowercase).as_deref() {
            Some("headless") => Platform::Headless,
            #[cfg(feature = "winit")]
            Some("winit") | None => Platform::Winit,
            Some(other) => {
                log::warn!("Unknown WINBRIDGE_PLATFORM '{}', using the default", other);
                Self::fallback()
            },
            #[cfg(not(feature = "winit"))]
            None => Platform::Headless,
        }
    }

    fn fallback() -> Self {
        #[cfg(feature = "winit")]
        {
            Platform::Winit
        }
        #[cfg(not(feature = "winit"))]
        {
            Platform::Headless
        }
    }
}
