// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bridge native windowing layers to a portable window and event model.

pub use nalgebra as math;

pub use winbridge_core as core;
pub use winbridge_services as services;

/// A "prelude" for users of winbridge.
///
/// Importing this module brings into scope the types needed to create windows,
/// dispatch native events and pace rendering.
///
/// ```rust
/// use winbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::app::context::AppContext;
    pub use crate::core::app::event::{KeyEvent, MouseEvent, TouchEvent, WheelEvent, WindowEvent};
    pub use crate::core::app::handler::AppHandler;
    pub use crate::core::app::registry::{Modality, WindowAttributes, WindowId, WindowState};
    pub use crate::core::app::update::Update;
    pub use crate::core::app::window_handler::WindowHandler;
    pub use crate::core::config::BridgeConfig;
    pub use crate::core::drag::{DragAnswer, DragEvent, DropAction, DropActions};
    pub use crate::core::geometry::{DirtyRegion, Rect};
    pub use crate::core::gl::{DisplayLink, FrameWait, GlContext, Surface, SurfaceFormat, SurfaceTrait};
    pub use crate::core::platform::{HeadlessBackend, PlatformBackend, WsiQueue};
    #[cfg(feature = "winit")]
    pub use crate::core::platform::WinitAdapter;

    // Math
    pub use nalgebra::{Point2, Vector2};
}
