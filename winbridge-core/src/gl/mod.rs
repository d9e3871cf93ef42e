//! Rendering contexts, surfaces and display-refresh pacing.
//!
//! This module never draws; it binds native contexts to threads and surfaces, issues
//! swaps, and paces presentation with a [DisplayLink].

pub mod context;
pub mod display_link;
pub mod format;
pub mod surface;

pub use context::{GlContext, ShareGroup};
pub use display_link::{DisplayLink, FrameTiming, FrameWait};
pub use format::{select_format, SurfaceFormat, SwapBehavior};
pub use surface::{Surface, SurfaceId, SurfaceTrait};
