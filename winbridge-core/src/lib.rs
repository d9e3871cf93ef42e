// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core library for winbridge => See `winbridge` crate.
//!
//! Native events enter through the [platform::queue::WsiQueue], are dispatched by the
//! [app::handler::AppHandler] into portable [app::event::WindowEvent]s, and rendering is
//! paced by the [gl::DisplayLink].

/// Contains the dispatcher, window registry and touch tracking.
pub mod app;

/// Contains the configuration of input thresholds, window policy and frame pacing.
pub mod config;

/// Contains drag-and-drop negotiation and native pasteboard conversion.
pub mod drag;

/// Contains the error types.
pub mod error;

/// Contains integer rectangles and dirty regions.
pub mod geometry;

/// Contains rendering contexts, surfaces and the display link.
pub mod gl;

/// Contains native event types, the WSI queue and platform backends.
pub mod platform;
