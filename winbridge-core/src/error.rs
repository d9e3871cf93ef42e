//! Error and anomaly types.

use crate::app::registry::WindowId;
use crate::platform::events::{MouseButton, TouchDeviceId};
use std::thread::ThreadId;
use thiserror::Error;

/// Errors returned by rendering context and surface operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No native pixel format satisfies every requested attribute.
    #[error("No pixel format satisfies the requested format: {0}")]
    NoMatchingFormat(String),

    /// The context failed creation; every operation on it fails.
    #[error("Context is invalid")]
    Invalid,

    /// The surface failed creation or was destroyed.
    #[error("Surface is invalid")]
    InvalidSurface,

    /// The context is current on another thread and will not be stolen.
    #[error("Context is already current on thread {0:?}")]
    CurrentOnOtherThread(ThreadId),

    /// The context is not current on the calling thread.
    #[error("Context is not current on the calling thread")]
    NotCurrent,

    /// The context is current on the calling thread, but for another surface.
    #[error("Context is current for a different surface")]
    WrongSurface,

    /// The native backend refused the request.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The display link timer thread could not be started.
    #[error("Failed to start display link: {0}")]
    DisplayLink(String),
}

/// Recoverable anomalies found while dispatching native events.
///
/// Anomalies are logged and counted, the offending event (or touch point) is dropped,
/// and dispatch continues with the next queued event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventAnomaly {
    /// The event requires a target window but carries none.
    #[error("{0} event without a target window")]
    MissingWindow(&'static str),

    /// The target window is not (or no longer) registered.
    #[error("{0:?} is not a registered window")]
    UnknownWindow(WindowId),

    /// A move or release arrived for a touch point that is not down.
    #[error("touch point {id} on {device:?} is not active")]
    UnknownTouchPoint {
        /// Originating device.
        device: TouchDeviceId,
        /// Touch point id.
        id: i32,
    },

    /// A press arrived for a touch point that is already down.
    #[error("touch point {id} on {device:?} pressed twice")]
    DuplicateTouchPress {
        /// Originating device.
        device: TouchDeviceId,
        /// Touch point id.
        id: i32,
    },

    /// A mouse release arrived for a button that is not down.
    #[error("release of {0:?} without a matching press")]
    ReleaseWithoutPress(MouseButton),

    /// A drag was declined because source and target share no action.
    #[error("drag has no action in common with the target")]
    NoCommonDropAction,
}
