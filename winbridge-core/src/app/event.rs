//! Portable events delivered to the window layer.

use crate::app::registry::WindowState;
use crate::geometry::{DirtyRegion, Rect};
use crate::platform::events::{Modifiers, MouseButton, MouseButtons, TouchDevice, TouchPhase};
use nalgebra::{Point2, Vector2};

/// Where a mouse event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseEventSource {
    #[default]
    Native,
    /// Derived from the primary contact of a touch device without native mouse events.
    SynthesizedFromTouch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// The button that changed state; `None` for moves.
    pub button: Option<MouseButton>,
    /// Buttons held down after this event.
    pub buttons: MouseButtons,
    pub position: Point2<f64>,
    pub global_position: Point2<f64>,
    pub modifiers: Modifiers,
    pub timestamp: u64,
    pub source: MouseEventSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelEvent {
    pub position: Point2<f64>,
    pub global_position: Point2<f64>,
    /// Rotation in eighths of a degree. One notch of a standard wheel is 120.
    pub angle_delta: Vector2<i32>,
    /// Scroll distance in pixels, if the device reported one.
    pub pixel_delta: Option<Vector2<f64>>,
    /// Lines the receiver should scroll per notch (120 units of angle delta).
    pub lines_per_notch: u32,
    /// Whether natural scrolling inverted the deltas.
    pub inverted: bool,
    pub modifiers: Modifiers,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key_code: u32,
    pub text: Option<String>,
    pub auto_repeat: bool,
    pub modifiers: Modifiers,
    pub timestamp: u64,
}

/// One contact of a [TouchEvent].
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub position: Point2<f64>,
    pub global_position: Point2<f64>,
    pub pressure: f64,
    pub phase: TouchPhase,
    pub primary: bool,
}

/// The contacts of one device that belong to the same window.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub device: TouchDevice,
    pub points: Vec<TouchPoint>,
    pub modifiers: Modifiers,
    pub timestamp: u64,
}

/// A portable window event.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    MousePress(MouseEvent),
    MouseRelease(MouseEvent),
    MouseMove(MouseEvent),
    /// Sent in addition to the second [WindowEvent::MousePress] of a double click.
    MouseDoubleClick(MouseEvent),
    Wheel(WheelEvent),
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    Enter {
        position: Point2<f64>,
    },
    Leave,
    /// The first contacts of a device went down on the window.
    TouchBegin(TouchEvent),
    TouchUpdate(TouchEvent),
    /// The last contact of a device on the window was lifted.
    TouchEnd(TouchEvent),
    TouchCancel {
        device: TouchDevice,
    },
    /// The window was allowed to close and is about to be unregistered.
    Close,
    Move {
        rect: Rect,
    },
    Resize {
        rect: Rect,
    },
    Expose {
        region: DirtyRegion,
    },
    Show,
    Hide,
    StateChanged {
        old: WindowState,
        new: WindowState,
    },
    FocusIn,
    FocusOut,
    ThemeChanged,
    ScreenChanged {
        scale_factor: f64,
    },
}

impl WindowEvent {
    /// Whether this event is user input that modal blocking suppresses.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            WindowEvent::MousePress(_)
                | WindowEvent::MouseRelease(_)
                | WindowEvent::MouseMove(_)
                | WindowEvent::MouseDoubleClick(_)
                | WindowEvent::Wheel(_)
                | WindowEvent::KeyPress(_)
                | WindowEvent::KeyRelease(_)
                | WindowEvent::Enter { .. }
                | WindowEvent::Leave
                | WindowEvent::TouchBegin(_)
                | WindowEvent::TouchUpdate(_)
                | WindowEvent::TouchEnd(_)
                | WindowEvent::TouchCancel { .. }
        )
    }
}
