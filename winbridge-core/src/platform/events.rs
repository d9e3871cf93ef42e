//! Native event types posted by platform adapters into the WSI queue.

use crate::app::registry::{WindowId, WindowState};
use crate::geometry::{DirtyRegion, Rect};
use bitflags::bitflags;
use nalgebra::{Point2, Vector2};

bitflags! {
    /// Set of mouse buttons currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const LEFT = 0b00001;
        const RIGHT = 0b00010;
        const MIDDLE = 0b00100;
        const BACK = 0b01000;
        const FORWARD = 0b10000;
    }
}

bitflags! {
    /// Keyboard modifiers active when the event was generated.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b00001;
        const CONTROL = 0b00010;
        const ALT = 0b00100;
        const META = 0b01000;
        const KEYPAD = 0b10000;
    }
}

/// A single mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// The bit of this button in a [MouseButtons] mask.
    pub fn flag(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
            MouseButton::Back => MouseButtons::BACK,
            MouseButton::Forward => MouseButtons::FORWARD,
        }
    }
}

/// Identifier of a touch input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchDeviceId(pub u32);

/// The kind of a touch device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchDeviceKind {
    #[default]
    TouchScreen,
    TouchPad,
}

/// Description of the device a touch batch originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TouchDevice {
    pub id: TouchDeviceId,
    pub kind: TouchDeviceKind,
    /// Whether the device also produces its own mouse events. When it does not,
    /// mouse events are synthesized from its primary touch point.
    pub native_mouse: bool,
}

impl TouchDevice {
    /// A touch screen without native mouse emulation.
    pub fn touch_screen(id: u32) -> Self {
        Self {
            id: TouchDeviceId(id),
            kind: TouchDeviceKind::TouchScreen,
            native_mouse: false,
        }
    }
}

/// Phase of a touch point within a touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Pressed,
    Moved,
    Stationary,
    Released,
}

/// One contact within a native touch batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTouchPoint {
    /// Contact id, unique per device while the contact is down.
    pub id: i32,
    /// Position in window coordinates.
    pub position: Point2<f64>,
    /// Position in screen coordinates.
    pub global_position: Point2<f64>,
    /// Normalized pressure in `0.0..=1.0`.
    pub pressure: f64,
    pub phase: TouchPhase,
}

impl NativeTouchPoint {
    pub fn new(id: i32, phase: TouchPhase, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point2::new(x, y),
            global_position: Point2::new(x, y),
            pressure: if phase == TouchPhase::Released { 0.0 } else { 1.0 },
            phase,
        }
    }
}

/// Raw scroll delta as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    /// Notches of a physical wheel (positive y scrolls up).
    Lines(Vector2<f64>),
    /// Pixel-precise delta from a touchpad or high-resolution wheel.
    Pixels(Vector2<f64>),
}

/// A native event with its routing information.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    /// The target window, if the event is window-bound.
    pub window: Option<WindowId>,
    /// Milliseconds on the platform's event clock.
    pub timestamp: u64,
    pub modifiers: Modifiers,
    pub kind: NativeEventKind,
}

/// Payload of a [NativeEvent].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEventKind {
    MousePress {
        button: MouseButton,
        position: Point2<f64>,
        global_position: Point2<f64>,
    },
    MouseRelease {
        button: MouseButton,
        position: Point2<f64>,
        global_position: Point2<f64>,
    },
    MouseMove {
        position: Point2<f64>,
        global_position: Point2<f64>,
    },
    Wheel {
        position: Point2<f64>,
        global_position: Point2<f64>,
        delta: WheelDelta,
    },
    Key {
        pressed: bool,
        key_code: u32,
        text: Option<String>,
        auto_repeat: bool,
    },
    Enter {
        position: Point2<f64>,
    },
    Leave,
    Touch {
        device: TouchDevice,
        points: Vec<NativeTouchPoint>,
    },
    TouchCancel {
        device: TouchDevice,
    },
    Close,
    Geometry {
        rect: Rect,
    },
    Expose {
        region: DirtyRegion,
    },
    Map,
    Unmap,
    Activated,
    Deactivated,
    StateChanged {
        state: WindowState,
    },
    /// Without a target window the change applies to every window.
    ThemeChanged,
    ScreenChanged {
        scale_factor: f64,
    },
    /// The native window was torn down.
    Destroyed,
}

impl NativeEventKind {
    /// Short name used in log messages.
    pub fn name(&self) -> &'static str {
        match self {
            NativeEventKind::MousePress { .. } => "mouse press",
            NativeEventKind::MouseRelease { .. } => "mouse release",
            NativeEventKind::MouseMove { .. } => "mouse move",
            NativeEventKind::Wheel { .. } => "wheel",
            NativeEventKind::Key { .. } => "key",
            NativeEventKind::Enter { .. } => "enter",
            NativeEventKind::Leave => "leave",
            NativeEventKind::Touch { .. } => "touch",
            NativeEventKind::TouchCancel { .. } => "touch cancel",
            NativeEventKind::Close => "close",
            NativeEventKind::Geometry { .. } => "geometry",
            NativeEventKind::Expose { .. } => "expose",
            NativeEventKind::Map => "map",
            NativeEventKind::Unmap => "unmap",
            NativeEventKind::Activated => "activated",
            NativeEventKind::Deactivated => "deactivated",
            NativeEventKind::StateChanged { .. } => "window state",
            NativeEventKind::ThemeChanged => "theme",
            NativeEventKind::ScreenChanged { .. } => "screen",
            NativeEventKind::Destroyed => "destroyed",
        }
    }
}

impl NativeEvent {
    /// Create an event addressed to `window`.
    pub fn new(window: WindowId, timestamp: u64, kind: NativeEventKind) -> Self {
        Self {
            window: Some(window),
            timestamp,
            modifiers: Modifiers::empty(),
            kind,
        }
    }

    /// Create an event that is not bound to a window.
    pub fn global(timestamp: u64, kind: NativeEventKind) -> Self {
        Self {
            window: None,
            timestamp,
            modifiers: Modifiers::empty(),
            kind,
        }
    }

    /// Set the active modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mouse press at a window position (screen position equal to window position).
    pub fn mouse_press(window: WindowId, timestamp: u64, button: MouseButton, x: f64, y: f64) -> Self {
        Self::new(
            window,
            timestamp,
            NativeEventKind::MousePress {
                button,
                position: Point2::new(x, y),
                global_position: Point2::new(x, y),
            },
        )
    }

    /// Mouse release at a window position (screen position equal to window position).
    pub fn mouse_release(window: WindowId, timestamp: u64, button: MouseButton, x: f64, y: f64) -> Self {
        Self::new(
            window,
            timestamp,
            NativeEventKind::MouseRelease {
                button,
                position: Point2::new(x, y),
                global_position: Point2::new(x, y),
            },
        )
    }

    /// Mouse move to a window position (screen position equal to window position).
    pub fn mouse_move(window: WindowId, timestamp: u64, x: f64, y: f64) -> Self {
        Self::new(
            window,
            timestamp,
            NativeEventKind::MouseMove {
                position: Point2::new(x, y),
                global_position: Point2::new(x, y),
            },
        )
    }

    /// A touch batch from `device`.
    pub fn touch(window: WindowId, timestamp: u64, device: TouchDevice, points: Vec<NativeTouchPoint>) -> Self {
        Self::new(window, timestamp, NativeEventKind::Touch { device, points })
    }
}
