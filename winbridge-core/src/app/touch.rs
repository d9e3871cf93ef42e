//! Active touch point tracking and mouse synthesis for touch-only devices.

use crate::app::registry::WindowId;
use crate::error::EventAnomaly;
use crate::platform::events::{MouseButton, NativeEventKind, NativeTouchPoint, TouchDeviceId, TouchPhase};
use indexmap::IndexMap;
use nalgebra::Point2;
use std::collections::HashMap;

/// Tracked state of one finger or stylus contact.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPointState {
    pub device: TouchDeviceId,
    pub id: i32,
    /// The window the contact started on. Later updates keep going there.
    pub window: WindowId,
    pub position: Point2<f64>,
    pub global_position: Point2<f64>,
    pub pressure: f64,
    pub phase: TouchPhase,
    /// The first contact pressed while its device had no other active contact.
    pub primary: bool,
}

/// Result of feeding one native touch point to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedTouch {
    /// The state after the update. Released points are no longer tracked.
    pub state: TouchPointState,
    /// Set when a press replaced a contact that was already down.
    pub replaced: bool,
}

type TouchKey = (TouchDeviceId, i32);

/// Per-(device, id) table of contacts that are currently down.
#[derive(Debug, Default)]
pub struct TouchTracker {
    points: IndexMap<TouchKey, TouchPointState>,
    synthesized: HashMap<WindowId, Point2<f64>>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a native touch point that arrived for `window`.
    ///
    /// Moves and releases are routed to the window the contact was pressed on. A move or
    /// release for a contact that is not down is rejected and leaves the tracker untouched.
    pub fn update(
        &mut self,
        window: WindowId,
        device: TouchDeviceId,
        point: &NativeTouchPoint,
    ) -> Result<TrackedTouch, EventAnomaly> {
        let key = (device, point.id);
        match point.phase {
            TouchPhase::Pressed => {
                let replaced = self.points.shift_remove(&key).is_some();
                let primary = !self.points.keys().any(|(d, _)| *d == device);
                let state = TouchPointState {
                    device,
                    id: point.id,
                    window,
                    position: point.position,
                    global_position: point.global_position,
                    pressure: point.pressure,
                    phase: TouchPhase::Pressed,
                    primary,
                };
                self.points.insert(key, state.clone());
                Ok(TrackedTouch { state, replaced })
            },
            TouchPhase::Moved | TouchPhase::Stationary => {
                let state = self
                    .points
                    .get_mut(&key)
                    .ok_or(EventAnomaly::UnknownTouchPoint { device, id: point.id })?;
                state.position = point.position;
                state.global_position = point.global_position;
                state.pressure = point.pressure;
                state.phase = point.phase;
                Ok(TrackedTouch {
                    state: state.clone(),
                    replaced: false,
                })
            },
            TouchPhase::Released => {
                let mut state = self
                    .points
                    .shift_remove(&key)
                    .ok_or(EventAnomaly::UnknownTouchPoint { device, id: point.id })?;
                state.position = point.position;
                state.global_position = point.global_position;
                state.pressure = point.pressure;
                state.phase = TouchPhase::Released;
                Ok(TrackedTouch {
                    state,
                    replaced: false,
                })
            },
        }
    }

    /// Drop every active contact of `device`, returning them in press order.
    pub fn cancel(&mut self, device: TouchDeviceId) -> Vec<TouchPointState> {
        let (cancelled, kept): (IndexMap<_, _>, IndexMap<_, _>) = std::mem::take(&mut self.points)
            .into_iter()
            .partition(|((d, _), _)| *d == device);
        self.points = kept;
        cancelled.into_values().collect()
    }

    /// Drop every contact owned by `window`.
    pub fn remove_window(&mut self, window: WindowId) {
        self.points.retain(|_, state| state.window != window);
        self.synthesized.remove(&window);
    }

    pub fn get(&self, device: TouchDeviceId, id: i32) -> Option<&TouchPointState> {
        self.points.get(&(device, id))
    }

    /// Active contacts in press order.
    pub fn points(&self) -> impl Iterator<Item = &TouchPointState> {
        self.points.values()
    }

    /// Whether `window` owns any active contact of `device`.
    pub fn has_points(&self, window: WindowId, device: TouchDeviceId) -> bool {
        self.points
            .values()
            .any(|state| state.window == window && state.device == device)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Derive a mouse event from a primary contact.
    ///
    /// Returns `None` for non-primary contacts, stationary contacts and moves that do not
    /// change the last synthesized position of the window.
    pub fn synthesize_mouse(&mut self, state: &TouchPointState) -> Option<NativeEventKind> {
        if !state.primary {
            return None;
        }
        let position = state.position;
        let global_position = state.global_position;
        match state.phase {
            TouchPhase::Pressed => {
                self.synthesized.insert(state.window, position);
                Some(NativeEventKind::MousePress {
                    button: MouseButton::Left,
                    position,
                    global_position,
                })
            },
            TouchPhase::Moved => {
                let last = self.synthesized.insert(state.window, position);
                if last == Some(position) {
                    return None;
                }
                Some(NativeEventKind::MouseMove {
                    position,
                    global_position,
                })
            },
            TouchPhase::Stationary => None,
            TouchPhase::Released => {
                self.synthesized.remove(&state.window)?;
                Some(NativeEventKind::MouseRelease {
                    button: MouseButton::Left,
                    position,
                    global_position,
                })
            },
        }
    }

    /// Whether a synthesized pointer is outstanding for `window`.
    pub fn has_synthesized_pointer(&self, window: WindowId) -> bool {
        self.synthesized.contains_key(&window)
    }
}
