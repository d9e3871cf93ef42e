//! Winit adapter.
//!
//! Translates winit window events into [NativeEvent]s and posts them into the WSI queue.
//! No winit type crosses this module: everything past the adapter sees portable ids and
//! native event kinds only.

use crate::app::context::AppContext;
use crate::app::handler::AppHandler;
use crate::app::registry::WindowId;
use crate::app::window_handler::WindowHandler;
use crate::drag::{NativeDragOperation, NativePasteboard, PasteboardType};
use crate::geometry::{DirtyRegion, Rect};
use crate::platform::events::{
    Modifiers, MouseButton, NativeEvent, NativeEventKind, NativeTouchPoint, TouchDevice, TouchDeviceId,
    TouchDeviceKind, TouchPhase, WheelDelta,
};
use crate::platform::queue::WsiQueue;
use nalgebra::{Point2, Vector2};
use std::collections::HashMap;
use std::time::Instant;
use winbridge_services::mime_data::file_url;
use winit::event::{DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{NativeKeyCode, PhysicalKey};

/// A drag gathered from hovered or dropped files, waiting to be negotiated.
#[derive(Debug, Clone, PartialEq)]
pub enum DragRequest {
    Hover {
        window: WindowId,
        pasteboard: NativePasteboard,
        position: Point2<f64>,
    },
    Drop {
        window: WindowId,
        pasteboard: NativePasteboard,
        position: Point2<f64>,
    },
    Leave {
        window: WindowId,
    },
}

/// Translates winit window events for registered windows.
pub struct WinitAdapter {
    queue: WsiQueue,
    windows: HashMap<winit::window::WindowId, WindowId>,
    devices: HashMap<DeviceId, TouchDeviceId>,
    geometry: HashMap<WindowId, Rect>,
    cursor: HashMap<WindowId, Point2<f64>>,
    modifiers: Modifiers,
    epoch: Instant,
    drags: Vec<DragRequest>,
}

impl WinitAdapter {
    /// Create an adapter posting into the context's queue.
    pub fn new(context: &AppContext) -> Self {
        Self {
            queue: context.queue().clone(),
            windows: HashMap::new(),
            devices: HashMap::new(),
            geometry: HashMap::new(),
            cursor: HashMap::new(),
            modifiers: Modifiers::empty(),
            epoch: Instant::now(),
            drags: Vec::new(),
        }
    }

    /// Associate a winit window with a registered window.
    pub fn register(&mut self, native: winit::window::WindowId, window: WindowId, geometry: Rect) {
        self.windows.insert(native, window);
        self.geometry.insert(window, geometry);
        log::debug!("Mapped winit window {:?} to {:?}", native, window);
    }

    pub fn unregister(&mut self, native: winit::window::WindowId) -> Option<WindowId> {
        let window = self.windows.remove(&native)?;
        self.geometry.remove(&window);
        self.cursor.remove(&window);
        Some(window)
    }

    /// The registered window for a winit window id.
    pub fn window_id(&self, native: winit::window::WindowId) -> Option<WindowId> {
        self.windows.get(&native).copied()
    }

    /// Milliseconds since the adapter was created.
    pub fn timestamp(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Translate a window event and post the result. Events of unknown windows are ignored.
    pub fn handle_window_event(&mut self, native: winit::window::WindowId, event: &WindowEvent) {
        let Some(window) = self.window_id(native) else {
            log::trace!("Ignoring event for unmapped winit window {:?}", native);
            return;
        };

        let kind = match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = Point2::new(position.x, position.y);
                self.cursor.insert(window, position);
                NativeEventKind::MouseMove {
                    position,
                    global_position: self.global(window, position),
                }
            },
            WindowEvent::CursorEntered { .. } => NativeEventKind::Enter {
                position: self.cursor_position(window),
            },
            WindowEvent::CursorLeft { .. } => NativeEventKind::Leave,
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = mouse_button(*button) else {
                    return;
                };
                let position = self.cursor_position(window);
                let global_position = self.global(window, position);
                match state {
                    ElementState::Pressed => NativeEventKind::MousePress {
                        button,
                        position,
                        global_position,
                    },
                    ElementState::Released => NativeEventKind::MouseRelease {
                        button,
                        position,
                        global_position,
                    },
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let position = self.cursor_position(window);
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => WheelDelta::Lines(Vector2::new(*x as f64, *y as f64)),
                    MouseScrollDelta::PixelDelta(pixels) => WheelDelta::Pixels(Vector2::new(pixels.x, pixels.y)),
                };
                NativeEventKind::Wheel {
                    position,
                    global_position: self.global(window, position),
                    delta,
                }
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                let mut mapped = Modifiers::empty();
                mapped.set(Modifiers::SHIFT, state.shift_key());
                mapped.set(Modifiers::CONTROL, state.control_key());
                mapped.set(Modifiers::ALT, state.alt_key());
                mapped.set(Modifiers::META, state.super_key());
                self.modifiers = mapped;
                return;
            },
            WindowEvent::KeyboardInput { event, .. } => NativeEventKind::Key {
                pressed: event.state == ElementState::Pressed,
                key_code: key_code(event.physical_key),
                text: event.text.as_ref().map(|text| text.to_string()),
                auto_repeat: event.repeat,
            },
            WindowEvent::Touch(touch) => {
                let device = self.touch_device(touch.device_id);
                let position = Point2::new(touch.location.x, touch.location.y);
                let phase = match touch.phase {
                    winit::event::TouchPhase::Started => TouchPhase::Pressed,
                    winit::event::TouchPhase::Moved => TouchPhase::Moved,
                    winit::event::TouchPhase::Ended => TouchPhase::Released,
                    winit::event::TouchPhase::Cancelled => {
                        self.post(window, NativeEventKind::TouchCancel { device });
                        return;
                    },
                };
                let mut point = NativeTouchPoint::new(touch.id as i32, phase, position.x, position.y);
                point.global_position = self.global(window, position);
                if let Some(force) = touch.force {
                    point.pressure = force.normalized().clamp(0.0, 1.0);
                }
                NativeEventKind::Touch {
                    device,
                    points: vec![point],
                }
            },
            WindowEvent::Resized(size) => {
                let rect = self.update_geometry(window, |rect| {
                    rect.width = size.width as i32;
                    rect.height = size.height as i32;
                });
                NativeEventKind::Geometry { rect }
            },
            WindowEvent::Moved(position) => {
                let rect = self.update_geometry(window, |rect| {
                    rect.x = position.x;
                    rect.y = position.y;
                });
                NativeEventKind::Geometry { rect }
            },
            WindowEvent::RedrawRequested => NativeEventKind::Expose {
                region: DirtyRegion::from(self.local_rect(window)),
            },
            WindowEvent::Occluded(occluded) => NativeEventKind::Expose {
                region: if *occluded {
                    DirtyRegion::new()
                } else {
                    DirtyRegion::from(self.local_rect(window))
                },
            },
            WindowEvent::Focused(true) => NativeEventKind::Activated,
            WindowEvent::Focused(false) => NativeEventKind::Deactivated,
            WindowEvent::CloseRequested => NativeEventKind::Close,
            WindowEvent::Destroyed => {
                self.unregister(native);
                NativeEventKind::Destroyed
            },
            WindowEvent::ThemeChanged(_) => NativeEventKind::ThemeChanged,
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => NativeEventKind::ScreenChanged {
                scale_factor: *scale_factor,
            },
            WindowEvent::HoveredFile(path) => {
                self.push_file(window, path, false);
                return;
            },
            WindowEvent::DroppedFile(path) => {
                self.push_file(window, path, true);
                return;
            },
            WindowEvent::HoveredFileCancelled => {
                self.drags.push(DragRequest::Leave { window });
                return;
            },
            _ => return,
        };

        self.post(window, kind);
    }

    fn post(&self, window: WindowId, kind: NativeEventKind) {
        let event = NativeEvent::new(window, self.timestamp(), kind).with_modifiers(self.modifiers);
        self.queue.post(event);
    }

    fn touch_device(&mut self, device: DeviceId) -> TouchDevice {
        let next = TouchDeviceId(self.devices.len() as u32 + 1);
        let id = *self.devices.entry(device).or_insert(next);
        TouchDevice {
            id,
            kind: TouchDeviceKind::TouchScreen,
            native_mouse: false,
        }
    }

    fn cursor_position(&self, window: WindowId) -> Point2<f64> {
        self.cursor.get(&window).copied().unwrap_or_else(Point2::origin)
    }

    fn global(&self, window: WindowId, position: Point2<f64>) -> Point2<f64> {
        let origin = self.geometry.get(&window).copied().unwrap_or_default();
        Point2::new(position.x + origin.x as f64, position.y + origin.y as f64)
    }

    fn local_rect(&self, window: WindowId) -> Rect {
        let rect = self.geometry.get(&window).copied().unwrap_or_default();
        Rect::from_size(rect.width, rect.height)
    }

    fn update_geometry(&mut self, window: WindowId, apply: impl FnOnce(&mut Rect)) -> Rect {
        let rect = self.geometry.entry(window).or_default();
        apply(rect);
        *rect
    }

    fn push_file(&mut self, window: WindowId, path: &std::path::Path, dropped: bool) {
        let url = file_url(path);
        let position = self.cursor_position(window);
        match self.drags.last_mut() {
            Some(DragRequest::Hover {
                window: target,
                pasteboard,
                ..
            }) if !dropped && *target == window => pasteboard.push(PasteboardType::FileUrl, url),
            Some(DragRequest::Drop {
                window: target,
                pasteboard,
                ..
            }) if dropped && *target == window => pasteboard.push(PasteboardType::FileUrl, url),
            _ => {
                let pasteboard = NativePasteboard::new().with(PasteboardType::FileUrl, url);
                self.drags.push(if dropped {
                    DragRequest::Drop {
                        window,
                        pasteboard,
                        position,
                    }
                } else {
                    DragRequest::Hover {
                        window,
                        pasteboard,
                        position,
                    }
                });
            },
        }
    }

    /// Take the drags gathered since the last call.
    pub fn take_drag_requests(&mut self) -> Vec<DragRequest> {
        std::mem::take(&mut self.drags)
    }

    /// Negotiate the gathered drags with the dispatcher. File drags offer copy only.
    pub fn forward_drags(&mut self, app: &mut AppHandler, handler: &mut dyn WindowHandler) {
        for request in self.take_drag_requests() {
            match request {
                DragRequest::Hover {
                    window,
                    pasteboard,
                    position,
                } => {
                    app.process_drag(handler, window, &pasteboard, position, NativeDragOperation::COPY);
                },
                DragRequest::Drop {
                    window,
                    pasteboard,
                    position,
                } => {
                    app.process_drop(handler, window, &pasteboard, position, NativeDragOperation::COPY);
                },
                DragRequest::Leave { window } => app.process_drag_leave(handler, window),
            }
        }
    }
}

fn mouse_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Back => Some(MouseButton::Back),
        winit::event::MouseButton::Forward => Some(MouseButton::Forward),
        winit::event::MouseButton::Other(_) => None,
    }
}

fn key_code(key: PhysicalKey) -> u32 {
    match key {
        PhysicalKey::Code(code) => code as u32,
        PhysicalKey::Unidentified(NativeKeyCode::Xkb(code)) => code,
        PhysicalKey::Unidentified(_) => 0,
    }
}
