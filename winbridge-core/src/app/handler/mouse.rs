use super::*;
use crate::app::event::{KeyEvent, WheelEvent};
use crate::platform::events::WheelDelta;
use nalgebra::Vector2;

/// Angle delta of one wheel notch, in eighths of a degree.
const NOTCH_ANGLE: f64 = 120.0;

/// Eighths of a degree per scrolled pixel.
const PIXEL_ANGLE: f64 = 2.0;

impl AppHandler {
    /// Handle a native or synthesized mouse press, release or move.
    pub(super) fn handle_mouse(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        timestamp: u64,
        modifiers: Modifiers,
        kind: NativeEventKind,
        source: MouseEventSource,
    ) {
        match kind {
            NativeEventKind::MousePress {
                button,
                position,
                global_position,
            } => {
                self.buttons |= button.flag();
                self.last_cursor_position = Some(global_position);
                let event = self.mouse_event(Some(button), position, global_position, modifiers, timestamp, source);

                if self.registry.is_blocked(window) {
                    self.press = None;
                    self.deliver(handler, window, WindowEvent::MousePress(event));
                    return;
                }

                let double_click = self.is_double_click(window, button, global_position, timestamp);
                self.deliver(handler, window, WindowEvent::MousePress(event.clone()));
                if double_click {
                    self.press = None;
                    self.deliver(handler, window, WindowEvent::MouseDoubleClick(event));
                } else {
                    self.press = Some(PressTracking {
                        window,
                        button,
                        global_position,
                        timestamp,
                    });
                }
            },
            NativeEventKind::MouseRelease {
                button,
                position,
                global_position,
            } => {
                if !self.buttons.contains(button.flag()) {
                    self.record_anomaly(EventAnomaly::ReleaseWithoutPress(button));
                    return;
                }
                self.buttons.remove(button.flag());
                self.last_cursor_position = Some(global_position);
                let event = self.mouse_event(Some(button), position, global_position, modifiers, timestamp, source);
                self.deliver(handler, window, WindowEvent::MouseRelease(event));
            },
            NativeEventKind::MouseMove {
                position,
                global_position,
            } => {
                self.last_cursor_position = Some(global_position);
                let event = self.mouse_event(None, position, global_position, modifiers, timestamp, source);
                self.deliver(handler, window, WindowEvent::MouseMove(event));
            },
            other => debug_assert!(false, "{} is not a mouse event", other.name()),
        }
    }

    /// Whether a press completes a double click with the tracked press.
    ///
    /// Same window and button, less than the interval apart, and at most the configured
    /// distance away on each axis.
    fn is_double_click(&self, window: WindowId, button: MouseButton, global_position: Point2<f64>, timestamp: u64) -> bool {
        let Some(press) = self.press else {
            return false;
        };
        if press.window != window || press.button != button || timestamp < press.timestamp {
            return false;
        }

        let input = &self.config.input;
        let elapsed = (timestamp - press.timestamp) as u128;
        let distance = input.double_click_distance;
        elapsed < input.double_click_interval.as_millis()
            && (global_position.x - press.global_position.x).abs() <= distance
            && (global_position.y - press.global_position.y).abs() <= distance
    }

    /// Normalize a wheel delta to an angle delta and deliver it.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_wheel(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        timestamp: u64,
        modifiers: Modifiers,
        position: Point2<f64>,
        global_position: Point2<f64>,
        delta: WheelDelta,
    ) {
        let (angle, mut pixel_delta) = match delta {
            WheelDelta::Lines(lines) => (lines * NOTCH_ANGLE, None),
            WheelDelta::Pixels(pixels) => (pixels * PIXEL_ANGLE, Some(pixels)),
        };
        let mut angle_delta = Vector2::new(angle.x.round() as i32, angle.y.round() as i32);

        let inverted = self.config.input.natural_scrolling;
        if inverted {
            angle_delta = -angle_delta;
            pixel_delta = pixel_delta.map(|pixels| -pixels);
        }
        if angle_delta == Vector2::zeros() && pixel_delta.map_or(true, |p| p == Vector2::zeros()) {
            return;
        }

        self.last_cursor_position = Some(global_position);
        let event = WheelEvent {
            position,
            global_position,
            angle_delta,
            pixel_delta,
            lines_per_notch: self.config.input.wheel_scroll_lines,
            inverted,
            modifiers,
            timestamp,
        };
        self.deliver(handler, window, WindowEvent::Wheel(event));
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_key(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        timestamp: u64,
        modifiers: Modifiers,
        pressed: bool,
        key_code: u32,
        text: Option<String>,
        auto_repeat: bool,
    ) {
        let event = KeyEvent {
            key_code,
            text,
            auto_repeat,
            modifiers,
            timestamp,
        };
        let event = if pressed {
            WindowEvent::KeyPress(event)
        } else {
            WindowEvent::KeyRelease(event)
        };
        self.deliver(handler, window, event);
    }
}
