use super::*;
use crate::app::event::{TouchEvent, TouchPoint};
use crate::app::touch::TouchPointState;
use crate::platform::events::{NativeTouchPoint, TouchDevice, TouchPhase};
use indexmap::IndexMap;

impl AppHandler {
    /// Handle a batch of native touch points.
    ///
    /// Points are grouped per owning window. Each window receives one touch event, followed
    /// by any mouse events synthesized from the primary point if the device has no native
    /// mouse.
    pub(super) fn handle_touch(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        timestamp: u64,
        modifiers: Modifiers,
        device: TouchDevice,
        points: &[NativeTouchPoint],
    ) {
        // Per window: whether it had active points before this batch, and its updated points.
        let mut groups: IndexMap<WindowId, (bool, Vec<TouchPointState>)> = IndexMap::new();

        for point in points {
            let owner = match point.phase {
                TouchPhase::Pressed => window,
                _ => match self.touch.get(device.id, point.id) {
                    Some(state) => state.window,
                    None => {
                        self.record_anomaly(EventAnomaly::UnknownTouchPoint {
                            device: device.id,
                            id: point.id,
                        });
                        continue;
                    },
                },
            };
            let had_points = self.touch.has_points(owner, device.id);

            match self.touch.update(window, device.id, point) {
                Ok(tracked) => {
                    if tracked.replaced {
                        self.record_anomaly(EventAnomaly::DuplicateTouchPress {
                            device: device.id,
                            id: point.id,
                        });
                    }
                    groups
                        .entry(owner)
                        .or_insert_with(|| (had_points, Vec::new()))
                        .1
                        .push(tracked.state);
                },
                Err(anomaly) => self.record_anomaly(anomaly),
            }
        }

        for (owner, (had_points, states)) in groups {
            if !self.registry.contains(owner) {
                self.record_anomaly(EventAnomaly::UnknownWindow(owner));
                continue;
            }

            let event = TouchEvent {
                device,
                points: states.iter().map(touch_point).collect(),
                modifiers,
                timestamp,
            };
            let event = if !had_points {
                WindowEvent::TouchBegin(event)
            } else if !self.touch.has_points(owner, device.id) {
                WindowEvent::TouchEnd(event)
            } else {
                WindowEvent::TouchUpdate(event)
            };
            self.deliver(handler, owner, event);

            if !device.native_mouse {
                for state in &states {
                    if let Some(mouse) = self.touch.synthesize_mouse(state) {
                        self.handle_mouse(
                            handler,
                            owner,
                            timestamp,
                            modifiers,
                            mouse,
                            MouseEventSource::SynthesizedFromTouch,
                        );
                    }
                }
            }
        }
    }

    /// Drop every active point of `device` and notify the windows that owned them.
    pub(super) fn handle_touch_cancel(
        &mut self,
        handler: &mut dyn WindowHandler,
        timestamp: u64,
        modifiers: Modifiers,
        device: TouchDevice,
    ) {
        let cancelled = self.touch.cancel(device.id);
        let mut windows: Vec<WindowId> = Vec::new();
        for state in &cancelled {
            if !windows.contains(&state.window) {
                windows.push(state.window);
            }
        }

        for window in windows {
            if self.registry.contains(window) {
                self.deliver(handler, window, WindowEvent::TouchCancel { device });
            }
        }

        if device.native_mouse {
            return;
        }
        // Release the synthesized button of a cancelled primary point.
        for mut state in cancelled.into_iter().filter(|state| state.primary) {
            state.phase = TouchPhase::Released;
            if let Some(mouse) = self.touch.synthesize_mouse(&state) {
                if self.registry.contains(state.window) {
                    self.handle_mouse(
                        handler,
                        state.window,
                        timestamp,
                        modifiers,
                        mouse,
                        MouseEventSource::SynthesizedFromTouch,
                    );
                }
            }
        }
    }
}

fn touch_point(state: &TouchPointState) -> TouchPoint {
    TouchPoint {
        id: state.id,
        position: state.position,
        global_position: state.global_position,
        pressure: state.pressure,
        phase: state.phase,
        primary: state.primary,
    }
}
