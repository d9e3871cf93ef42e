//! The seam to the window layer that receives portable events.

use crate::app::event::WindowEvent;
use crate::app::registry::WindowId;
use crate::drag::{DragAnswer, DragEvent};
use std::collections::HashSet;

/// Receives portable events from the dispatcher.
///
/// Composite events are delivered in a fixed order: a touch event comes before any mouse
/// event synthesized from it, a press before the double click it completes.
pub trait WindowHandler {
    /// Deliver a portable event to `window`.
    fn event(&mut self, window: WindowId, event: &WindowEvent);

    /// Ask whether `window` may close. Defaults to `true`.
    fn close_requested(&mut self, _window: WindowId) -> bool {
        true
    }

    /// Deliver a drag event and return the window's answer. Defaults to ignoring drags.
    fn drag(&mut self, _window: WindowId, _event: &DragEvent) -> DragAnswer {
        DragAnswer::ignore()
    }

    /// `window` has damage that needs repainting.
    fn repaint_requested(&mut self, _window: WindowId) {}

    /// The last window was closed and the application is configured to quit.
    fn last_window_closed(&mut self) {}
}

/// A [WindowHandler] that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    /// Every delivered event in order.
    pub events: Vec<(WindowId, WindowEvent)>,
    /// Every delivered drag event in order.
    pub drags: Vec<(WindowId, DragEvent)>,
    /// Windows whose repaint was requested, in order.
    pub repaints: Vec<WindowId>,
    /// How often the last window was closed.
    pub last_window_closed: usize,
    /// The answer given to every drag.
    pub drag_answer: DragAnswer,
    /// Windows that refuse to close.
    pub refuse_close: HashSet<WindowId>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered to `window`.
    pub fn events_for(&self, window: WindowId) -> Vec<&WindowEvent> {
        self.events
            .iter()
            .filter(|(target, _)| *target == window)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.drags.clear();
        self.repaints.clear();
    }
}

impl WindowHandler for RecordingHandler {
    fn event(&mut self, window: WindowId, event: &WindowEvent) {
        self.events.push((window, event.clone()));
    }

    fn close_requested(&mut self, window: WindowId) -> bool {
        !self.refuse_close.contains(&window)
    }

    fn drag(&mut self, window: WindowId, event: &DragEvent) -> DragAnswer {
        self.drags.push((window, event.clone()));
        self.drag_answer
    }

    fn repaint_requested(&mut self, window: WindowId) {
        self.repaints.push(window);
    }

    fn last_window_closed(&mut self) {
        self.last_window_closed += 1;
    }
}
