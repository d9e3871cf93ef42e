use crate::app::context::AppContext;
use crate::app::event::{MouseEvent, MouseEventSource, WindowEvent};
use crate::app::registry::{WindowAttributes, WindowId, WindowRegistry};
use crate::app::touch::TouchTracker;
use crate::app::update::Update;
use crate::app::window_handler::WindowHandler;
use crate::config::BridgeConfig;
use crate::drag::DragNegotiator;
use crate::error::EventAnomaly;
use crate::platform::events::{Modifiers, MouseButton, MouseButtons, NativeEvent, NativeEventKind};
use nalgebra::Point2;

mod drag;
mod mouse;
mod touch;
mod window;

/// Last press remembered for double-click detection.
#[derive(Debug, Clone, Copy)]
struct PressTracking {
    window: WindowId,
    button: MouseButton,
    global_position: Point2<f64>,
    timestamp: u64,
}

/// The event dispatcher. Owns the window registry and the touch tracker and runs on the
/// main thread only.
pub struct AppHandler {
    context: AppContext,
    config: BridgeConfig,
    registry: WindowRegistry,
    touch: TouchTracker,
    drag: DragNegotiator,
    buttons: MouseButtons,
    press: Option<PressTracking>,
    last_cursor_position: Option<Point2<f64>>,
    anomalies: u64,
}

impl AppHandler {
    /// Create a new handler with the given context and config.
    pub fn new(context: AppContext, config: BridgeConfig) -> Self {
        Self {
            context,
            config,
            registry: WindowRegistry::new(),
            touch: TouchTracker::new(),
            drag: DragNegotiator::new(),
            buttons: MouseButtons::empty(),
            press: None,
            last_cursor_position: None,
            anomalies: 0,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BridgeConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WindowRegistry {
        &mut self.registry
    }

    pub fn touch_tracker(&self) -> &TouchTracker {
        &self.touch
    }

    /// Mouse buttons currently held down.
    pub fn mouse_buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// Screen position of the last mouse or synthesized mouse event.
    pub fn last_cursor_position(&self) -> Option<Point2<f64>> {
        self.last_cursor_position
    }

    /// Number of recoverable anomalies seen so far.
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies
    }

    /// Register a new window.
    pub fn create_window(&mut self, attrs: WindowAttributes) -> WindowId {
        self.registry.create(attrs)
    }

    /// Show `window` modally.
    pub fn show_modal(&mut self, window: WindowId) -> bool {
        let shown = self.registry.show_modal(window);
        if shown {
            self.context.request_update(Update::MODAL);
        }
        shown
    }

    /// Stop showing `window` modally.
    pub fn hide_modal(&mut self, window: WindowId) -> bool {
        let hidden = self.registry.hide_modal(window);
        if hidden {
            self.context.request_update(Update::MODAL);
        }
        hidden
    }

    /// Drain the WSI queue and dispatch every event in arrival order.
    ///
    /// Returns the number of dispatched events. A call made while a dispatch is already in
    /// progress (e.g. from a native callback during drag negotiation) does nothing.
    pub fn process_events(&mut self, handler: &mut dyn WindowHandler) -> usize {
        if self.context.is_dispatching() {
            log::warn!("Refusing to drain the event queue re-entrantly");
            return 0;
        }
        let _guard = self.context.enter_dispatch();

        let events = self.context.queue().drain();
        let count = events.len();
        for event in events {
            self.dispatch_event(handler, event);
        }
        if count > 0 {
            log::trace!("Dispatched {} native events", count);
        }
        count
    }

    /// Dispatch a single native event.
    fn dispatch_event(&mut self, handler: &mut dyn WindowHandler, event: NativeEvent) {
        let NativeEvent {
            window,
            timestamp,
            modifiers,
            kind,
        } = event;

        if let (NativeEventKind::ThemeChanged, None) = (&kind, window) {
            self.handle_theme_broadcast(handler);
            return;
        }

        let Some(window) = window else {
            self.record_anomaly(EventAnomaly::MissingWindow(kind.name()));
            return;
        };
        if !self.registry.contains(window) {
            self.record_anomaly(EventAnomaly::UnknownWindow(window));
            return;
        }

        match kind {
            NativeEventKind::MousePress { .. }
            | NativeEventKind::MouseRelease { .. }
            | NativeEventKind::MouseMove { .. } => {
                self.handle_mouse(handler, window, timestamp, modifiers, kind, MouseEventSource::Native)
            },
            NativeEventKind::Wheel {
                position,
                global_position,
                delta,
            } => self.handle_wheel(handler, window, timestamp, modifiers, position, global_position, delta),
            NativeEventKind::Key {
                pressed,
                key_code,
                text,
                auto_repeat,
            } => self.handle_key(handler, window, timestamp, modifiers, pressed, key_code, text, auto_repeat),
            NativeEventKind::Enter { position } => {
                self.deliver(handler, window, WindowEvent::Enter { position })
            },
            NativeEventKind::Leave => self.deliver(handler, window, WindowEvent::Leave),
            NativeEventKind::Touch { device, points } => {
                self.handle_touch(handler, window, timestamp, modifiers, device, &points)
            },
            NativeEventKind::TouchCancel { device } => {
                self.handle_touch_cancel(handler, timestamp, modifiers, device)
            },
            NativeEventKind::Close => self.handle_close(handler, window),
            NativeEventKind::Geometry { rect } => self.handle_geometry(handler, window, rect),
            NativeEventKind::Expose { region } => self.handle_expose(handler, window, region),
            NativeEventKind::Map => self.handle_map(handler, window, true),
            NativeEventKind::Unmap => self.handle_map(handler, window, false),
            NativeEventKind::Activated => self.handle_activation(handler, window),
            NativeEventKind::Deactivated => self.handle_deactivation(handler, window),
            NativeEventKind::StateChanged { state } => self.handle_state_change(handler, window, state),
            NativeEventKind::ThemeChanged => self.deliver(handler, window, WindowEvent::ThemeChanged),
            NativeEventKind::ScreenChanged { scale_factor } => {
                self.handle_screen_change(handler, window, scale_factor)
            },
            NativeEventKind::Destroyed => self.remove_window(handler, window),
        }
    }

    /// Deliver `event` unless it is input addressed to a modally blocked window.
    fn deliver(&mut self, handler: &mut dyn WindowHandler, window: WindowId, event: WindowEvent) {
        if event.is_input() {
            if let Some(modal) = self.registry.blocking_window(window) {
                log::trace!("Dropping input for {:?}, blocked by {:?}", window, modal);
                return;
            }
        }
        handler.event(window, &event);
    }

    fn record_anomaly(&mut self, anomaly: EventAnomaly) {
        self.anomalies += 1;
        log::warn!("Dropped event: {}", anomaly);
    }

    fn mouse_event(
        &self,
        button: Option<MouseButton>,
        position: Point2<f64>,
        global_position: Point2<f64>,
        modifiers: Modifiers,
        timestamp: u64,
        source: MouseEventSource,
    ) -> MouseEvent {
        MouseEvent {
            button,
            buttons: self.buttons,
            position,
            global_position,
            modifiers,
            timestamp,
            source,
        }
    }
}
