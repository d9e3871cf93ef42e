use super::*;
use crate::app::registry::WindowState;
use crate::geometry::{DirtyRegion, Rect};

impl AppHandler {
    /// Ask the window layer whether `window` may close, and close it if so.
    pub(super) fn handle_close(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        if !handler.close_requested(window) {
            log::debug!("Close of {:?} refused", window);
            return;
        }
        handler.event(window, &WindowEvent::Close);
        self.remove_window(handler, window);

        if self.registry.is_empty() && self.config.window.quit_on_last_window_closed {
            log::info!("Last window closed");
            handler.last_window_closed();
            self.context.request_update(Update::EXIT);
        }
    }

    /// Unregister `window` and forget all state referring to it.
    pub(super) fn remove_window(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        let was_focused = self.registry.focus() == Some(window);
        let was_modal = self.registry.modal_stack().any(|modal| modal == window);
        if self.registry.remove(window).is_none() {
            return;
        }

        self.touch.remove_window(window);
        if self.drag.target() == Some(window) {
            self.drag.clear();
        }
        if self.press.is_some_and(|press| press.window == window) {
            self.press = None;
        }

        let mut update = Update::empty();
        if was_focused {
            update |= Update::FOCUS;
        }
        if was_modal {
            update |= Update::MODAL;
            // Windows unblocked by the removal need a repaint.
            for id in self.registry.ids().collect::<Vec<_>>() {
                handler.repaint_requested(id);
            }
            update |= Update::DRAW;
        }
        self.context.request_update(update);
    }

    pub(super) fn handle_geometry(&mut self, handler: &mut dyn WindowHandler, window: WindowId, rect: Rect) {
        let Some(entry) = self.registry.get_mut(window) else {
            return;
        };
        let old = std::mem::replace(&mut entry.geometry, rect);

        if (old.x, old.y) != (rect.x, rect.y) {
            self.deliver(handler, window, WindowEvent::Move { rect });
        }
        if (old.width, old.height) != (rect.width, rect.height) {
            self.deliver(handler, window, WindowEvent::Resize { rect });
            self.registry.mark_dirty(window, Rect::from_size(rect.width, rect.height));
            handler.repaint_requested(window);
            self.context.request_update(Update::LAYOUT | Update::DRAW);
        }
    }

    pub(super) fn handle_expose(&mut self, handler: &mut dyn WindowHandler, window: WindowId, region: DirtyRegion) {
        let Some(entry) = self.registry.get_mut(window) else {
            return;
        };
        entry.exposed = !region.is_empty();
        entry.dirty.merge(&region);
        let exposed = entry.exposed;

        self.deliver(handler, window, WindowEvent::Expose { region });
        if exposed {
            handler.repaint_requested(window);
            self.context.request_update(Update::DRAW);
        }
    }

    pub(super) fn handle_map(&mut self, handler: &mut dyn WindowHandler, window: WindowId, visible: bool) {
        let Some(entry) = self.registry.get_mut(window) else {
            return;
        };
        if entry.visible == visible {
            return;
        }
        entry.visible = visible;
        if !visible {
            entry.exposed = false;
        }
        let event = if visible { WindowEvent::Show } else { WindowEvent::Hide };
        self.deliver(handler, window, event);
    }

    /// Move focus to an activated window unless it is blocked by a modal window.
    pub(super) fn handle_activation(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        let previous = self.registry.focus();
        if previous == Some(window) {
            return;
        }
        if !self.registry.set_focus(window) {
            log::debug!("Ignoring activation of {:?}", window);
            return;
        }

        if let Some(previous) = previous.filter(|id| self.registry.contains(*id)) {
            self.deliver(handler, previous, WindowEvent::FocusOut);
        }
        self.deliver(handler, window, WindowEvent::FocusIn);
        self.context.request_update(Update::FOCUS);
    }

    pub(super) fn handle_deactivation(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        if self.registry.focus() != Some(window) {
            return;
        }
        self.registry.clear_focus();
        self.deliver(handler, window, WindowEvent::FocusOut);
        self.context.request_update(Update::FOCUS);
    }

    pub(super) fn handle_state_change(&mut self, handler: &mut dyn WindowHandler, window: WindowId, state: WindowState) {
        let Some(entry) = self.registry.get_mut(window) else {
            return;
        };
        let old = std::mem::replace(&mut entry.state, state);
        if old != state {
            self.deliver(handler, window, WindowEvent::StateChanged { old, new: state });
        }
    }

    /// Deliver a theme change to every window.
    pub(super) fn handle_theme_broadcast(&mut self, handler: &mut dyn WindowHandler) {
        for window in self.registry.ids().collect::<Vec<_>>() {
            self.deliver(handler, window, WindowEvent::ThemeChanged);
        }
        self.context.request_update(Update::DRAW);
    }

    pub(super) fn handle_screen_change(&mut self, handler: &mut dyn WindowHandler, window: WindowId, scale_factor: f64) {
        let Some(entry) = self.registry.get_mut(window) else {
            return;
        };
        if entry.scale_factor == scale_factor {
            return;
        }
        entry.scale_factor = scale_factor;
        let size = entry.geometry;

        self.deliver(handler, window, WindowEvent::ScreenChanged { scale_factor });
        self.registry.mark_dirty(window, Rect::from_size(size.width, size.height));
        handler.repaint_requested(window);
        self.context.request_update(Update::LAYOUT | Update::DRAW);
    }
}
