use super::*;
use crate::drag::{
    negotiate, DragAnswer, DragEvent, DragPhase, DragResponse, DropAction, DropActions, DropResponse,
    NativeDragOperation, NativePasteboard,
};

impl AppHandler {
    /// Negotiate a native drag entering or moving over `window`.
    ///
    /// A rejected drag leaves no state behind. Moves inside the region of the last
    /// accepted answer reuse that answer without asking the window again.
    pub fn process_drag(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        pasteboard: &NativePasteboard,
        position: Point2<f64>,
        supported: NativeDragOperation,
    ) -> DragResponse {
        let _guard = self.context.enter_dispatch();
        if !self.drag_target_usable(handler, window) {
            return DragResponse::reject();
        }
        if let Some(cached) = self.drag.cached_response(window, position) {
            return cached;
        }
        if let Some(previous) = self.drag.target().filter(|target| *target != window) {
            self.send_drag_leave(handler, previous);
        }

        let phase = if self.drag.is_entering(window) {
            DragPhase::Enter
        } else {
            DragPhase::Move
        };
        let supported_actions = DropActions::from(supported);
        let event = DragEvent {
            phase,
            mime_data: self.drag.mime_data(window, pasteboard),
            position,
            supported_actions,
        };
        let answer = handler.drag(window, &event);

        match self.negotiate_answer(supported_actions, &answer) {
            Some(action) => {
                let response = DragResponse {
                    action: Some(action),
                    region: answer.region,
                };
                self.drag.record(window, event.mime_data, response);
                log::trace!("Drag over {:?} accepted with {:?}", window, action);
                response
            },
            None => {
                self.drag.clear();
                DragResponse::reject()
            },
        }
    }

    /// The native drag left `window`.
    pub fn process_drag_leave(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        let _guard = self.context.enter_dispatch();
        if self.drag.target() == Some(window) {
            self.send_drag_leave(handler, window);
        }
    }

    /// Negotiate a native drop on `window`. The drag state is cleared afterwards.
    pub fn process_drop(
        &mut self,
        handler: &mut dyn WindowHandler,
        window: WindowId,
        pasteboard: &NativePasteboard,
        position: Point2<f64>,
        supported: NativeDragOperation,
    ) -> DropResponse {
        let _guard = self.context.enter_dispatch();
        if !self.drag_target_usable(handler, window) {
            return DropResponse::reject();
        }

        let supported_actions = DropActions::from(supported);
        let event = DragEvent {
            phase: DragPhase::Drop,
            mime_data: self.drag.mime_data(window, pasteboard),
            position,
            supported_actions,
        };
        let answer = handler.drag(window, &event);
        self.drag.clear();

        let action = self.negotiate_answer(supported_actions, &answer);
        log::debug!("Drop on {:?} resolved to {:?}", window, action);
        DropResponse { action }
    }

    /// Check that `window` can take part in a drag, dropping any drag state otherwise.
    fn drag_target_usable(&mut self, handler: &mut dyn WindowHandler, window: WindowId) -> bool {
        if !self.registry.contains(window) {
            self.record_anomaly(EventAnomaly::UnknownWindow(window));
            self.drag.clear();
            return false;
        }
        if let Some(modal) = self.registry.blocking_window(window) {
            log::trace!("Rejecting drag over {:?}, blocked by {:?}", window, modal);
            if let Some(previous) = self.drag.target() {
                self.send_drag_leave(handler, previous);
            }
            return false;
        }
        true
    }

    fn negotiate_answer(&mut self, supported: DropActions, answer: &DragAnswer) -> Option<DropAction> {
        let action = negotiate(supported, answer);
        if action.is_none() && !answer.offered.is_empty() {
            self.record_anomaly(EventAnomaly::NoCommonDropAction);
        }
        action
    }

    fn send_drag_leave(&mut self, handler: &mut dyn WindowHandler, window: WindowId) {
        let mime_data = self.drag.mime_data(window, &NativePasteboard::new());
        self.drag.clear();
        if self.registry.contains(window) {
            let event = DragEvent {
                phase: DragPhase::Leave,
                mime_data,
                position: Point2::origin(),
                supported_actions: DropActions::empty(),
            };
            handler.drag(window, &event);
        }
    }
}
