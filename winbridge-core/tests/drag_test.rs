use nalgebra::Point2;
use std::sync::Arc;
use winbridge_core::app::context::AppContext;
use winbridge_core::app::event::WindowEvent;
use winbridge_core::app::handler::AppHandler;
use winbridge_core::app::registry::{Modality, WindowAttributes, WindowId};
use winbridge_core::app::window_handler::{RecordingHandler, WindowHandler};
use winbridge_core::config::BridgeConfig;
use winbridge_core::drag::{
    DragAnswer, DragEvent, DragPhase, DropAction, DropActions, NativeDragOperation, NativePasteboard,
    PasteboardType,
};
use winbridge_core::geometry::Rect;
use winbridge_core::platform::events::{NativeEvent, NativeEventKind};
use winbridge_core::platform::HeadlessBackend;

fn setup() -> (AppHandler, RecordingHandler, WindowId) {
    let context = AppContext::new(Arc::new(HeadlessBackend::new()));
    let mut app = AppHandler::new(context, BridgeConfig::default());
    let window = app.create_window(WindowAttributes::default());
    (app, RecordingHandler::new(), window)
}

fn pasteboard() -> NativePasteboard {
    NativePasteboard::new().with(PasteboardType::Utf8PlainText, "hello")
}

fn phases(handler: &RecordingHandler) -> Vec<(WindowId, DragPhase)> {
    handler.drags.iter().map(|(window, event)| (*window, event.phase)).collect()
}

#[test]
fn test_drag_without_common_action_rejected() {
    let (mut app, mut handler, window) = setup();
    handler.drag_answer = DragAnswer::accept(DropActions::LINK);

    let response = app.process_drag(
        &mut handler,
        window,
        &pasteboard(),
        Point2::new(5.0, 5.0),
        NativeDragOperation::COPY | NativeDragOperation::MOVE,
    );

    assert!(!response.is_accepted());
    assert_eq!(response.native_operation(), NativeDragOperation::empty());
    assert_eq!(app.anomaly_count(), 1);
}

#[test]
fn test_drag_enter_then_move_with_converted_data() {
    let (mut app, mut handler, window) = setup();
    handler.drag_answer = DragAnswer::accept(DropActions::COPY | DropActions::MOVE).with_preferred(DropAction::Move);

    let supported = NativeDragOperation::COPY | NativeDragOperation::MOVE;
    let first = app.process_drag(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    let second = app.process_drag(&mut handler, window, &pasteboard(), Point2::new(6.0, 5.0), supported);

    assert_eq!(first.action, Some(DropAction::Move));
    assert_eq!(second.native_operation(), NativeDragOperation::MOVE);
    assert_eq!(phases(&handler), vec![(window, DragPhase::Enter), (window, DragPhase::Move)]);
    assert_eq!(handler.drags[0].1.mime_data.text().as_deref(), Some("hello"));
    assert!(Arc::ptr_eq(&handler.drags[0].1.mime_data, &handler.drags[1].1.mime_data));
}

#[test]
fn test_moves_inside_answer_region_not_redispatched() {
    let (mut app, mut handler, window) = setup();
    handler.drag_answer = DragAnswer::accept(DropActions::COPY).with_region(Rect::new(0, 0, 50, 50));

    let supported = NativeDragOperation::COPY;
    app.process_drag(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    let cached = app.process_drag(&mut handler, window, &pasteboard(), Point2::new(40.0, 40.0), supported);
    app.process_drag(&mut handler, window, &pasteboard(), Point2::new(60.0, 40.0), supported);

    assert_eq!(cached.action, Some(DropAction::Copy));
    assert_eq!(phases(&handler), vec![(window, DragPhase::Enter), (window, DragPhase::Move)]);
}

#[test]
fn test_drag_to_other_window_sends_leave() {
    let (mut app, mut handler, window) = setup();
    let second = app.create_window(WindowAttributes::default());
    handler.drag_answer = DragAnswer::accept(DropActions::COPY);

    let supported = NativeDragOperation::COPY;
    app.process_drag(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    app.process_drag(&mut handler, second, &pasteboard(), Point2::new(5.0, 5.0), supported);
    app.process_drag_leave(&mut handler, second);

    assert_eq!(
        phases(&handler),
        vec![
            (window, DragPhase::Enter),
            (window, DragPhase::Leave),
            (second, DragPhase::Enter),
            (second, DragPhase::Leave),
        ]
    );
}

#[test]
fn test_drop_resolves_action_and_clears_state() {
    let (mut app, mut handler, window) = setup();
    handler.drag_answer = DragAnswer::accept(DropActions::COPY | DropActions::LINK);

    let supported = NativeDragOperation::COPY | NativeDragOperation::LINK;
    app.process_drag(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    let dropped = app.process_drop(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    assert_eq!(dropped.action, Some(DropAction::Copy));

    // A new drag enters again.
    app.process_drag(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), supported);
    assert_eq!(
        phases(&handler),
        vec![
            (window, DragPhase::Enter),
            (window, DragPhase::Drop),
            (window, DragPhase::Enter),
        ]
    );
}

#[test]
fn test_drag_over_blocked_window_rejected() {
    let (mut app, mut handler, window) = setup();
    let dialog = app.create_window(WindowAttributes::default().with_modality(Modality::ApplicationModal));
    app.show_modal(dialog);
    handler.drag_answer = DragAnswer::accept(DropActions::all());

    let response = app.process_drag(
        &mut handler,
        window,
        &pasteboard(),
        Point2::new(5.0, 5.0),
        NativeDragOperation::COPY,
    );
    let dropped = app.process_drop(&mut handler, window, &pasteboard(), Point2::new(5.0, 5.0), NativeDragOperation::COPY);

    assert!(!response.is_accepted());
    assert!(!dropped.is_accepted());
    assert!(handler.drags.is_empty());
}

#[test]
fn test_drag_over_unknown_window_is_anomaly() {
    let (mut app, mut handler, window) = setup();
    app.registry_mut().remove(window);

    let response = app.process_drag(&mut handler, window, &pasteboard(), Point2::origin(), NativeDragOperation::COPY);
    assert!(!response.is_accepted());
    assert_eq!(app.anomaly_count(), 1);
}

#[test]
fn test_generic_operation_maps_to_move() {
    let (mut app, mut handler, window) = setup();
    handler.drag_answer = DragAnswer::accept(DropActions::MOVE);

    let response = app.process_drag(
        &mut handler,
        window,
        &pasteboard(),
        Point2::origin(),
        NativeDragOperation::GENERIC,
    );
    assert_eq!(response.action, Some(DropAction::Move));
}

/// Tries to pump a second dispatcher on the same context from inside a drag callback,
/// the way a native drag loop may call back into the application.
struct NestedPump {
    nested: AppHandler,
    inner: RecordingHandler,
    dispatching: Vec<bool>,
    drained: Vec<usize>,
    queued: Vec<usize>,
}

impl WindowHandler for NestedPump {
    fn event(&mut self, _window: WindowId, _event: &WindowEvent) {}

    fn drag(&mut self, _window: WindowId, _event: &DragEvent) -> DragAnswer {
        self.dispatching.push(self.nested.context().is_dispatching());
        self.drained.push(self.nested.process_events(&mut self.inner));
        self.queued.push(self.nested.context().queue().len());
        DragAnswer::accept(DropActions::COPY)
    }
}

#[test]
fn test_queue_not_drained_during_drag_negotiation() {
    let (mut app, _, window) = setup();
    let context = app.context().clone();
    context.post(NativeEvent::new(window, 0, NativeEventKind::Map));

    let mut pump = NestedPump {
        nested: AppHandler::new(context.clone(), BridgeConfig::default()),
        inner: RecordingHandler::new(),
        dispatching: Vec::new(),
        drained: Vec::new(),
        queued: Vec::new(),
    };
    let response = app.process_drag(
        &mut pump,
        window,
        &pasteboard(),
        Point2::new(5.0, 5.0),
        NativeDragOperation::COPY,
    );

    assert!(response.is_accepted());
    assert_eq!(pump.dispatching, vec![true]);
    assert_eq!(pump.drained, vec![0]);
    assert_eq!(pump.queued, vec![1]);
    assert!(pump.inner.events.is_empty());

    assert!(!context.is_dispatching());
    let mut handler = RecordingHandler::new();
    assert_eq!(app.process_events(&mut handler), 1);
    assert!(context.queue().is_empty());
}
