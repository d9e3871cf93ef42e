use nalgebra::{Point2, Vector2};
use std::sync::Arc;
use std::time::Duration;
use winbridge_core::app::context::AppContext;
use winbridge_core::app::event::{MouseEventSource, WindowEvent};
use winbridge_core::app::handler::AppHandler;
use winbridge_core::app::registry::{WindowAttributes, WindowId};
use winbridge_core::app::update::Update;
use winbridge_core::app::window_handler::RecordingHandler;
use winbridge_core::config::BridgeConfig;
use winbridge_core::geometry::{DirtyRegion, Rect};
use winbridge_core::platform::events::{MouseButton, NativeEvent, NativeEventKind, WheelDelta};
use winbridge_core::platform::HeadlessBackend;

fn config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.input.double_click_interval = Duration::from_millis(400);
    config.input.double_click_distance = 5.0;
    config.input.wheel_scroll_lines = 3;
    config.input.natural_scrolling = false;
    config
}

fn setup() -> (AppHandler, RecordingHandler, WindowId) {
    let context = AppContext::new(Arc::new(HeadlessBackend::new()));
    let mut app = AppHandler::new(context, config());
    let window = app.create_window(WindowAttributes::default().with_title("Main"));
    (app, RecordingHandler::new(), window)
}

fn double_clicks(handler: &RecordingHandler, window: WindowId) -> usize {
    handler
        .events_for(window)
        .into_iter()
        .filter(|event| matches!(event, WindowEvent::MouseDoubleClick(_)))
        .count()
}

#[test]
fn test_double_click_within_thresholds() {
    let (mut app, mut handler, window) = setup();
    let queue = app.context().queue().clone();

    queue.post(NativeEvent::mouse_press(window, 0, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_release(window, 50, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_press(window, 150, MouseButton::Left, 12.0, 11.0));
    assert_eq!(app.process_events(&mut handler), 3);

    let events = handler.events_for(window);
    assert_eq!(events.len(), 4);
    assert!(matches!(events[2], WindowEvent::MousePress(_)));
    assert!(matches!(events[3], WindowEvent::MouseDoubleClick(_)));
}

#[test]
fn test_slow_presses_are_two_single_clicks() {
    let (mut app, mut handler, window) = setup();
    let queue = app.context().queue().clone();

    queue.post(NativeEvent::mouse_press(window, 0, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_release(window, 50, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_press(window, 500, MouseButton::Left, 12.0, 11.0));
    app.process_events(&mut handler);

    assert_eq!(double_clicks(&handler, window), 0);
}

#[test]
fn test_distant_or_different_button_press_is_single_click() {
    let (mut app, mut handler, window) = setup();
    let queue = app.context().queue().clone();

    queue.post(NativeEvent::mouse_press(window, 0, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_release(window, 10, MouseButton::Left, 10.0, 10.0));
    queue.post(NativeEvent::mouse_press(window, 100, MouseButton::Left, 16.0, 10.0));
    queue.post(NativeEvent::mouse_release(window, 110, MouseButton::Left, 16.0, 10.0));
    queue.post(NativeEvent::mouse_press(window, 200, MouseButton::Right, 16.0, 10.0));
    app.process_events(&mut handler);

    assert_eq!(double_clicks(&handler, window), 0);
}

#[test]
fn test_third_press_starts_new_click_sequence() {
    let (mut app, mut handler, window) = setup();
    let queue = app.context().queue().clone();

    for time in [0u64, 100, 200] {
        queue.post(NativeEvent::mouse_press(window, time, MouseButton::Left, 10.0, 10.0));
        queue.post(NativeEvent::mouse_release(window, time + 10, MouseButton::Left, 10.0, 10.0));
    }
    app.process_events(&mut handler);

    assert_eq!(double_clicks(&handler, window), 1);
}

#[test]
fn test_release_without_press_is_dropped() {
    let (mut app, mut handler, window) = setup();
    let queue = app.context().queue().clone();

    queue.post(NativeEvent::mouse_release(window, 0, MouseButton::Left, 1.0, 1.0));
    queue.post(NativeEvent::mouse_move(window, 5, 2.0, 2.0));
    app.process_events(&mut handler);

    assert_eq!(app.anomaly_count(), 1);
    let events = handler.events_for(window);
    assert_eq!(events.len(), 1);
    match events[0] {
        WindowEvent::MouseMove(event) => {
            assert_eq!(event.source, MouseEventSource::Native);
            assert_eq!(event.button, None);
        },
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_unknown_window_does_not_stop_dispatch() {
    let (mut app, mut handler, window) = setup();
    let gone = app.create_window(WindowAttributes::default());
    app.registry_mut().remove(gone);
    let queue = app.context().queue().clone();

    queue.post(NativeEvent::mouse_move(gone, 0, 1.0, 1.0));
    queue.post(NativeEvent::global(1, NativeEventKind::Close));
    queue.post(NativeEvent::mouse_move(window, 2, 3.0, 3.0));
    assert_eq!(app.process_events(&mut handler), 3);

    assert_eq!(app.anomaly_count(), 2);
    assert_eq!(handler.events.len(), 1);
    assert_eq!(handler.events[0].0, window);
}

#[test]
fn test_wheel_lines_normalized_to_angle_delta() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Wheel {
            position: Point2::new(5.0, 5.0),
            global_position: Point2::new(5.0, 5.0),
            delta: WheelDelta::Lines(Vector2::new(0.0, 1.0)),
        },
    ));
    app.context().post(NativeEvent::new(
        window,
        1,
        NativeEventKind::Wheel {
            position: Point2::new(5.0, 5.0),
            global_position: Point2::new(5.0, 5.0),
            delta: WheelDelta::Lines(Vector2::zeros()),
        },
    ));
    app.process_events(&mut handler);

    let events = handler.events_for(window);
    assert_eq!(events.len(), 1);
    match events[0] {
        WindowEvent::Wheel(wheel) => {
            assert_eq!(wheel.angle_delta, Vector2::new(0, 120));
            assert_eq!(wheel.pixel_delta, None);
            assert_eq!(wheel.lines_per_notch, 3);
            assert!(!wheel.inverted);
        },
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_natural_scrolling_inverts_pixel_wheel() {
    let (mut app, mut handler, window) = setup();
    app.config_mut().input.natural_scrolling = true;
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Wheel {
            position: Point2::origin(),
            global_position: Point2::origin(),
            delta: WheelDelta::Pixels(Vector2::new(0.0, 10.0)),
        },
    ));
    app.process_events(&mut handler);

    match handler.events_for(window)[0] {
        WindowEvent::Wheel(wheel) => {
            assert_eq!(wheel.angle_delta, Vector2::new(0, -20));
            assert_eq!(wheel.pixel_delta, Some(Vector2::new(0.0, -10.0)));
            assert!(wheel.inverted);
        },
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_closing_last_window_requests_exit() {
    let (mut app, mut handler, window) = setup();
    let second = app.create_window(WindowAttributes::default());

    app.context().post(NativeEvent::new(second, 0, NativeEventKind::Close));
    app.process_events(&mut handler);
    assert_eq!(handler.last_window_closed, 0);
    assert!(!app.context().update().get().contains(Update::EXIT));

    app.context().post(NativeEvent::new(window, 1, NativeEventKind::Close));
    app.process_events(&mut handler);
    assert!(app.registry().is_empty());
    assert_eq!(handler.last_window_closed, 1);
    assert!(app.context().update().take().contains(Update::EXIT));
}

#[test]
fn test_refused_close_keeps_window() {
    let (mut app, mut handler, window) = setup();
    handler.refuse_close.insert(window);

    app.context().post(NativeEvent::new(window, 0, NativeEventKind::Close));
    app.process_events(&mut handler);

    assert!(app.registry().contains(window));
    assert!(handler.events.is_empty());
    assert_eq!(handler.last_window_closed, 0);
}

#[test]
fn test_destroyed_window_does_not_quit() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(window, 0, NativeEventKind::Destroyed));
    app.process_events(&mut handler);

    assert!(app.registry().is_empty());
    assert_eq!(handler.last_window_closed, 0);
    assert!(!app.context().update().get().contains(Update::EXIT));
}

#[test]
fn test_quit_policy_disabled() {
    let (mut app, mut handler, window) = setup();
    app.config_mut().window.quit_on_last_window_closed = false;
    app.context().post(NativeEvent::new(window, 0, NativeEventKind::Close));
    app.process_events(&mut handler);

    assert!(app.registry().is_empty());
    assert_eq!(handler.last_window_closed, 0);
}

#[test]
fn test_resize_marks_window_dirty() {
    let (mut app, mut handler, window) = setup();
    app.context().update().take();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Geometry {
            rect: Rect::new(0, 0, 1024, 768),
        },
    ));
    app.process_events(&mut handler);

    assert_eq!(
        handler.events_for(window),
        vec![&WindowEvent::Resize {
            rect: Rect::new(0, 0, 1024, 768)
        }]
    );
    assert_eq!(handler.repaints, vec![window]);
    assert!(app.context().update().get().contains(Update::LAYOUT | Update::DRAW));
    let dirty = app.registry_mut().take_dirty_region(window);
    assert_eq!(dirty.bounding_rect(), Some(Rect::from_size(1024, 768)));
}

#[test]
fn test_move_only_sends_move() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Geometry {
            rect: Rect::new(40, 30, 800, 600),
        },
    ));
    app.process_events(&mut handler);

    assert_eq!(
        handler.events_for(window),
        vec![&WindowEvent::Move {
            rect: Rect::new(40, 30, 800, 600)
        }]
    );
    assert!(handler.repaints.is_empty());
}

#[test]
fn test_expose_and_unexpose() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Expose {
            region: DirtyRegion::from(Rect::new(0, 0, 10, 10)),
        },
    ));
    app.process_events(&mut handler);
    assert!(app.registry().get(window).is_some_and(|w| w.exposed));
    assert_eq!(handler.repaints, vec![window]);

    app.context().post(NativeEvent::new(
        window,
        1,
        NativeEventKind::Expose {
            region: DirtyRegion::new(),
        },
    ));
    app.process_events(&mut handler);
    assert!(app.registry().get(window).is_some_and(|w| !w.exposed));
    assert_eq!(handler.repaints.len(), 1);
}

#[test]
fn test_activation_moves_focus() {
    let (mut app, mut handler, window) = setup();
    let second = app.create_window(WindowAttributes::default());

    app.context().post(NativeEvent::new(window, 0, NativeEventKind::Activated));
    app.context().post(NativeEvent::new(second, 1, NativeEventKind::Activated));
    app.process_events(&mut handler);

    assert_eq!(app.registry().focus(), Some(second));
    let order: Vec<_> = handler.events.iter().map(|(id, event)| (*id, event.clone())).collect();
    assert_eq!(
        order,
        vec![
            (window, WindowEvent::FocusIn),
            (window, WindowEvent::FocusOut),
            (second, WindowEvent::FocusIn),
        ]
    );
}

#[test]
fn test_window_without_focus_acceptance_not_activated() {
    let (mut app, mut handler, _) = setup();
    let tool = app.create_window(WindowAttributes::default().with_accepts_focus(false));

    app.context().post(NativeEvent::new(tool, 0, NativeEventKind::Activated));
    app.process_events(&mut handler);

    assert_eq!(app.registry().focus(), None);
    assert!(handler.events.is_empty());
}

#[test]
fn test_global_theme_change_reaches_every_window() {
    let (mut app, mut handler, window) = setup();
    let second = app.create_window(WindowAttributes::default());

    app.context().post(NativeEvent::global(0, NativeEventKind::ThemeChanged));
    app.process_events(&mut handler);

    assert_eq!(
        handler.events,
        vec![(window, WindowEvent::ThemeChanged), (second, WindowEvent::ThemeChanged)]
    );
}

#[test]
fn test_screen_change_updates_scale_factor() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::ScreenChanged { scale_factor: 2.0 },
    ));
    app.context().post(NativeEvent::new(
        window,
        1,
        NativeEventKind::ScreenChanged { scale_factor: 2.0 },
    ));
    app.process_events(&mut handler);

    assert_eq!(app.registry().get(window).map(|w| w.scale_factor), Some(2.0));
    assert_eq!(handler.events_for(window).len(), 1);
}

#[test]
fn test_key_events_forwarded() {
    let (mut app, mut handler, window) = setup();
    app.context().post(NativeEvent::new(
        window,
        0,
        NativeEventKind::Key {
            pressed: true,
            key_code: 30,
            text: Some("a".to_string()),
            auto_repeat: false,
        },
    ));
    app.context().post(NativeEvent::new(
        window,
        1,
        NativeEventKind::Key {
            pressed: false,
            key_code: 30,
            text: None,
            auto_repeat: false,
        },
    ));
    app.process_events(&mut handler);

    let events = handler.events_for(window);
    assert!(matches!(events[0], WindowEvent::KeyPress(key) if key.text.as_deref() == Some("a")));
    assert!(matches!(events[1], WindowEvent::KeyRelease(key) if key.key_code == 30));
}
