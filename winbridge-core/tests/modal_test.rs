use std::sync::Arc;
use winbridge_core::app::context::AppContext;
use winbridge_core::app::event::WindowEvent;
use winbridge_core::app::handler::AppHandler;
use winbridge_core::app::modal::NoExemption;
use winbridge_core::app::registry::{Modality, WindowAttributes, WindowId};
use winbridge_core::app::update::Update;
use winbridge_core::app::window_handler::RecordingHandler;
use winbridge_core::config::BridgeConfig;
use winbridge_core::geometry::{DirtyRegion, Rect};
use winbridge_core::platform::events::{MouseButton, NativeEvent, NativeEventKind};
use winbridge_core::platform::HeadlessBackend;

struct Fixture {
    app: AppHandler,
    handler: RecordingHandler,
    main: WindowId,
    other: WindowId,
    dialog: WindowId,
}

fn setup() -> Fixture {
    let context = AppContext::new(Arc::new(HeadlessBackend::new()));
    let mut app = AppHandler::new(context, BridgeConfig::default());
    let main = app.create_window(WindowAttributes::default().with_title("Main"));
    let other = app.create_window(WindowAttributes::default().with_title("Other"));
    let dialog = app.create_window(
        WindowAttributes::default()
            .with_title("Dialog")
            .with_parent(main)
            .with_modality(Modality::ApplicationModal),
    );
    Fixture {
        app,
        handler: RecordingHandler::new(),
        main,
        other,
        dialog,
    }
}

#[test]
fn test_input_to_blocked_window_dropped() {
    let Fixture {
        mut app,
        mut handler,
        other,
        dialog,
        ..
    } = setup();
    assert!(app.show_modal(dialog));
    assert!(app.context().update().take().contains(Update::MODAL));

    app.context().post(NativeEvent::mouse_press(other, 0, MouseButton::Left, 1.0, 1.0));
    app.context().post(NativeEvent::mouse_press(dialog, 1, MouseButton::Left, 1.0, 1.0));
    app.process_events(&mut handler);

    assert!(handler.events_for(other).is_empty());
    assert_eq!(handler.events_for(dialog).len(), 1);
}

#[test]
fn test_blocked_window_still_gets_window_events() {
    let Fixture {
        mut app,
        mut handler,
        other,
        dialog,
        ..
    } = setup();
    app.show_modal(dialog);

    let region = DirtyRegion::from(Rect::new(0, 0, 4, 4));
    app.context().post(NativeEvent::new(
        other,
        0,
        NativeEventKind::Expose {
            region: region.clone(),
        },
    ));
    app.process_events(&mut handler);

    assert_eq!(handler.events_for(other), vec![&WindowEvent::Expose { region }]);
}

#[test]
fn test_parent_of_modal_exempt_by_default() {
    let Fixture {
        mut app,
        mut handler,
        main,
        dialog,
        ..
    } = setup();
    app.show_modal(dialog);

    assert!(!app.registry().is_blocked(main));
    app.registry_mut().set_modal_policy(NoExemption);
    assert!(app.registry().is_blocked(main));

    app.context().post(NativeEvent::mouse_move(main, 0, 1.0, 1.0));
    app.process_events(&mut handler);
    assert!(handler.events.is_empty());
}

#[test]
fn test_blocked_window_cannot_take_focus() {
    let Fixture {
        mut app,
        mut handler,
        other,
        dialog,
        ..
    } = setup();
    app.show_modal(dialog);

    app.context().post(NativeEvent::new(other, 0, NativeEventKind::Activated));
    app.context().post(NativeEvent::new(dialog, 1, NativeEventKind::Activated));
    app.process_events(&mut handler);

    assert_eq!(app.registry().focus(), Some(dialog));
    assert!(handler.events_for(other).is_empty());
}

#[test]
fn test_hiding_modal_unblocks() {
    let Fixture {
        mut app,
        mut handler,
        other,
        dialog,
        ..
    } = setup();
    app.show_modal(dialog);
    assert!(app.registry().is_blocked(other));

    assert!(app.hide_modal(dialog));
    assert!(!app.registry().is_blocked(other));

    app.context().post(NativeEvent::mouse_move(other, 0, 1.0, 1.0));
    app.process_events(&mut handler);
    assert_eq!(handler.events_for(other).len(), 1);
}

#[test]
fn test_closing_modal_unblocks_and_repaints() {
    let Fixture {
        mut app,
        mut handler,
        main,
        other,
        dialog,
    } = setup();
    app.show_modal(dialog);
    app.context().update().take();

    app.context().post(NativeEvent::new(dialog, 0, NativeEventKind::Close));
    app.process_events(&mut handler);

    assert!(app.registry().top_modal().is_none());
    assert!(!app.registry().is_blocked(other));
    assert_eq!(handler.repaints, vec![main, other]);
    let update = app.context().update().take();
    assert!(update.contains(Update::MODAL | Update::DRAW));
    assert!(!update.contains(Update::EXIT));
}

#[test]
fn test_stacked_modals_block_by_topmost() {
    let Fixture {
        mut app,
        main,
        dialog,
        ..
    } = setup();
    let second = app.create_window(WindowAttributes::default().with_modality(Modality::ApplicationModal));
    app.show_modal(dialog);
    app.show_modal(second);

    assert!(app.registry().is_blocked(dialog));
    assert!(app.registry().is_blocked(main));
    assert!(!app.registry().is_blocked(second));

    app.hide_modal(dialog);
    assert_eq!(app.registry().modal_stack().collect::<Vec<_>>(), vec![second]);
    assert!(app.registry().is_blocked(dialog));
}
