use std::sync::Arc;
use std::time::Duration;
use winbridge::core::platform::Platform;
use winbridge::core::platform::events::{MouseButton, NativeEvent, NativeEventKind, NativeTouchPoint, TouchDevice, TouchPhase};
use winbridge::prelude::*;
use winbridge::services::SettingsRegistry;

/// Logs every event and remembers which windows need a repaint.
#[derive(Default)]
struct DemoHandler {
    repaint: Vec<WindowId>,
    quit: bool,
}

impl WindowHandler for DemoHandler {
    fn event(&mut self, window: WindowId, event: &WindowEvent) {
        log::info!("{:?}: {:?}", window, event);
    }

    fn drag(&mut self, window: WindowId, event: &DragEvent) -> DragAnswer {
        log::info!("{:?}: drag {:?} with {:?}", window, event.phase, event.mime_data.text());
        DragAnswer::accept(DropActions::COPY)
    }

    fn repaint_requested(&mut self, window: WindowId) {
        if !self.repaint.contains(&window) {
            self.repaint.push(window);
        }
    }

    fn last_window_closed(&mut self) {
        self.quit = true;
    }
}

fn main() {
    let loaded = smol::block_on(SettingsRegistry::new());

    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Some(filter) = loaded.as_ref().ok().and_then(|settings| settings.get().general.log_filter()) {
            logger.parse_filters(filter);
        }
    }
    logger.init();

    let settings = match loaded {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Using default settings: {}", err);
            SettingsRegistry::default()
        },
    };
    let config = BridgeConfig::from_settings(settings.get());

    log::info!("Detected platform {:?}, running headless", Platform::detect());
    let backend = Arc::new(HeadlessBackend::new());
    let context = AppContext::new(backend.clone());
    let mut app = AppHandler::new(context.clone(), config.clone());
    let mut handler = DemoHandler::default();

    let window = app.create_window(WindowAttributes::default().with_title("Headless"));
    let surface = Surface::new(backend.clone(), window, SurfaceFormat::default(), 800, 600);
    let gl = GlContext::new(backend.clone(), SurfaceFormat::default(), None);
    let mut link = match DisplayLink::for_backend(backend.as_ref(), &config.pacing) {
        Ok(link) => link,
        Err(err) => {
            log::error!("{}", err);
            return;
        },
    };

    // A native event source on its own thread.
    let queue = context.queue().clone();
    let producer = std::thread::spawn(move || {
        let touch = TouchDevice::touch_screen(1);
        queue.post(NativeEvent::new(window, 0, NativeEventKind::Map));
        queue.post(NativeEvent::new(
            window,
            0,
            NativeEventKind::Expose {
                region: DirtyRegion::from(Rect::from_size(800, 600)),
            },
        ));
        queue.post(NativeEvent::mouse_press(window, 10, MouseButton::Left, 100.0, 100.0));
        queue.post(NativeEvent::mouse_release(window, 60, MouseButton::Left, 100.0, 100.0));
        queue.post(NativeEvent::mouse_press(window, 160, MouseButton::Left, 102.0, 101.0));
        queue.post(NativeEvent::mouse_release(window, 200, MouseButton::Left, 102.0, 101.0));
        queue.post(NativeEvent::touch(
            window,
            300,
            touch,
            vec![NativeTouchPoint::new(1, TouchPhase::Pressed, 40.0, 40.0)],
        ));
        queue.post(NativeEvent::touch(
            window,
            320,
            touch,
            vec![NativeTouchPoint::new(1, TouchPhase::Released, 48.0, 40.0)],
        ));
        std::thread::sleep(Duration::from_millis(100));
        queue.post(NativeEvent::new(window, 500, NativeEventKind::Close));
    });

    let mut frames = 0u64;
    while !handler.quit {
        app.process_events(&mut handler);
        for window in handler.repaint.drain(..) {
            if let Some(rect) = app.registry().get(window).map(|w| Rect::from_size(w.geometry.width, w.geometry.height)) {
                link.request_update(rect);
            }
        }

        match link.wait_for_frame(config.pacing.frame_timeout) {
            FrameWait::Frame(timing) => {
                let Some(region) = link.present(&timing) else {
                    continue;
                };
                if region.is_empty() {
                    continue;
                }
                if let Err(err) = gl.make_current(&surface).and_then(|_| gl.swap_buffers(&surface)) {
                    log::error!("Frame {} failed: {}", timing.serial, err);
                    break;
                }
                frames += 1;
                log::debug!("Presented frame {} ({:?})", timing.serial, region.bounding_rect());
            },
            FrameWait::TimedOut => log::trace!("Missed frame"),
            FrameWait::Stopped => break,
        }
    }

    gl.done_current();
    link.stop();
    if producer.join().is_err() {
        log::error!("Event producer panicked");
    }
    let swaps = surface.drawable().map_or(0, |drawable| backend.swap_count(drawable));
    log::info!("Presented {} frames, {} swaps", frames, swaps);
    let update = context.update().take();
    log::info!("Pending updates on exit: {:?}", update);
}
