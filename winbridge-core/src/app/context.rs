use crate::app::update::{Update, UpdateManager};
use crate::platform::events::NativeEvent;
use crate::platform::queue::WsiQueue;
use crate::platform::PlatformBackend;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The application context shared between native adapters and the dispatcher.
///
/// Constructed once at startup on the main thread and passed to every component that
/// needs it. Cloning is cheap; all clones refer to the same state.
#[derive(Clone)]
pub struct AppContext {
    queue: WsiQueue,
    update: UpdateManager,
    backend: Arc<dyn PlatformBackend>,
    dispatch_depth: Arc<AtomicUsize>,
}

impl AppContext {
    /// Create a new application context for `backend`. Must be called on the main thread.
    pub fn new(backend: Arc<dyn PlatformBackend>) -> Self {
        log::debug!("Creating application context on backend {}", backend.name());
        Self {
            queue: WsiQueue::new(),
            update: UpdateManager::new(),
            backend,
            dispatch_depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the window-system event queue.
    pub fn queue(&self) -> &WsiQueue {
        &self.queue
    }

    /// Post a native event. Callable from any thread.
    pub fn post(&self, event: NativeEvent) {
        self.queue.post(event);
    }

    /// Get the [UpdateManager] of the application.
    pub fn update(&self) -> &UpdateManager {
        &self.update
    }

    /// Request the given update.
    pub fn request_update(&self, update: Update) {
        self.update.insert(update);
    }

    /// Get the platform backend.
    pub fn backend(&self) -> &Arc<dyn PlatformBackend> {
        &self.backend
    }

    /// Whether the dispatcher is currently delivering events or negotiating a drag.
    ///
    /// Native adapters that get called back while this is `true` must only post events
    /// and never pump or drain the queue themselves.
    pub fn is_dispatching(&self) -> bool {
        self.dispatch_depth.load(Ordering::Acquire) > 0
    }

    pub(crate) fn enter_dispatch(&self) -> DispatchGuard {
        self.dispatch_depth.fetch_add(1, Ordering::AcqRel);
        DispatchGuard {
            depth: self.dispatch_depth.clone(),
        }
    }
}

/// Marks the dispatcher as busy until dropped.
pub(crate) struct DispatchGuard {
    depth: Arc<AtomicUsize>,
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}
