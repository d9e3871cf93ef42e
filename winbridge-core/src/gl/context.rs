//! Rendering contexts and their per-thread binding.

use crate::error::ContextError;
use crate::gl::format::{select_format, SurfaceFormat};
use crate::gl::surface::{SurfaceId, SurfaceTrait};
use crate::platform::{NativeContext, PlatformBackend};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::ThreadId;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<Weak<GlContext>>> = const { RefCell::new(None) };
}

/// A set of contexts sharing graphics resources.
///
/// A context joins the group of the context it shares with at creation, so groups never
/// form cycles.
#[derive(Debug)]
pub struct ShareGroup {
    id: u64,
    members: Mutex<Vec<u64>>,
}

impl ShareGroup {
    fn new() -> Self {
        Self {
            id: NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed),
            members: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of live contexts in the group.
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    pub fn contains(&self, context: &GlContext) -> bool {
        self.members.lock().contains(&context.id)
    }
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    thread: ThreadId,
    /// `None` once the bound surface was hidden.
    surface: Option<SurfaceId>,
}

/// A rendering context.
///
/// At most one thread holds a context current at a time. Binding from a second thread
/// fails instead of blocking or taking the context over. A context must be released with
/// [GlContext::done_current] before it is dropped or before its thread exits.
pub struct GlContext {
    id: u64,
    backend: Arc<dyn PlatformBackend>,
    requested: SurfaceFormat,
    format: SurfaceFormat,
    native: Option<NativeContext>,
    sharing: bool,
    share_group: Arc<ShareGroup>,
    binding: Mutex<Option<Binding>>,
}

impl GlContext {
    /// Create a new context for `requested`, optionally sharing with `share`.
    ///
    /// If no native format is a superset of the request, or the backend refuses the
    /// context, the returned context is invalid and every operation on it fails. An
    /// invalid `share` context is ignored.
    pub fn new(
        backend: Arc<dyn PlatformBackend>,
        requested: SurfaceFormat,
        share: Option<&Arc<GlContext>>,
    ) -> Arc<Self> {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let share = share.filter(|share| {
            if !share.is_valid() {
                log::warn!("Context {}: ignoring invalid share context {}", id, share.id);
            }
            share.is_valid()
        });

        let (format, native) = match select_format(&requested, &backend.pixel_formats()) {
            Ok(format) => match backend.create_context(&format, share.and_then(|s| s.native)) {
                Ok(native) => (format, Some(native)),
                Err(err) => {
                    log::warn!("Context {}: backend {} refused creation: {}", id, backend.name(), err);
                    (format, None)
                },
            },
            Err(err) => {
                log::warn!("Context {}: {}", id, err);
                (requested, None)
            },
        };

        let sharing = native.is_some() && share.is_some();
        let share_group = match share {
            Some(share) if sharing => share.share_group.clone(),
            _ => Arc::new(ShareGroup::new()),
        };
        if native.is_some() {
            share_group.members.lock().push(id);
            log::debug!("Created context {} on {} ({})", id, backend.name(), format);
        }

        Arc::new(Self {
            id,
            backend,
            requested,
            format,
            native,
            sharing,
            share_group,
            binding: Mutex::new(None),
        })
    }

    /// The context that is current on the calling thread.
    pub fn current() -> Option<Arc<GlContext>> {
        CURRENT_CONTEXT.with(|current| current.borrow().as_ref().and_then(Weak::upgrade))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.native.is_some()
    }

    /// The negotiated format. Equals the request for invalid contexts.
    pub fn format(&self) -> &SurfaceFormat {
        &self.format
    }

    pub fn requested_format(&self) -> &SurfaceFormat {
        &self.requested
    }

    pub fn native_handle(&self) -> Option<NativeContext> {
        self.native
    }

    /// Whether the context was created sharing resources with another context.
    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    pub fn share_group(&self) -> &Arc<ShareGroup> {
        &self.share_group
    }

    /// The thread the context is current on.
    pub fn current_thread(&self) -> Option<ThreadId> {
        (*self.binding.lock()).map(|binding| binding.thread)
    }

    /// Whether the context is current on the calling thread.
    pub fn is_current(&self) -> bool {
        self.current_thread() == Some(std::thread::current().id())
    }

    /// Bind the context to the calling thread and `surface`.
    ///
    /// Fails with [ContextError::CurrentOnOtherThread] if another thread holds the context.
    /// A different context current on this thread is released first.
    pub fn make_current<S: SurfaceTrait + ?Sized>(self: &Arc<Self>, surface: &S) -> Result<(), ContextError> {
        let native = self.native.ok_or(ContextError::Invalid)?;
        let drawable = surface.drawable().ok_or(ContextError::InvalidSurface)?;
        let thread = std::thread::current().id();
        self.check_thread(thread)?;

        if let Some(previous) = Self::current() {
            if !Arc::ptr_eq(&previous, self) {
                previous.done_current();
            }
        }

        let mut binding = self.binding.lock();
        if let Some(Binding { thread: owner, .. }) = *binding {
            if owner != thread {
                return Err(ContextError::CurrentOnOtherThread(owner));
            }
        }
        self.backend.make_current(native, drawable)?;
        *binding = Some(Binding {
            thread,
            surface: Some(surface.id()),
        });
        drop(binding);

        CURRENT_CONTEXT.with(|current| *current.borrow_mut() = Some(Arc::downgrade(self)));
        log::trace!("Context {} current on {:?} for {:?}", self.id, thread, surface.id());
        Ok(())
    }

    fn check_thread(&self, thread: ThreadId) -> Result<(), ContextError> {
        match *self.binding.lock() {
            Some(binding) if binding.thread != thread => Err(ContextError::CurrentOnOtherThread(binding.thread)),
            _ => Ok(()),
        }
    }

    /// Release the context from the calling thread. No-op if it is not current here.
    pub fn done_current(&self) {
        let thread = std::thread::current().id();
        {
            let mut binding = self.binding.lock();
            match *binding {
                Some(current) if current.thread == thread => {
                    if let Some(native) = self.native {
                        self.backend.done_current(native);
                    }
                    *binding = None;
                },
                _ => return,
            }
        }

        CURRENT_CONTEXT.with(|current| {
            let mut current = current.borrow_mut();
            if current
                .as_ref()
                .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), self))
            {
                *current = None;
            }
        });
        log::trace!("Context {} released on {:?}", self.id, thread);
    }

    /// Present the back buffer of `surface`.
    ///
    /// The context must be current on the calling thread for this surface.
    pub fn swap_buffers<S: SurfaceTrait + ?Sized>(&self, surface: &S) -> Result<(), ContextError> {
        let native = self.native.ok_or(ContextError::Invalid)?;
        let drawable = surface.drawable().ok_or(ContextError::InvalidSurface)?;
        let binding = (*self.binding.lock()).ok_or(ContextError::NotCurrent)?;

        if binding.thread != std::thread::current().id() {
            return Err(ContextError::NotCurrent);
        }
        if binding.surface != Some(surface.id()) {
            return Err(ContextError::WrongSurface);
        }
        self.backend.swap_buffers(native, drawable)
    }

    /// Refresh the drawable after its geometry changed.
    pub fn update<S: SurfaceTrait + ?Sized>(&self, surface: &S) {
        if let (true, Some(drawable)) = (self.is_valid(), surface.drawable()) {
            let (width, height) = surface.size();
            self.backend.resize_drawable(drawable, width, height);
        }
    }

    /// Detach `surface` after its window was hidden.
    ///
    /// The thread binding stays in place; swaps fail with [ContextError::WrongSurface]
    /// until the context is made current again.
    pub fn window_was_hidden<S: SurfaceTrait + ?Sized>(&self, surface: &S) {
        let mut binding = self.binding.lock();
        if let Some(current) = binding.as_mut() {
            if current.surface == Some(surface.id()) {
                current.surface = None;
                log::debug!("Context {} detached from hidden {:?}", self.id, surface.id());
            }
        }
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("id", &self.id)
            .field("valid", &self.is_valid())
            .field("format", &self.format)
            .field("share_group", &self.share_group.id)
            .finish()
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        let binding = *self.binding.get_mut();
        debug_assert!(
            binding.is_none(),
            "context {} dropped while current on {:?}",
            self.id,
            binding.map(|b| b.thread)
        );

        if let Some(native) = self.native.take() {
            if binding.is_some() {
                self.backend.done_current(native);
            }
            self.backend.destroy_context(native);
            self.share_group.members.lock().retain(|member| *member != self.id);
            log::debug!("Destroyed context {}", self.id);
        }
    }
}
