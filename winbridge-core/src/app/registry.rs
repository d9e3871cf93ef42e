//! The window registry: top-level windows, focus and the modal stack.
//!
//! Windows live in an arena of generation-tagged slots. A [WindowId] whose window was
//! removed never resolves again, even after its slot is reused, so stale references are
//! detected by a failed lookup.

use crate::app::modal::{FamilyExemption, ModalPolicy};
use crate::geometry::{DirtyRegion, Rect};
use indexmap::IndexSet;

/// Stable identity of a registered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    index: u32,
    generation: u32,
}

impl WindowId {
    /// Slot index inside the registry arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was handed out.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// The visibility state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

/// How a window blocks input to other windows while it is shown modally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modality {
    #[default]
    NonModal,
    /// Blocks its own ancestors only.
    WindowModal,
    /// Blocks every window of the application.
    ApplicationModal,
}

/// Attributes used to register a new window.
#[derive(Debug, Clone)]
pub struct WindowAttributes {
    /// The title of the window.
    pub title: String,
    /// The initial geometry.
    pub geometry: Rect,
    /// The parent window, used for modal exemption.
    pub parent: Option<WindowId>,
    /// The modality of the window.
    pub modality: Modality,
    /// If the window can become the focus window.
    pub accepts_focus: bool,
}

impl Default for WindowAttributes {
    fn default() -> Self {
        Self {
            title: "New Window".to_string(),
            geometry: Rect::from_size(800, 600),
            parent: None,
            modality: Modality::NonModal,
            accepts_focus: true,
        }
    }
}

impl WindowAttributes {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_geometry(mut self, geometry: Rect) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn with_accepts_focus(mut self, accepts_focus: bool) -> Self {
        self.accepts_focus = accepts_focus;
        self
    }
}

/// Registry-side state of a top-level window.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    /// The title of the window.
    pub title: String,
    /// Geometry in screen coordinates.
    pub geometry: Rect,
    pub state: WindowState,
    /// Whether any part of the window is currently exposed on screen.
    pub exposed: bool,
    /// Whether the window is mapped.
    pub visible: bool,
    pub parent: Option<WindowId>,
    pub modality: Modality,
    pub accepts_focus: bool,
    /// Device pixel ratio of the screen the window is on.
    pub scale_factor: f64,
    pub(crate) dirty: DirtyRegion,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The region damaged since the last repaint.
    pub fn dirty_region(&self) -> &DirtyRegion {
        &self.dirty
    }
}

struct Slot {
    generation: u32,
    window: Option<Window>,
}

/// Canonical collection of top-level windows.
pub struct WindowRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: IndexSet<WindowId>,
    focus: Option<WindowId>,
    modal_stack: IndexSet<WindowId>,
    policy: Box<dyn ModalPolicy>,
}

impl WindowRegistry {
    /// Create an empty registry using the [FamilyExemption] modal policy.
    pub fn new() -> Self {
        Self::with_policy(FamilyExemption)
    }

    /// Create an empty registry with a custom modal exemption policy.
    pub fn with_policy(policy: impl ModalPolicy + 'static) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: IndexSet::new(),
            focus: None,
            modal_stack: IndexSet::new(),
            policy: Box::new(policy),
        }
    }

    /// Replace the modal exemption policy.
    pub fn set_modal_policy(&mut self, policy: impl ModalPolicy + 'static) {
        self.policy = Box::new(policy);
    }

    /// Register a new window.
    pub fn create(&mut self, attrs: WindowAttributes) -> WindowId {
        let parent = attrs.parent.filter(|parent| {
            let known = self.contains(*parent);
            if !known {
                log::warn!("Ignoring unknown parent {:?} for new window", parent);
            }
            known
        });

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    window: None,
                });
                (self.slots.len() - 1) as u32
            },
        };
        let slot = &mut self.slots[index as usize];
        let id = WindowId {
            index,
            generation: slot.generation,
        };

        slot.window = Some(Window {
            id,
            title: attrs.title,
            geometry: attrs.geometry,
            state: WindowState::Normal,
            exposed: false,
            visible: false,
            parent,
            modality: attrs.modality,
            accepts_focus: attrs.accepts_focus,
            scale_factor: 1.0,
            dirty: DirtyRegion::new(),
        });
        self.order.insert(id);
        log::debug!("Registered window {:?}", id);
        id
    }

    /// Remove a window. Clears focus and modal state that referenced it.
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let window = slot.window.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        self.order.shift_remove(&id);
        self.modal_stack.shift_remove(&id);
        if self.focus == Some(id) {
            self.focus = None;
        }
        log::debug!("Removed window {:?}", id);
        Some(window)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.window.as_ref())
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.window.as_mut())
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Window ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.order.iter().copied()
    }

    /// Check whether `ancestor` is a (transitive) parent of `window`.
    pub fn is_ancestor_of(&self, ancestor: WindowId, window: WindowId) -> bool {
        let mut current = self.get(window).and_then(|w| w.parent);
        // Parents are registered before their children, so the chain is bounded.
        let mut remaining = self.len();
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            current = self.get(parent).and_then(|w| w.parent);
        }
        false
    }

    /// Push `id` on top of the modal stack.
    ///
    /// Idempotent if `id` is already topmost; a window further down is moved to the top.
    pub fn show_modal(&mut self, id: WindowId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.top_modal() == Some(id) {
            return true;
        }
        self.modal_stack.shift_remove(&id);
        self.modal_stack.insert(id);
        log::debug!("Window {:?} is now modal (depth {})", id, self.modal_stack.len());
        true
    }

    /// Remove `id` from wherever it sits in the modal stack.
    pub fn hide_modal(&mut self, id: WindowId) -> bool {
        let removed = self.modal_stack.shift_remove(&id);
        if removed {
            log::debug!("Window {:?} is no longer modal", id);
        }
        removed
    }

    /// The most recently shown modal window.
    pub fn top_modal(&self) -> Option<WindowId> {
        self.modal_stack.last().copied()
    }

    /// Modal windows, oldest first.
    pub fn modal_stack(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.modal_stack.iter().copied()
    }

    /// The modal window blocking `id`, if any.
    pub fn blocking_window(&self, id: WindowId) -> Option<WindowId> {
        if !self.contains(id) {
            return None;
        }
        let top = self.top_modal()?;
        if top == id || self.policy.is_exempt(self, id, top) {
            return None;
        }
        Some(top)
    }

    /// Whether input to `id` is blocked by a modal window. Recomputed on every query.
    pub fn is_blocked(&self, id: WindowId) -> bool {
        self.blocking_window(id).is_some()
    }

    /// The current focus window.
    pub fn focus(&self) -> Option<WindowId> {
        self.focus
    }

    /// Move focus to `id`.
    ///
    /// Rejected (focus unchanged) if the window is unknown, blocked or does not accept
    /// focus.
    pub fn set_focus(&mut self, id: WindowId) -> bool {
        let accepts = self.get(id).is_some_and(|w| w.accepts_focus);
        if !accepts || self.is_blocked(id) {
            log::trace!("Focus change to {:?} rejected", id);
            return false;
        }
        self.focus = Some(id);
        true
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Add `rect` (window coordinates) to the window's dirty region.
    pub fn mark_dirty(&mut self, id: WindowId, rect: Rect) -> bool {
        match self.get_mut(id) {
            Some(window) => {
                window.dirty.add(rect);
                true
            },
            None => false,
        }
    }

    /// Take the window's accumulated dirty region for repainting.
    pub fn take_dirty_region(&mut self, id: WindowId) -> DirtyRegion {
        self.get_mut(id)
            .map(|window| window.dirty.take())
            .unwrap_or_default()
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
