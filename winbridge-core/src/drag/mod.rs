//! Drag-and-drop negotiation between native drag sessions and the window layer.
//!
//! Native enter/move/drop callbacks may arrive while the native event loop is pumped
//! re-entrantly from inside an outer call. Adapters must check
//! [AppContext::is_dispatching](crate::app::context::AppContext::is_dispatching) and not
//! drain the WSI queue recursively; the hazard is bounded, not removed.

use crate::app::registry::WindowId;
use crate::geometry::Rect;
use bitflags::bitflags;
use nalgebra::Point2;
use std::sync::Arc;
use winbridge_services::MimeData;

pub mod pasteboard;

pub use pasteboard::{NativePasteboard, PasteboardType};

bitflags! {
    /// Portable drop actions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DropActions: u8 {
        const COPY = 0b001;
        const MOVE = 0b010;
        const LINK = 0b100;
    }
}

bitflags! {
    /// Native drag operation mask.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NativeDragOperation: u32 {
        const COPY = 1;
        const LINK = 2;
        const GENERIC = 4;
        const PRIVATE = 8;
        const MOVE = 16;
        const DELETE = 32;
    }
}

/// A single drop action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropAction {
    Copy,
    Move,
    Link,
}

impl DropAction {
    pub fn flag(self) -> DropActions {
        match self {
            DropAction::Copy => DropActions::COPY,
            DropAction::Move => DropActions::MOVE,
            DropAction::Link => DropActions::LINK,
        }
    }

    pub fn native(self) -> NativeDragOperation {
        match self {
            DropAction::Copy => NativeDragOperation::COPY,
            DropAction::Move => NativeDragOperation::MOVE,
            DropAction::Link => NativeDragOperation::LINK,
        }
    }
}

impl DropActions {
    /// The preferred single action of the set: copy, then move, then link.
    pub fn preferred(self) -> Option<DropAction> {
        [DropAction::Copy, DropAction::Move, DropAction::Link]
            .into_iter()
            .find(|action| self.contains(action.flag()))
    }
}

impl From<NativeDragOperation> for DropActions {
    fn from(op: NativeDragOperation) -> Self {
        let mut actions = DropActions::empty();
        if op.contains(NativeDragOperation::COPY) {
            actions |= DropActions::COPY;
        }
        if op.contains(NativeDragOperation::LINK) {
            actions |= DropActions::LINK;
        }
        if op.intersects(NativeDragOperation::MOVE | NativeDragOperation::GENERIC) {
            actions |= DropActions::MOVE;
        }
        actions
    }
}

impl From<DropActions> for NativeDragOperation {
    fn from(actions: DropActions) -> Self {
        let mut op = NativeDragOperation::empty();
        if actions.contains(DropActions::COPY) {
            op |= NativeDragOperation::COPY;
        }
        if actions.contains(DropActions::LINK) {
            op |= NativeDragOperation::LINK;
        }
        if actions.contains(DropActions::MOVE) {
            op |= NativeDragOperation::MOVE;
        }
        op
    }
}

/// Phase of a drag delivered to the window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragPhase {
    Enter,
    Move,
    Leave,
    Drop,
}

/// A drag event delivered to a window's drag handler.
#[derive(Debug, Clone)]
pub struct DragEvent {
    pub phase: DragPhase,
    pub mime_data: Arc<MimeData>,
    /// Position in window coordinates.
    pub position: Point2<f64>,
    /// Actions the drag source supports.
    pub supported_actions: DropActions,
}

/// A window's answer to a [DragEvent].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragAnswer {
    /// Actions the window is willing to perform.
    pub offered: DropActions,
    /// The action the window would like, if the source supports it.
    pub preferred: Option<DropAction>,
    /// Area in window coordinates where the same answer holds. Moves inside it are not
    /// re-dispatched.
    pub region: Option<Rect>,
}

impl DragAnswer {
    /// Decline the drag.
    pub fn ignore() -> Self {
        Self::default()
    }

    /// Accept any of `offered`.
    pub fn accept(offered: DropActions) -> Self {
        Self {
            offered,
            ..Self::default()
        }
    }

    pub fn with_preferred(mut self, action: DropAction) -> Self {
        self.preferred = Some(action);
        self
    }

    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }
}

/// Response to a native drag enter or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResponse {
    /// `None` means the drag is rejected.
    pub action: Option<DropAction>,
    pub region: Option<Rect>,
}

impl DragResponse {
    pub fn reject() -> Self {
        Self {
            action: None,
            region: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.action.is_some()
    }

    /// The native operation code for this response.
    pub fn native_operation(&self) -> NativeDragOperation {
        self.action.map(DropAction::native).unwrap_or_default()
    }
}

/// Response to a native drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropResponse {
    pub action: Option<DropAction>,
}

impl DropResponse {
    pub fn reject() -> Self {
        Self { action: None }
    }

    pub fn is_accepted(&self) -> bool {
        self.action.is_some()
    }

    pub fn native_operation(&self) -> NativeDragOperation {
        self.action.map(DropAction::native).unwrap_or_default()
    }
}

/// Choose the action for a drag: the window's preferred action if the source supports
/// it, otherwise the best common action. `None` when there is no common action.
pub fn negotiate(supported: DropActions, answer: &DragAnswer) -> Option<DropAction> {
    let common = supported & answer.offered;
    if common.is_empty() {
        return None;
    }
    answer
        .preferred
        .filter(|action| common.contains(action.flag()))
        .or_else(|| common.preferred())
}

struct ActiveDrag {
    window: WindowId,
    mime_data: Arc<MimeData>,
    response: DragResponse,
}

/// Per-drag state kept between native callbacks.
#[derive(Default)]
pub struct DragNegotiator {
    active: Option<ActiveDrag>,
}

impl DragNegotiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The window currently under an accepted or pending drag.
    pub fn target(&self) -> Option<WindowId> {
        self.active.as_ref().map(|drag| drag.window)
    }

    /// Whether a drag over `window` is entering it (rather than moving within it).
    pub fn is_entering(&self, window: WindowId) -> bool {
        self.target() != Some(window)
    }

    /// Mime data converted for the current drag, reused while it stays over `window`.
    pub fn mime_data(&self, window: WindowId, pasteboard: &NativePasteboard) -> Arc<MimeData> {
        match &self.active {
            Some(drag) if drag.window == window => drag.mime_data.clone(),
            _ => Arc::new(pasteboard.to_mime_data()),
        }
    }

    /// The cached response if `position` lies inside the last answered region.
    pub fn cached_response(&self, window: WindowId, position: Point2<f64>) -> Option<DragResponse> {
        let drag = self.active.as_ref().filter(|drag| drag.window == window)?;
        drag.response
            .region
            .filter(|region| region.contains(position))
            .map(|_| drag.response)
    }

    /// Remember the response given for `window`.
    pub fn record(&mut self, window: WindowId, mime_data: Arc<MimeData>, response: DragResponse) {
        self.active = Some(ActiveDrag {
            window,
            mime_data,
            response,
        });
    }

    /// Forget the current drag. Returns the window it was over.
    pub fn clear(&mut self) -> Option<WindowId> {
        self.active.take().map(|drag| drag.window)
    }
}
