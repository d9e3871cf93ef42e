//! Pluggable rules deciding which windows escape a modal window's blocking.
//!
//! Platforms disagree on which related windows stay usable while a modal window is
//! shown, so the rule is a policy object owned by the [WindowRegistry].

use crate::app::registry::{Modality, WindowId, WindowRegistry};

/// Decides whether a window escapes blocking by the topmost modal window.
pub trait ModalPolicy: Send + Sync {
    /// Return `true` if `window` stays usable while `modal` is the topmost modal window.
    ///
    /// Never called with `window == modal`.
    fn is_exempt(&self, registry: &WindowRegistry, window: WindowId, modal: WindowId) -> bool;
}

/// Ancestors and descendants of the modal window are exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyExemption;

impl ModalPolicy for FamilyExemption {
    fn is_exempt(&self, registry: &WindowRegistry, window: WindowId, modal: WindowId) -> bool {
        registry.is_ancestor_of(window, modal) || registry.is_ancestor_of(modal, window)
    }
}

/// Only descendants of the modal window are exempt; its ancestors are blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescendantExemption;

impl ModalPolicy for DescendantExemption {
    fn is_exempt(&self, registry: &WindowRegistry, window: WindowId, modal: WindowId) -> bool {
        registry.is_ancestor_of(modal, window)
    }
}

/// Follows the modal window's [Modality].
///
/// A window-modal window blocks only its ancestors; an application-modal window blocks
/// everything except its own descendants.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalityExemption;

impl ModalPolicy for ModalityExemption {
    fn is_exempt(&self, registry: &WindowRegistry, window: WindowId, modal: WindowId) -> bool {
        if registry.is_ancestor_of(modal, window) {
            return true;
        }
        match registry.get(modal).map(|w| w.modality) {
            Some(Modality::WindowModal) => !registry.is_ancestor_of(window, modal),
            _ => false,
        }
    }
}

/// Nothing escapes: every window except the topmost modal one is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExemption;

impl ModalPolicy for NoExemption {
    fn is_exempt(&self, _registry: &WindowRegistry, _window: WindowId, _modal: WindowId) -> bool {
        false
    }
}
