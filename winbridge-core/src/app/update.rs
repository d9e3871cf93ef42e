use bitflags::bitflags;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

bitflags! {
    /// What the application loop has to do after events were dispatched.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Update: u8 {
        /// A window requested a repaint.
        const DRAW = 0b00001;
        /// Window geometry changed.
        const LAYOUT = 0b00010;
        /// The focus window changed.
        const FOCUS = 0b00100;
        /// The modal stack changed.
        const MODAL = 0b01000;
        /// The last window was closed and the application should quit.
        const EXIT = 0b10000;
    }
}

/// Thread-safe accumulator of [Update] flags.
#[derive(Clone, Debug, Default)]
pub struct UpdateManager {
    flags: Arc<AtomicU8>,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the given flags.
    pub fn insert(&self, update: Update) {
        self.flags.fetch_or(update.bits(), Ordering::AcqRel);
    }

    /// Get the current flags.
    pub fn get(&self) -> Update {
        Update::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Overwrite the current flags.
    pub fn set(&self, update: Update) {
        self.flags.store(update.bits(), Ordering::Release);
    }

    /// Take the current flags, leaving none set.
    pub fn take(&self) -> Update {
        Update::from_bits_truncate(self.flags.swap(0, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_take() {
        let update = UpdateManager::new();
        let other = update.clone();
        update.insert(Update::DRAW);
        other.insert(Update::FOCUS);

        assert_eq!(update.get(), Update::DRAW | Update::FOCUS);
        assert_eq!(update.take(), Update::DRAW | Update::FOCUS);
        assert!(other.get().is_empty());
    }
}
