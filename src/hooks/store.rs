//! Per-tile hook storage.

use std::any::Any;

/// A cleanup returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

/// Which hook occupies a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
    Signal,
    Effect,
    Anchor,
}

pub(crate) struct EffectSlot {
    /// `None` when the effect runs after every commit.
    pub deps: Option<Box<dyn Any>>,
    pub cleanup: Option<Cleanup>,
}

pub(crate) enum HookSlot {
    Signal(Box<dyn Any>),
    Effect(EffectSlot),
    /// Holds an `Anchor<T>`.
    Anchor(Box<dyn Any>),
}

impl HookSlot {
    pub fn kind(&self) -> HookKind {
        match self {
            Self::Signal(_) => HookKind::Signal,
            Self::Effect(_) => HookKind::Effect,
            Self::Anchor(_) => HookKind::Anchor,
        }
    }
}

/// An effect queued during render, run by the flush after commit.
pub(crate) struct PendingEffect {
    pub slot: usize,
    pub run: Box<dyn FnOnce() -> Option<Cleanup>>,
}

/// Ordered hook slots of one component tile.
///
/// Slots are addressed purely by call order. After the first completed
/// render the slot count is fixed.
#[derive(Default)]
pub(crate) struct HookStore {
    pub slots: Vec<HookSlot>,
    /// Set once a render has completed; later renders must match the layout.
    pub rendered: bool,
}

impl HookStore {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn signal<T: 'static>(&self, slot: usize) -> Option<&T> {
        match self.slots.get(slot)? {
            HookSlot::Signal(value) => value.downcast_ref(),
            _ => None,
        }
    }

    pub fn signal_mut<T: 'static>(&mut self, slot: usize) -> Option<&mut T> {
        match self.slots.get_mut(slot)? {
            HookSlot::Signal(value) => value.downcast_mut(),
            _ => None,
        }
    }

    /// Take the stored cleanup of an effect slot.
    pub fn take_cleanup(&mut self, slot: usize) -> Option<Cleanup> {
        match self.slots.get_mut(slot)? {
            HookSlot::Effect(effect) => effect.cleanup.take(),
            _ => None,
        }
    }

    /// Store an effect's cleanup. If the slot is occupied or not an effect,
    /// the cleanup is handed back so the caller can run it.
    pub fn store_cleanup(&mut self, slot: usize, cleanup: Cleanup) -> Option<Cleanup> {
        match self.slots.get_mut(slot) {
            Some(HookSlot::Effect(effect)) if effect.cleanup.is_none() => {
                effect.cleanup = Some(cleanup);
                None
            }
            _ => Some(cleanup),
        }
    }

    /// Take every stored cleanup, in slot order.
    pub fn take_cleanups(&mut self) -> Vec<Cleanup> {
        self.slots
            .iter_mut()
            .filter_map(|slot| match slot {
                HookSlot::Effect(effect) => effect.cleanup.take(),
                _ => None,
            })
            .collect()
    }
}
