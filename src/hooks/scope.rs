//! The render scope handed to every component invocation.

use std::rc::Weak;

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::runtime::RuntimeInner;
use crate::tile::TileId;
use crate::vnode::Child;

use super::store::{HookKind, HookSlot, HookStore, PendingEffect};

/// Outcome of claiming the next hook slot.
pub(crate) enum Claim {
    /// First render: the caller must `fill` the slot.
    Fresh(usize),
    /// The slot exists and holds the same kind of hook.
    Existing(usize),
    /// The call order diverged; the caller returns a throwaway value.
    Rejected(usize),
}

/// Context of the component being rendered.
///
/// Hooks take the scope as their first argument and claim slots in call
/// order.
pub struct Scope<'a> {
    tile: TileId,
    component: &'static str,
    children: &'a [Child],
    store: &'a mut HookStore,
    effects: &'a mut Vec<PendingEffect>,
    runtime: &'a Weak<RuntimeInner>,
    document: &'a Document,
    cursor: usize,
    violation: Option<Error>,
}

impl<'a> Scope<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tile: TileId,
        component: &'static str,
        children: &'a [Child],
        store: &'a mut HookStore,
        effects: &'a mut Vec<PendingEffect>,
        runtime: &'a Weak<RuntimeInner>,
        document: &'a Document,
    ) -> Self {
        Self {
            tile,
            component,
            children,
            store,
            effects,
            runtime,
            document,
            cursor: 0,
            violation: None,
        }
    }

    /// Children passed to the component through `create_element`.
    pub fn children(&self) -> &'a [Child] {
        self.children
    }

    /// Name of the component being rendered.
    pub fn component(&self) -> &'static str {
        self.component
    }

    /// The document the runtime commits into.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub(crate) fn tile(&self) -> TileId {
        self.tile
    }

    pub(crate) fn runtime(&self) -> Weak<RuntimeInner> {
        self.runtime.clone()
    }

    pub(crate) fn claim(&mut self, kind: HookKind) -> Claim {
        let slot = self.cursor;
        self.cursor += 1;
        if self.violation.is_some() {
            return Claim::Rejected(slot);
        }
        match self.store.slots.get(slot) {
            Some(existing) if existing.kind() == kind => Claim::Existing(slot),
            Some(_) => {
                self.violate(slot, "hook kind changed between renders");
                Claim::Rejected(slot)
            }
            None if self.store.rendered => {
                self.violate(slot, "more hooks than the previous render");
                Claim::Rejected(slot)
            }
            None => Claim::Fresh(slot),
        }
    }

    /// Populate the slot returned by [`Claim::Fresh`].
    pub(crate) fn fill(&mut self, slot: HookSlot) {
        self.store.slots.push(slot);
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut HookSlot> {
        self.store.slots.get_mut(slot)
    }

    pub(crate) fn store(&self) -> &HookStore {
        &*self.store
    }

    /// Record the first order violation of this render.
    pub(crate) fn violate(&mut self, slot: usize, reason: &'static str) {
        if self.violation.is_none() {
            self.violation = Some(Error::HookOrderViolation {
                component: self.component,
                slot,
                reason,
            });
        }
    }

    pub(crate) fn queue(&mut self, effect: PendingEffect) {
        self.effects.push(effect);
    }

    /// Validate the hook layout once the component function has returned.
    pub(crate) fn finish(self) -> Result<()> {
        if let Some(violation) = self.violation {
            return Err(violation);
        }
        if self.store.rendered && self.cursor < self.store.len() {
            return Err(Error::HookOrderViolation {
                component: self.component,
                slot: self.cursor,
                reason: "fewer hooks than the previous render",
            });
        }
        self.store.rendered = true;
        Ok(())
    }
}
