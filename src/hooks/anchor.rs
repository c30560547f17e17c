//! `use_anchor`: a mutable cell whose identity survives re-renders.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;

use super::scope::{Claim, Scope};
use super::store::{HookKind, HookSlot};

/// A shared mutable cell. Writing it never triggers a render.
pub struct Anchor<T> {
    cell: Rc<RefCell<T>>,
}

/// An anchor bound to a host element through the `ref` prop.
pub type NodeRef = Anchor<Option<NodeId>>;

impl<T> Anchor<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    /// Whether both handles share the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Anchor<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Anchor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_borrow() {
            Ok(value) => f.debug_tuple("Anchor").field(&*value).finish(),
            Err(_) => f.write_str("Anchor(<borrowed>)"),
        }
    }
}

/// Return this component's anchor, created from `initial` on first render.
pub fn use_anchor<T: 'static>(cx: &mut Scope<'_>, initial: T) -> Anchor<T> {
    match cx.claim(HookKind::Anchor) {
        Claim::Fresh(_) => {
            let anchor = Anchor::new(initial);
            cx.fill(HookSlot::Anchor(Box::new(anchor.clone())));
            anchor
        }
        Claim::Existing(slot) => {
            let existing = match cx.slot_mut(slot) {
                Some(HookSlot::Anchor(any)) => any.downcast_ref::<Anchor<T>>().cloned(),
                _ => None,
            };
            existing.unwrap_or_else(|| {
                cx.violate(slot, "anchor type changed between renders");
                Anchor::new(initial)
            })
        }
        Claim::Rejected(_) => Anchor::new(initial),
    }
}

/// Shorthand for an empty [`NodeRef`] anchor.
pub fn use_node_ref(cx: &mut Scope<'_>) -> NodeRef {
    use_anchor(cx, None)
}
