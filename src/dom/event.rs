//! DOM events: the event record, listener handles, and bubble path computation.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::node::NodeId;
use super::tree::Dom;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An event delivered to listeners.
///
/// `target` is filled in by [`Document::dispatch_event`](super::Document::dispatch_event);
/// `current_target` tracks the node whose listener is running while the event
/// bubbles.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    value: Option<String>,
    target: Option<NodeId>,
    current_target: Cell<Option<NodeId>>,
    stopped: Cell<bool>,
}

impl Event {
    /// Create an event of the given kind, e.g. `"click"` or `"input"`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            target: None,
            current_target: Cell::new(None),
            stopped: Cell::new(false),
        }
    }

    /// Attach the target's current value (builder), as an `input` event carries.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The node the event was dispatched at.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    /// Stop the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }

    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(Some(node));
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// A shared event listener.
///
/// Handlers compare by reference: two handlers are equal only when they are
/// clones of the same allocation.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event) -> Result<()>>);

impl Handler {
    pub fn new(f: impl Fn(&Event) -> Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the listener.
    pub fn call(&self, event: &Event) -> Result<()> {
        (self.0)(event)
    }

    /// Whether both handles point at the same listener.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Bubble path
// ---------------------------------------------------------------------------

/// Compute the bubble path from `start` up to the topmost ancestor (inclusive).
///
/// Returns `[start, parent, grandparent, ...]`.
/// If `start` does not exist in the document, returns an empty vec.
pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
    if !dom.contains(start) {
        return Vec::new();
    }
    let mut path = vec![start];
    path.extend(dom.ancestors(start));
    path
}
