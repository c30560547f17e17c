//! Shared document handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::event::{bubble_path, Event, Handler};
use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::error::{Error, Result};

/// A clonable handle to an in-memory document.
///
/// Every method borrows the underlying [`Dom`] only for the duration of the
/// call, so listeners and effects are free to use the document themselves.
#[derive(Clone, Default)]
pub struct Document {
    dom: Rc<RefCell<Dom>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with shared access to the tree.
    pub fn with<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.dom.borrow())
    }

    /// Run `f` with exclusive access to the tree.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        f(&mut self.dom.borrow_mut())
    }

    pub fn body(&self) -> NodeId {
        self.with(Dom::body)
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.with_mut(|dom| dom.create(NodeData::element(tag)))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.with_mut(|dom| dom.create(NodeData::text(text)))
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.with_mut(|dom| dom.append_child(parent, child))
    }

    pub fn insert_before(&self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<()> {
        self.with_mut(|dom| dom.insert_before(parent, child, before))
    }

    pub fn detach(&self, id: NodeId) {
        self.with_mut(|dom| dom.detach(id));
    }

    /// Remove a node and its subtree. Returns whether anything was removed.
    pub fn remove(&self, id: NodeId) -> bool {
        self.with_mut(|dom| dom.remove(id).is_some())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.with(|dom| dom.parent(id))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.with(|dom| dom.children(id).to_vec())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.with(|dom| dom.contains(id))
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.with(|dom| dom.is_connected(id))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.with(|dom| dom.get(id).is_some_and(NodeData::is_element))
    }

    pub fn len(&self) -> usize {
        self.with(Dom::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(Dom::is_empty)
    }

    pub fn tag(&self, id: NodeId) -> Option<String> {
        self.with(|dom| dom.get(id).and_then(NodeData::tag).map(str::to_owned))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.with(|dom| dom.get(id).and_then(|data| data.attribute(name)).map(str::to_owned))
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.with_mut(|dom| {
            let el = element_mut(dom, id)?;
            el.attributes.insert(name.to_owned(), value.to_owned());
            Ok(())
        })
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Result<()> {
        self.with_mut(|dom| {
            element_mut(dom, id)?.attributes.remove(name);
            Ok(())
        })
    }

    /// Install the listener for `event`, replacing any previous one.
    pub fn set_listener(&self, id: NodeId, event: &str, handler: Handler) -> Result<()> {
        self.with_mut(|dom| {
            element_mut(dom, id)?.listeners.insert(event.to_owned(), handler);
            Ok(())
        })
    }

    pub fn remove_listener(&self, id: NodeId, event: &str) -> Result<()> {
        self.with_mut(|dom| {
            element_mut(dom, id)?.listeners.remove(event);
            Ok(())
        })
    }

    pub fn listener(&self, id: NodeId, event: &str) -> Option<Handler> {
        self.with(|dom| {
            dom.get(id)
                .and_then(NodeData::as_element)
                .and_then(|el| el.listeners.get(event).cloned())
        })
    }

    pub fn has_listener(&self, id: NodeId, event: &str) -> bool {
        self.listener(id, event).is_some()
    }

    /// Replace the content of a text node.
    pub fn set_text(&self, id: NodeId, text: &str) -> Result<()> {
        self.with_mut(|dom| match dom.get_mut(id) {
            Some(NodeData::Text(current)) => {
                text.clone_into(current);
                Ok(())
            }
            _ => Err(Error::UnknownNode(id)),
        })
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<String> {
        self.with(|dom| match dom.get(id) {
            Some(NodeData::Text(text)) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.with(|dom| dom.text_content(id))
    }

    pub fn title(&self) -> String {
        self.with(|dom| dom.title().to_owned())
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.with_mut(|dom| dom.set_title(title));
    }

    /// First connected node matching `selector`, searching from the body.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.with(|dom| dom.query_selector(dom.body(), selector))
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.with(|dom| dom.query_selector_all(dom.body(), selector))
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.with(|dom| dom.inner_html(id))
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        self.with(|dom| dom.outer_html(id))
    }

    /// Deliver `event` to `target` and bubble it through the target's ancestors.
    ///
    /// Each listener runs with the document unborrowed. Bubbling ends early when
    /// a listener calls [`Event::stop_propagation`] or returns an error; the
    /// error is returned to the caller. Returns whether any listener ran.
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> Result<bool> {
        if !self.contains(target) {
            return Err(Error::UnknownNode(target));
        }
        event.set_target(target);
        let path = self.with(|dom| bubble_path(dom, target));
        let mut handled = false;
        for node in path {
            let Some(handler) = self.listener(node, event.kind()) else {
                continue;
            };
            event.set_current_target(node);
            tracing::trace!(target: "dominoz", kind = event.kind(), ?node, "dispatching event");
            handled = true;
            handler.call(&event)?;
            if event.is_propagation_stopped() {
                break;
            }
        }
        Ok(handled)
    }

    /// Whether both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.dom, &other.dom)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.len())
            .finish()
    }
}

fn element_mut(dom: &mut Dom, id: NodeId) -> Result<&mut super::node::ElementData> {
    dom.get_mut(id)
        .and_then(NodeData::as_element_mut)
        .ok_or(Error::UnknownNode(id))
}
