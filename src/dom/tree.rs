//! Tree operations: create, insert, detach, remove, walk.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};
use crate::error::{Error, Result};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The document tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Nodes are created detached; a node is *connected* once its ancestor chain
/// reaches the `body` root.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    body: NodeId,
    title: String,
}

impl Dom {
    /// Create a document holding only its `body` root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::element("body"));
        let mut children = SecondaryMap::new();
        children.insert(body, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            body,
            title: String::new(),
        }
    }

    /// The `body` root. Always connected.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Allocate a detached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert `child` into `parent` before `before`, or at the end when
    /// `before` is `None`.
    ///
    /// A child that already has a parent is detached first, so this doubles as
    /// a move. Inserting a node before itself is a no-op.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::UnknownNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(Error::UnknownNode(child));
        }
        if before == Some(child) {
            return Ok(());
        }
        if let Some(reference) = before {
            if self.parent.get(reference) != Some(&parent) {
                return Err(Error::UnknownNode(reference));
            }
        }
        debug_assert!(
            child != parent && !self.ancestors(parent).contains(&child),
            "cannot insert a node into its own subtree"
        );

        self.detach(child);

        let siblings = self
            .children
            .get_mut(parent)
            .ok_or(Error::UnknownNode(parent))?;
        let index = before
            .and_then(|reference| siblings.iter().position(|&sibling| sibling == reference))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.parent.insert(child, parent);
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Detach a node from its parent, keeping its subtree intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    /// The body root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) || id == self.body {
            return None;
        }

        self.detach(id);

        let mut stack = vec![id];
        let mut removed_root_data = None;
        while let Some(current) = stack.pop() {
            if let Some(kids) = self.children.remove(current) {
                stack.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }
        removed_root_data
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the topmost ancestor.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether the node is the body or has the body among its ancestors.
    pub fn is_connected(&self, id: NodeId) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        id == self.body || self.ancestors(id).last() == Some(&self.body)
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Number of live nodes, including detached ones and the body.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the body root is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the document contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Pre-order depth-first traversal starting from `start` (document order).
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a small connected tree:
    /// ```text
    ///       body
    ///        |
    ///       div
    ///      /   \
    ///    ul     p
    ///   /  \
    ///  li   li
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.body();
        let div = dom.create(NodeData::element("div"));
        let ul = dom.create(NodeData::element("ul"));
        let p = dom.create(NodeData::element("p"));
        let li1 = dom.create(NodeData::element("li"));
        let li2 = dom.create(NodeData::element("li"));
        dom.append_child(body, div).unwrap();
        dom.append_child(div, ul).unwrap();
        dom.append_child(div, p).unwrap();
        dom.append_child(ul, li1).unwrap();
        dom.append_child(ul, li2).unwrap();
        (dom, div, ul, p, li1, li2)
    }

    #[test]
    fn new_document_has_connected_body() {
        let dom = Dom::new();
        assert_eq!(dom.len(), 1);
        assert!(dom.is_connected(dom.body()));
        assert_eq!(dom.get(dom.body()).unwrap().tag(), Some("body"));
    }

    #[test]
    fn created_nodes_are_detached() {
        let mut dom = Dom::new();
        let id = dom.create(NodeData::element("span"));
        assert!(dom.contains(id));
        assert_eq!(dom.parent(id), None);
        assert!(!dom.is_connected(id));
    }

    #[test]
    fn append_builds_parent_links() {
        let (dom, div, ul, p, li1, li2) = build_tree();
        assert_eq!(dom.children(div), &[ul, p]);
        assert_eq!(dom.children(ul), &[li1, li2]);
        assert_eq!(dom.parent(li1), Some(ul));
        assert!(dom.is_connected(li2));
    }

    #[test]
    fn insert_before_reference() {
        let (mut dom, _div, ul, _p, li1, li2) = build_tree();
        let li0 = dom.create(NodeData::element("li"));
        dom.insert_before(ul, li0, Some(li1)).unwrap();
        assert_eq!(dom.children(ul), &[li0, li1, li2]);
    }

    #[test]
    fn insert_before_moves_existing_child() {
        let (mut dom, _div, ul, _p, li1, li2) = build_tree();
        dom.insert_before(ul, li2, Some(li1)).unwrap();
        assert_eq!(dom.children(ul), &[li2, li1]);
        dom.append_child(ul, li2).unwrap();
        assert_eq!(dom.children(ul), &[li1, li2]);
    }

    #[test]
    fn insert_before_self_is_noop() {
        let (mut dom, _div, ul, _p, li1, li2) = build_tree();
        dom.insert_before(ul, li1, Some(li1)).unwrap();
        assert_eq!(dom.children(ul), &[li1, li2]);
    }

    #[test]
    fn insert_before_foreign_reference_fails() {
        let (mut dom, _div, ul, p, _li1, _li2) = build_tree();
        let li = dom.create(NodeData::element("li"));
        let err = dom.insert_before(ul, li, Some(p)).unwrap_err();
        assert!(matches!(err, Error::UnknownNode(id) if id == p));
    }

    #[test]
    fn ancestors_end_at_body() {
        let (dom, div, ul, _p, li1, _li2) = build_tree();
        assert_eq!(dom.ancestors(li1), vec![ul, div, dom.body()]);
    }

    #[test]
    fn detach_keeps_subtree() {
        let (mut dom, div, ul, p, li1, _li2) = build_tree();
        dom.detach(ul);
        assert_eq!(dom.children(div), &[p]);
        assert!(dom.contains(li1));
        assert!(!dom.is_connected(li1));
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, div, ul, p, li1, li2) = build_tree();
        let removed = dom.remove(ul).unwrap();
        assert_eq!(removed.tag(), Some("ul"));
        assert!(!dom.contains(li1));
        assert!(!dom.contains(li2));
        assert_eq!(dom.children(div), &[p]);
        assert_eq!(dom.len(), 3);
    }

    #[test]
    fn body_cannot_be_removed() {
        let mut dom = Dom::new();
        let body = dom.body();
        assert!(dom.remove(body).is_none());
        assert!(dom.contains(body));
    }

    #[test]
    fn remove_stale_id() {
        let mut dom = Dom::new();
        let id = dom.create(NodeData::text("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
        assert!(!dom.is_connected(id));
    }

    #[test]
    fn walk_depth_first_is_document_order() {
        let (dom, div, ul, p, li1, li2) = build_tree();
        assert_eq!(dom.walk_depth_first(div), vec![div, ul, li1, li2, p]);
    }

    #[test]
    fn title_round_trip() {
        let mut dom = Dom::default();
        dom.set_title("Counter: 1");
        assert_eq!(dom.title(), "Counter: 1");
    }
}
