//! Dispatch: commits a Cascade batch to the document.

use std::cell::RefCell;

use crate::cascade::{Batch, Mutation, Patch};
use crate::config::RuntimeConfig;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::tile::{HostParent, TileArena, TileId, TileKind, TileState};
use crate::vnode::{PropValue, VNode};

/// Applies mutations in order. Tiles are borrowed only between user
/// callbacks, so cleanups may freely touch the runtime and the document.
pub(crate) struct Dispatch<'a> {
    tiles: &'a RefCell<TileArena>,
    document: &'a Document,
    config: &'a RuntimeConfig,
    /// Created host tiles whose `ref` is bound after all mutations.
    assign: Vec<TileId>,
}

impl<'a> Dispatch<'a> {
    pub fn new(
        tiles: &'a RefCell<TileArena>,
        document: &'a Document,
        config: &'a RuntimeConfig,
    ) -> Self {
        Self {
            tiles,
            document,
            config,
            assign: Vec::new(),
        }
    }

    /// Apply every mutation, then resolve refs.
    pub fn apply(mut self, batch: &Batch) -> Result<()> {
        for mutation in &batch.mutations {
            tracing::trace!(target: "dominoz", ?mutation, "applying mutation");
            match mutation {
                Mutation::Create {
                    parent,
                    tile,
                    before,
                } => self.create(*parent, *tile, *before)?,
                Mutation::Update { tile, patch } => self.update(*tile, patch)?,
                Mutation::Remove { tile } => self.remove(*tile),
                Mutation::Move { tile, before } => self.move_before(*tile, *before)?,
            }
        }

        for node_ref in &batch.released_refs {
            node_ref.set(None);
        }
        self.assign.extend(batch.refs.iter().copied());
        for id in std::mem::take(&mut self.assign) {
            self.bind_ref(id);
        }
        Ok(())
    }

    /// Tear down every tile rendered into `container`, whatever state an
    /// aborted pass left them in.
    pub fn purge(&mut self, container: NodeId) -> usize {
        let (order, nodes) = {
            let mut tiles = self.tiles.borrow_mut();
            tiles.roots.remove(&container);
            let order: Vec<TileId> = tiles
                .roots_in(container)
                .into_iter()
                .flat_map(|root| tiles.tiles_under(root))
                .collect();
            let nodes: Vec<NodeId> = order
                .iter()
                .filter_map(|&id| tiles.get(id)?.dom_node)
                .filter(|&node| self.document.parent(node) == Some(container))
                .collect();
            (order, nodes)
        };
        self.teardown(&order, &nodes);
        order.len()
    }

    // -- operations ---------------------------------------------------------

    fn create(&mut self, parent: HostParent, tile: TileId, before: Option<TileId>) -> Result<()> {
        let node = self.realize(tile)?;
        let parent = match parent {
            HostParent::Container(node) => node,
            HostParent::Tile(id) => self.dom_node(id)?,
        };
        let before = before.and_then(|id| self.tiles.borrow().host_node(id));
        self.document.insert_before(parent, node, before)
    }

    fn update(&self, tile: TileId, patch: &Patch) -> Result<()> {
        let node = self.dom_node(tile)?;
        match patch {
            Patch::Props(changes) => {
                for change in changes {
                    self.apply_prop(node, &change.name, change.value.as_ref())?;
                }
                Ok(())
            }
            Patch::Text(text) => self.document.set_text(node, text),
        }
    }

    fn remove(&self, tile: TileId) {
        let (order, node) = {
            let tiles = self.tiles.borrow();
            (tiles.subtree_post_order(tile), tiles.host_node(tile))
        };
        let nodes: Vec<NodeId> = node.into_iter().collect();
        self.teardown(&order, &nodes);
    }

    fn move_before(&self, tile: TileId, before: Option<TileId>) -> Result<()> {
        let (node, before) = {
            let tiles = self.tiles.borrow();
            let node = tiles.host_node(tile).ok_or(Error::Unrealized(tile))?;
            (node, before.and_then(|id| tiles.host_node(id)))
        };
        let parent = self.document.parent(node).ok_or(Error::UnknownNode(node))?;
        self.document.insert_before(parent, node, before)
    }

    // -- helpers ------------------------------------------------------------

    /// Build the node of a pending tile bottom-up and mark its subtree mounted.
    /// Returns the node representing the tile.
    fn realize(&mut self, id: TileId) -> Result<NodeId> {
        let (kind, vnode, children) = {
            let tiles = self.tiles.borrow();
            let tile = &tiles[id];
            (tile.kind.clone(), tile.vnode.clone(), tile.children.clone())
        };

        let own = match &kind {
            TileKind::Text => Some(
                self.document
                    .create_text(vnode.as_text().unwrap_or_default()),
            ),
            TileKind::Host(tag) => {
                let node = self.document.create_element(tag);
                if let Some(vnode) = vnode.as_element() {
                    for (name, value) in vnode.props().iter() {
                        self.apply_prop(node, name, Some(value))?;
                    }
                    if vnode.node_ref().is_some() {
                        self.assign.push(id);
                    }
                }
                for &child in &children {
                    let child_node = self.realize(child)?;
                    self.document.append_child(node, child_node)?;
                }
                Some(node)
            }
            TileKind::Component(_) => None,
        };

        let host = match own {
            Some(node) => node,
            None => {
                let rendered = children.first().copied().ok_or(Error::Unrealized(id))?;
                self.realize(rendered)?
            }
        };

        let mut tiles = self.tiles.borrow_mut();
        let tile = &mut tiles[id];
        tile.dom_node = own;
        tile.state = TileState::Mounted;
        Ok(host)
    }

    /// Unmount tiles (given children first) and remove their nodes.
    fn teardown(&self, order: &[TileId], nodes: &[NodeId]) {
        let mut cleanups = Vec::new();
        let mut refs = Vec::new();
        {
            let mut tiles = self.tiles.borrow_mut();
            for &id in order {
                let Some(tile) = tiles.get_mut(id) else {
                    continue;
                };
                cleanups.extend(tile.hooks.take_cleanups());
                tile.pending_effects.clear();
                if tile.dom_node.is_some() {
                    refs.extend(tile.vnode.as_element().and_then(VNode::node_ref).cloned());
                }
                tile.state = TileState::Unmounted;
            }
        }

        tracing::trace!(target: "dominoz", tiles = order.len(), cleanups = cleanups.len(), "tearing down");
        for cleanup in cleanups {
            cleanup();
        }
        for &node in nodes {
            self.document.remove(node);
        }
        for node_ref in refs {
            node_ref.set(None);
        }

        let mut tiles = self.tiles.borrow_mut();
        for &id in order {
            tiles.remove(id);
        }
    }

    fn bind_ref(&self, id: TileId) {
        let binding = {
            let tiles = self.tiles.borrow();
            tiles.get(id).and_then(|tile| {
                let node_ref = tile.vnode.as_element()?.node_ref()?.clone();
                Some((node_ref, tile.dom_node?))
            })
        };
        if let Some((node_ref, node)) = binding {
            node_ref.set(Some(node));
        }
    }

    fn dom_node(&self, id: TileId) -> Result<NodeId> {
        self.tiles
            .borrow()
            .get(id)
            .and_then(|tile| tile.dom_node)
            .ok_or(Error::Unrealized(id))
    }

    /// Set or clear one prop on a host node.
    ///
    /// Listener props install or drop the handler for their event; all other
    /// props map to attributes, where `Null` and `false` remove the attribute.
    fn apply_prop(&self, node: NodeId, name: &str, value: Option<&PropValue>) -> Result<()> {
        if self.config.is_listener(name) {
            let event = self.config.event_name(name);
            return match value {
                Some(PropValue::Handler(handler)) => {
                    self.document.set_listener(node, &event, handler.clone())
                }
                Some(other) if !other.is_null() => {
                    tracing::warn!(target: "dominoz", prop = name, value = ?other, "listener prop is not a handler");
                    self.document.remove_listener(node, &event)
                }
                _ => self.document.remove_listener(node, &event),
            };
        }
        if let Some(PropValue::Handler(_)) = value {
            tracing::warn!(target: "dominoz", prop = name, "handler passed to a non-listener prop");
        }
        match value.and_then(PropValue::to_attribute) {
            Some(text) => self.document.set_attribute(node, name, &text),
            None => self.document.remove_attribute(node, name),
        }
    }
}
