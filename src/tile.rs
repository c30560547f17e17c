//! Tiles: the persistent render contexts behind mounted VNodes.
//!
//! One tile exists per mounted component instance, host element and text
//! node. Tiles live in a slotmap arena; parent and child links are handles.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::ops::{Index, IndexMut};

use slotmap::{new_key_type, SlotMap};

use crate::dom::NodeId;
use crate::hooks::store::{HookStore, PendingEffect};
use crate::vnode::{Child, Component, ElementType, Key};

new_key_type! {
    /// Handle to a tile in the arena.
    pub struct TileId;
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Lifecycle of a tile: `Pending -> Mounted -> Unmounted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Created by the diff, not yet committed.
    Pending,
    /// Its DOM node is in the document.
    Mounted,
    /// Torn down. Terminal.
    Unmounted,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TileKind {
    Host(Cow<'static, str>),
    Text,
    Component(Component),
}

impl TileKind {
    fn of(child: &Child) -> Self {
        match child {
            Child::Text(_) => Self::Text,
            Child::Element(vnode) => match vnode.ty() {
                ElementType::Host(tag) => Self::Host(tag.clone()),
                ElementType::Component(component) => Self::Component(*component),
            },
        }
    }
}

pub(crate) struct Tile {
    pub kind: TileKind,
    /// The description this tile last rendered.
    pub vnode: Child,
    pub key: Option<Key>,
    pub hooks: HookStore,
    pub pending_effects: Vec<PendingEffect>,
    /// Realized node. Always `None` for components.
    pub dom_node: Option<NodeId>,
    pub children: Vec<TileId>,
    pub parent: Option<TileId>,
    /// Set on root tiles only.
    pub container: Option<NodeId>,
    pub state: TileState,
}

impl Tile {
    pub fn new(vnode: Child, parent: Option<TileId>) -> Self {
        Self {
            kind: TileKind::of(&vnode),
            key: vnode.key().cloned(),
            vnode,
            hooks: HookStore::default(),
            pending_effects: Vec::new(),
            dom_node: None,
            children: Vec::new(),
            parent,
            container: None,
            state: TileState::Pending,
        }
    }

    /// Whether `child` can be rendered by this tile: same type and key.
    pub fn matches(&self, child: &Child) -> bool {
        self.kind == TileKind::of(child) && self.key.as_ref() == child.key()
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, TileKind::Component(_))
    }

    /// Label for diagnostics.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            TileKind::Component(component) => component.name(),
            TileKind::Host(_) => "host",
            TileKind::Text => "text",
        }
    }
}

/// Where a tile's host node is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostParent {
    /// Directly into the render container.
    Container(NodeId),
    /// Into the node of a host tile.
    Tile(TileId),
}

// ---------------------------------------------------------------------------
// TileArena
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct TileArena {
    tiles: SlotMap<TileId, Tile>,
    /// Root tile per render container.
    pub roots: HashMap<NodeId, TileId>,
    /// Containers whose last pass aborted; remounted on the next render.
    pub poisoned: HashSet<NodeId>,
}

impl TileArena {
    pub fn insert(&mut self, tile: Tile) -> TileId {
        self.tiles.insert(tile)
    }

    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        self.tiles.remove(id)
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn count_mounted(&self) -> usize {
        self.tiles
            .values()
            .filter(|tile| tile.state == TileState::Mounted)
            .count()
    }

    /// The node representing a tile in the document. Components resolve to
    /// the node of the tree they render.
    pub fn host_node(&self, id: TileId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let tile = self.get(current)?;
            if let Some(node) = tile.dom_node {
                return Some(node);
            }
            if !tile.is_component() {
                return None;
            }
            current = *tile.children.first()?;
        }
    }

    /// The nearest host ancestor, or the container for tiles at the root.
    pub fn host_parent(&self, id: TileId) -> Option<HostParent> {
        let mut current = id;
        loop {
            let tile = self.get(current)?;
            let Some(parent) = tile.parent else {
                return tile.container.map(HostParent::Container);
            };
            if !self.get(parent)?.is_component() {
                return Some(HostParent::Tile(parent));
            }
            current = parent;
        }
    }

    /// The sibling tile whose node follows this tile's node in the document,
    /// climbing through component parents.
    pub fn next_sibling(&self, id: TileId) -> Option<TileId> {
        let mut current = id;
        loop {
            let parent_id = self.get(current)?.parent?;
            let parent = self.get(parent_id)?;
            let index = parent.children.iter().position(|&c| c == current)?;
            if let Some(&next) = parent.children.get(index + 1) {
                return Some(next);
            }
            if !parent.is_component() {
                return None;
            }
            current = parent_id;
        }
    }

    /// The root tile of the tree containing `id`.
    pub fn root_of(&self, id: TileId) -> Option<TileId> {
        let mut current = id;
        while let Some(parent) = self.get(current)?.parent {
            current = parent;
        }
        Some(current)
    }

    /// The container the tree containing `id` renders into.
    pub fn root_container(&self, id: TileId) -> Option<NodeId> {
        self.root_of(id).and_then(|root| self.get(root)?.container)
    }

    /// Every root tile bound to `container`, including one unlinked from
    /// `roots` by an aborted pass.
    pub fn roots_in(&self, container: NodeId) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.parent.is_none() && tile.container == Some(container))
            .map(|(id, _)| id)
            .collect()
    }

    /// Tiles of the subtree under `id`, children before parents.
    pub fn subtree_post_order(&self, id: TileId) -> Vec<TileId> {
        let mut pre = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(tile) = self.get(current) else {
                continue;
            };
            pre.push(current);
            stack.extend(tile.children.iter().copied());
        }
        // Reversed pre-order with children pushed left to right visits every
        // child before its parent.
        pre.reverse();
        pre
    }

    /// Every tile whose parent chain leads to `root`, including tiles that
    /// were unlinked by an aborted pass. Deepest first.
    pub fn tiles_under(&self, root: TileId) -> Vec<TileId> {
        let mut found: Vec<(usize, TileId)> = self
            .tiles
            .keys()
            .filter_map(|id| {
                let mut depth = 0;
                let mut current = id;
                while let Some(parent) = self.get(current)?.parent {
                    current = parent;
                    depth += 1;
                }
                (current == root).then_some((depth, id))
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found.into_iter().map(|(_, id)| id).collect()
    }

    /// Drop tiles created by an aborted pass and every link to them.
    pub fn discard_pending(&mut self) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|_, tile| tile.state != TileState::Pending);
        let live: HashSet<TileId> = self.tiles.keys().collect();
        for tile in self.tiles.values_mut() {
            tile.children.retain(|child| live.contains(child));
        }
        self.roots.retain(|_, root| live.contains(root));
        before - self.tiles.len()
    }
}

impl Index<TileId> for TileArena {
    type Output = Tile;

    fn index(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }
}

impl IndexMut<TileId> for TileArena {
    fn index_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id]
    }
}
