//! Cascade: the diff engine.
//!
//! Compares new VNodes against mounted tiles, re-invokes components, and
//! produces an ordered list of [`Mutation`]s for Dispatch. Cascade never
//! touches the document; it only creates `Pending` tiles and rewires child
//! lists, so an aborted pass leaves the DOM untouched.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Weak;

use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::hooks::{NodeRef, Scope};
use crate::runtime::RuntimeInner;
use crate::tile::{HostParent, Tile, TileArena, TileId};
use crate::vnode::{Child, Component, ElementType, Key, PropChange, VNode};

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Change to an existing node.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Props(Vec<PropChange>),
    Text(String),
}

/// A single DOM operation, in the order Dispatch applies it.
///
/// `before` always names a sibling that is already in its final position
/// when the operation runs; `None` appends.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create {
        parent: HostParent,
        tile: TileId,
        before: Option<TileId>,
    },
    Update {
        tile: TileId,
        patch: Patch,
    },
    Remove {
        tile: TileId,
    },
    Move {
        tile: TileId,
        before: Option<TileId>,
    },
}

/// Everything one pass hands to Dispatch.
#[derive(Default)]
pub(crate) struct Batch {
    pub mutations: Vec<Mutation>,
    /// Component tiles in the order they rendered.
    pub visited: Vec<TileId>,
    /// Existing host tiles whose `ref` changed to a new anchor.
    pub refs: Vec<TileId>,
    /// Anchors detached from a surviving node.
    pub released_refs: Vec<NodeRef>,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    parent: HostParent,
    before: Option<TileId>,
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

pub(crate) struct Cascade<'a> {
    tiles: &'a mut TileArena,
    runtime: &'a Weak<RuntimeInner>,
    document: &'a Document,
    batch: Batch,
}

impl<'a> Cascade<'a> {
    pub fn new(
        tiles: &'a mut TileArena,
        runtime: &'a Weak<RuntimeInner>,
        document: &'a Document,
    ) -> Self {
        Self {
            tiles,
            runtime,
            document,
            batch: Batch::default(),
        }
    }

    pub fn into_batch(self) -> Batch {
        self.batch
    }

    /// Diff `vnode` against the tree rendered into `container`.
    pub fn render_root(&mut self, container: NodeId, vnode: VNode) -> Result<()> {
        let child = Child::Element(vnode);
        let place = Placement {
            parent: HostParent::Container(container),
            before: None,
        };
        if let Some(&root) = self.tiles.roots.get(&container) {
            if self.tiles[root].matches(&child) {
                return self.update(root, &child, place);
            }
            self.batch.mutations.push(Mutation::Remove { tile: root });
            self.tiles.roots.remove(&container);
        }

        let root = self.tiles.insert(Tile::new(child, None));
        self.tiles[root].container = Some(container);
        self.tiles.roots.insert(container, root);
        self.mount_into(root)?;
        self.batch.mutations.push(Mutation::Create {
            parent: place.parent,
            tile: root,
            before: None,
        });
        Ok(())
    }

    /// Tear down the tree rendered into `container`.
    pub fn unmount_root(&mut self, container: NodeId) -> Result<()> {
        if let Some(root) = self.tiles.roots.remove(&container) {
            self.batch.mutations.push(Mutation::Remove { tile: root });
        }
        Ok(())
    }

    /// Re-render a component tile in place after its state changed.
    pub fn rerender(&mut self, id: TileId) -> Result<()> {
        let (Some(parent), Some(tile)) = (self.tiles.host_parent(id), self.tiles.get(id)) else {
            return Ok(());
        };
        let Child::Element(vnode) = tile.vnode.clone() else {
            return Ok(());
        };
        let Some(&component) = vnode.ty().component() else {
            return Ok(());
        };
        let place = Placement {
            parent,
            before: self.tiles.next_sibling(id),
        };
        self.render_component(id, component, &vnode, place)
    }

    // -- mounting -----------------------------------------------------------

    fn mount(&mut self, child: Child, parent: TileId) -> Result<TileId> {
        let id = self.tiles.insert(Tile::new(child, Some(parent)));
        self.mount_into(id)?;
        Ok(id)
    }

    /// Build the subtree of a freshly inserted tile.
    fn mount_into(&mut self, id: TileId) -> Result<()> {
        let Child::Element(vnode) = self.tiles[id].vnode.clone() else {
            return Ok(());
        };
        match vnode.ty() {
            ElementType::Host(_) => {
                for child in vnode.children() {
                    let child_id = self.mount(child.clone(), id)?;
                    self.tiles[id].children.push(child_id);
                }
            }
            ElementType::Component(component) => {
                let rendered = self.invoke(id, *component, &vnode)?;
                let child_id = self.mount(Child::Element(rendered), id)?;
                self.tiles[id].children.push(child_id);
            }
        }
        Ok(())
    }

    /// Call a component function against its tile's hooks.
    fn invoke(&mut self, id: TileId, component: Component, vnode: &VNode) -> Result<VNode> {
        tracing::trace!(target: "dominoz", component = component.name(), "rendering component");
        let mut hooks = std::mem::take(&mut self.tiles[id].hooks);
        let mut effects = Vec::new();
        let mut cx = Scope::new(
            id,
            component.name(),
            vnode.children(),
            &mut hooks,
            &mut effects,
            self.runtime,
            self.document,
        );
        let rendered = component.render(&mut cx, vnode.props());
        let outcome = cx.finish();

        let tile = &mut self.tiles[id];
        tile.hooks = hooks;
        tile.pending_effects = effects;
        outcome?;
        self.batch.visited.push(id);
        Ok(rendered)
    }

    // -- updating -----------------------------------------------------------

    /// Bring a tile that matches `new` up to date.
    fn update(&mut self, id: TileId, new: &Child, place: Placement) -> Result<()> {
        match new {
            Child::Text(text) => {
                let tile = &mut self.tiles[id];
                if tile.vnode.as_text() != Some(text.as_str()) {
                    self.batch.mutations.push(Mutation::Update {
                        tile: id,
                        patch: Patch::Text(text.clone()),
                    });
                }
                tile.vnode = new.clone();
                Ok(())
            }
            Child::Element(vnode) => match vnode.ty() {
                ElementType::Host(_) => self.update_host(id, vnode),
                ElementType::Component(component) => {
                    self.tiles[id].vnode = new.clone();
                    self.render_component(id, *component, vnode, place)
                }
            },
        }
    }

    fn update_host(&mut self, id: TileId, vnode: &VNode) -> Result<()> {
        let old = std::mem::replace(&mut self.tiles[id].vnode, Child::Element(vnode.clone()));
        if let Some(old) = old.as_element() {
            let changes = old.props().diff(vnode.props());
            if !changes.is_empty() {
                self.batch.mutations.push(Mutation::Update {
                    tile: id,
                    patch: Patch::Props(changes),
                });
            }
            match (old.node_ref(), vnode.node_ref()) {
                (Some(old_ref), Some(new_ref)) if old_ref.ptr_eq(new_ref) => {}
                (old_ref, new_ref) => {
                    self.batch.released_refs.extend(old_ref.cloned());
                    if new_ref.is_some() {
                        self.batch.refs.push(id);
                    }
                }
            }
        }
        self.reconcile_children(id, vnode.children())
    }

    /// Render a component and reconcile the single tree it returns.
    fn render_component(
        &mut self,
        id: TileId,
        component: Component,
        vnode: &VNode,
        place: Placement,
    ) -> Result<()> {
        let rendered = Child::Element(self.invoke(id, component, vnode)?);
        let old = self.tiles[id].children.first().copied();
        let child_id = match old {
            Some(old) if self.tiles[old].matches(&rendered) => {
                self.update(old, &rendered, place)?;
                old
            }
            old => {
                if let Some(old) = old {
                    self.batch.mutations.push(Mutation::Remove { tile: old });
                }
                let child_id = self.mount(rendered, id)?;
                self.batch.mutations.push(Mutation::Create {
                    parent: place.parent,
                    tile: child_id,
                    before: place.before,
                });
                child_id
            }
        };
        self.tiles[id].children = vec![child_id];
        Ok(())
    }

    // -- children -------------------------------------------------------------

    /// Reconcile the children of a host tile.
    ///
    /// Children are diffed left to right so components render in document
    /// order, but each child's operations are emitted right to left: every
    /// `Create` or `Move` then refers to a sibling that is already placed.
    fn reconcile_children(&mut self, parent: TileId, new: &[Child]) -> Result<()> {
        let old_ids = std::mem::take(&mut self.tiles[parent].children);
        let keyed = new.iter().any(|child| child.key().is_some())
            || old_ids.iter().any(|&id| self.tiles[id].key.is_some());

        // Old index matched by each new child.
        let mut matched: Vec<Option<usize>> = if keyed {
            self.match_keyed(&old_ids, new)
        } else {
            (0..new.len()).map(|i| (i < old_ids.len()).then_some(i)).collect()
        };

        let mut used = vec![false; old_ids.len()];
        for &index in matched.iter().flatten() {
            used[index] = true;
        }
        let mut removals: Vec<Mutation> = old_ids
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(&tile, _)| Mutation::Remove { tile })
            .collect();

        let mut ids = Vec::with_capacity(new.len());
        let mut fresh = Vec::with_capacity(new.len());
        for (i, child) in new.iter().enumerate() {
            let reused = matched[i]
                .map(|index| old_ids[index])
                .filter(|&id| self.tiles[id].matches(child));
            match reused {
                Some(id) => {
                    ids.push(id);
                    fresh.push(false);
                }
                None => {
                    if let Some(index) = matched[i].take() {
                        removals.push(Mutation::Remove {
                            tile: old_ids[index],
                        });
                    }
                    ids.push(self.tiles.insert(Tile::new(child.clone(), Some(parent))));
                    fresh.push(true);
                }
            }
        }
        self.tiles[parent].children = ids.clone();

        // A reused child moves only when its rank among the reused children
        // changed. The children that keep their rank form an increasing run
        // of old indices, so they are already in order relative to each other.
        let reused: Vec<usize> = (0..new.len()).filter(|&i| !fresh[i]).collect();
        let mut by_old = reused.clone();
        by_old.sort_by_key(|&i| matched[i]);
        let mut old_rank = vec![0; new.len()];
        for (rank, &i) in by_old.iter().enumerate() {
            old_rank[i] = rank;
        }
        let mut new_rank = vec![0; new.len()];
        for (rank, &i) in reused.iter().enumerate() {
            new_rank[i] = rank;
        }

        let outer = std::mem::take(&mut self.batch.mutations);
        let mut chunks = Vec::with_capacity(new.len());
        for (i, child) in new.iter().enumerate() {
            let id = ids[i];
            let place = Placement {
                parent: HostParent::Tile(parent),
                before: ids.get(i + 1).copied(),
            };
            if fresh[i] {
                self.mount_into(id)?;
                self.batch.mutations.push(Mutation::Create {
                    parent: place.parent,
                    tile: id,
                    before: place.before,
                });
            } else {
                self.update(id, child, place)?;
                if old_rank[i] != new_rank[i] {
                    self.batch.mutations.push(Mutation::Move {
                        tile: id,
                        before: place.before,
                    });
                }
            }
            chunks.push(std::mem::take(&mut self.batch.mutations));
        }

        self.batch.mutations = outer;
        self.batch.mutations.extend(removals);
        for chunk in chunks.into_iter().rev() {
            self.batch.mutations.extend(chunk);
        }
        Ok(())
    }

    /// Match new children to old ones by key, then unkeyed ones in order.
    fn match_keyed(&self, old_ids: &[TileId], new: &[Child]) -> Vec<Option<usize>> {
        let mut by_key: HashMap<&Key, usize> = HashMap::new();
        let mut unkeyed = VecDeque::new();
        for (index, &id) in old_ids.iter().enumerate() {
            match &self.tiles[id].key {
                Some(key) if by_key.contains_key(key) => {
                    tracing::warn!(target: "dominoz", %key, "duplicate key among siblings");
                }
                Some(key) => {
                    by_key.insert(key, index);
                }
                None => unkeyed.push_back(index),
            }
        }

        let mut seen = HashSet::new();
        new.iter()
            .map(|child| match child.key() {
                Some(key) => {
                    if !seen.insert(key) {
                        tracing::warn!(target: "dominoz", %key, "duplicate key among siblings");
                    }
                    by_key.remove(key)
                }
                None => unkeyed.pop_front(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::use_signal;
    use crate::tile::TileState;
    use crate::vnode::{create_element, Props};
    use pretty_assertions::assert_eq;

    struct Fixture {
        tiles: TileArena,
        document: Document,
        runtime: Weak<RuntimeInner>,
        container: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let document = Document::new();
            let container = document.body();
            Self {
                tiles: TileArena::default(),
                document,
                runtime: Weak::new(),
                container,
            }
        }

        fn render(&mut self, vnode: VNode) -> Batch {
            let mut cascade = Cascade::new(&mut self.tiles, &self.runtime, &self.document);
            cascade.render_root(self.container, vnode).unwrap();
            let batch = cascade.into_batch();
            // Stand in for Dispatch so later passes see mounted tiles.
            for id in self.all_tiles() {
                self.tiles[id].state = TileState::Mounted;
            }
            for mutation in &batch.mutations {
                if let Mutation::Remove { tile } = mutation {
                    for id in self.tiles.subtree_post_order(*tile) {
                        self.tiles.remove(id);
                    }
                }
            }
            batch
        }

        fn all_tiles(&self) -> Vec<TileId> {
            self.tiles
                .roots
                .values()
                .flat_map(|&root| self.tiles.subtree_post_order(root))
                .collect()
        }

        fn root_children(&self) -> Vec<TileId> {
            let root = self.tiles.roots[&self.container];
            self.tiles[root].children.clone()
        }
    }

    fn list(keys: &[i64]) -> VNode {
        let items: Vec<VNode> = keys
            .iter()
            .map(|&k| create_element("li", Props::new().with_key(k), k))
            .collect();
        create_element("ul", Props::new(), items)
    }

    fn plain(items: &[&str]) -> VNode {
        let items: Vec<VNode> = items
            .iter()
            .map(|&text| create_element("li", Props::new(), text))
            .collect();
        create_element("ul", Props::new(), items)
    }

    fn kinds(batch: &Batch) -> Vec<&'static str> {
        batch
            .mutations
            .iter()
            .map(|m| match m {
                Mutation::Create { .. } => "create",
                Mutation::Update { .. } => "update",
                Mutation::Remove { .. } => "remove",
                Mutation::Move { .. } => "move",
            })
            .collect()
    }

    #[test]
    fn first_render_is_a_single_create() {
        let mut fx = Fixture::new();
        let batch = fx.render(plain(&["a", "b"]));
        assert_eq!(kinds(&batch), vec!["create"]);
        assert_eq!(fx.tiles.len(), 5);
    }

    #[test]
    fn identical_render_is_idempotent() {
        let mut fx = Fixture::new();
        fx.render(list(&[1, 2, 3]));
        let batch = fx.render(list(&[1, 2, 3]));
        assert!(batch.mutations.is_empty());
    }

    #[test]
    fn keyed_rotation_moves_every_item() {
        let mut fx = Fixture::new();
        fx.render(list(&[1, 2, 3]));
        let before = fx.root_children();
        let batch = fx.render(list(&[3, 1, 2]));
        assert_eq!(kinds(&batch), vec!["move", "move", "move"]);
        assert_eq!(fx.root_children(), vec![before[2], before[0], before[1]]);
        // Applied right to left, each move targets a placed sibling.
        assert_eq!(
            batch.mutations,
            vec![
                Mutation::Move { tile: before[1], before: None },
                Mutation::Move { tile: before[0], before: Some(before[1]) },
                Mutation::Move { tile: before[2], before: Some(before[0]) },
            ]
        );
    }

    #[test]
    fn unkeyed_prepend_updates_then_creates() {
        let mut fx = Fixture::new();
        fx.render(plain(&["a", "b"]));
        let batch = fx.render(plain(&["c", "a", "b"]));
        let mut sorted = kinds(&batch);
        sorted.sort_unstable();
        assert_eq!(sorted, vec!["create", "update", "update"]);
        assert_eq!(kinds(&batch), vec!["create", "update", "update"]);
    }

    #[test]
    fn keyed_removal_and_insertion() {
        let mut fx = Fixture::new();
        fx.render(list(&[1, 2, 3]));
        let batch = fx.render(list(&[1, 3, 4]));
        assert_eq!(kinds(&batch), vec!["remove", "create"]);
    }

    #[test]
    fn keyed_head_removal_keeps_survivors_in_place() {
        let mut fx = Fixture::new();
        fx.render(list(&[1, 2, 3]));
        let before = fx.root_children();
        let batch = fx.render(list(&[2, 3]));
        assert_eq!(kinds(&batch), vec!["remove"]);
        assert_eq!(fx.root_children(), vec![before[1], before[2]]);
    }

    #[test]
    fn keyed_head_insertion_only_creates() {
        let mut fx = Fixture::new();
        fx.render(list(&[2, 3]));
        let before = fx.root_children();
        let batch = fx.render(list(&[0, 2, 3]));
        assert_eq!(kinds(&batch), vec!["create"]);
        let after = fx.root_children();
        assert_eq!(&after[1..], &before[..]);
        assert_eq!(
            batch.mutations,
            vec![Mutation::Create {
                parent: HostParent::Tile(fx.tiles.roots[&fx.container]),
                tile: after[0],
                before: Some(before[0]),
            }]
        );
    }

    #[test]
    fn keyed_swap_with_removal_moves_only_reordered_items() {
        let mut fx = Fixture::new();
        fx.render(list(&[1, 2, 3, 4]));
        let batch = fx.render(list(&[3, 2, 4]));
        assert_eq!(kinds(&batch), vec!["remove", "move", "move"]);
    }

    #[test]
    fn type_change_replaces() {
        let mut fx = Fixture::new();
        fx.render(create_element("div", Props::new(), "x"));
        let batch = fx.render(create_element("span", Props::new(), "x"));
        assert_eq!(kinds(&batch), vec!["remove", "create"]);
    }

    #[test]
    fn prop_changes_become_one_update() {
        let mut fx = Fixture::new();
        fx.render(create_element("div", Props::new().with("class", "a").with("id", "x"), ()));
        let batch = fx.render(create_element("div", Props::new().with("class", "b"), ()));
        let root = fx.tiles.roots[&fx.container];
        assert_eq!(
            batch.mutations,
            vec![Mutation::Update {
                tile: root,
                patch: Patch::Props(vec![
                    PropChange { name: "class".into(), value: Some("b".into()) },
                    PropChange { name: "id".into(), value: None },
                ]),
            }]
        );
    }

    fn counter(cx: &mut Scope<'_>, props: &Props) -> VNode {
        let start = props.get("start").and_then(|v| v.as_int()).unwrap_or(0);
        let (count, _) = use_signal(cx, start);
        create_element("p", Props::new(), ("Count: ", count))
    }

    fn pair(_cx: &mut Scope<'_>, _props: &Props) -> VNode {
        let counter = Component::new("Counter", counter);
        create_element(
            "div",
            Props::new(),
            (
                create_element(counter, Props::new().with("start", 1), ()),
                create_element(counter, Props::new().with("start", 2), ()),
            ),
        )
    }

    #[test]
    fn components_render_parent_first_in_order() {
        let mut fx = Fixture::new();
        let batch = fx.render(create_element(Component::new("Pair", pair), Props::new(), ()));
        let names: Vec<_> = batch.visited.iter().map(|&id| fx.tiles[id].name()).collect();
        assert_eq!(names, vec!["Pair", "Counter", "Counter"]);
    }

    #[test]
    fn component_state_survives_rerender() {
        let mut fx = Fixture::new();
        let app = || create_element(Component::new("Pair", pair), Props::new(), ());
        fx.render(app());
        let batch = fx.render(app());
        assert!(batch.mutations.is_empty());
        assert_eq!(batch.visited.len(), 3);
    }
}
