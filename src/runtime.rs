//! Runtime: owns the tile arena and drives render cycles.
//!
//! A cycle runs Cascade (diff and component renders), then Dispatch (DOM
//! mutations and refs), then flushes the effects queued by the components
//! that rendered. `render` and every state change run a full cycle before
//! returning.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::cascade::{Cascade, Mutation};
use crate::config::RuntimeConfig;
use crate::dispatch::Dispatch;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::tile::{TileArena, TileId, TileState};
use crate::vnode::VNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Rendering,
    Committing,
    Flushing,
}

impl Phase {
    /// Whether the tile arena may be diffed or mutated right now.
    fn is_busy(self) -> bool {
        matches!(self, Self::Rendering | Self::Committing)
    }
}

enum Work {
    Render { container: NodeId, vnode: VNode },
    Unmount { container: NodeId },
    Tile(TileId),
}

// ---------------------------------------------------------------------------
// RuntimeInner
// ---------------------------------------------------------------------------

pub(crate) struct RuntimeInner {
    config: RuntimeConfig,
    document: Document,
    tiles: RefCell<TileArena>,
    phase: Cell<Phase>,
    /// Nesting of cycles started from effects.
    depth: Cell<usize>,
    journal: RefCell<Vec<Mutation>>,
    weak_self: Weak<RuntimeInner>,
}

/// Restores phase and depth when a cycle ends, including by panic. A panic
/// while rendering poisons the container like an aborted pass.
struct PhaseGuard<'a> {
    inner: &'a RuntimeInner,
    phase: Phase,
    depth: usize,
    container: Option<NodeId>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() && self.inner.phase.get() == Phase::Rendering {
            if let Ok(mut tiles) = self.inner.tiles.try_borrow_mut() {
                tiles.discard_pending();
                if let Some(container) = self.container {
                    tiles.poisoned.insert(container);
                }
            }
        }
        self.inner.phase.set(self.phase);
        self.inner.depth.set(self.depth);
    }
}

impl RuntimeInner {
    /// Fail unless a new cycle may start now.
    fn check_ready(&self) -> Result<()> {
        if self.phase.get().is_busy() {
            return Err(Error::RenderInProgress);
        }
        if self.depth.get() >= self.config.max_update_depth {
            tracing::warn!(target: "dominoz", limit = self.config.max_update_depth, "update depth exceeded");
            return Err(Error::UpdateDepthExceeded {
                limit: self.config.max_update_depth,
            });
        }
        Ok(())
    }

    fn cycle(&self, work: Work) -> Result<()> {
        self.check_ready()?;
        let depth = self.depth.get();

        let container = match &work {
            Work::Render { container, .. } | Work::Unmount { container } => Some(*container),
            Work::Tile(id) => self.tiles.borrow().root_container(*id),
        };
        let _span = tracing::debug_span!(target: "dominoz", "cycle", depth, ?container).entered();
        let _guard = PhaseGuard {
            inner: self,
            phase: self.phase.get(),
            depth,
            container,
        };

        if let (Some(container), false) = (container, matches!(work, Work::Tile(_))) {
            let poisoned = self.tiles.borrow_mut().poisoned.remove(&container);
            if poisoned {
                self.phase.set(Phase::Committing);
                let purged = Dispatch::new(&self.tiles, &self.document, &self.config).purge(container);
                tracing::debug!(target: "dominoz", purged, "remounting after an aborted pass");
            }
        }

        self.phase.set(Phase::Rendering);
        let batch = {
            let mut tiles = self.tiles.borrow_mut();
            let mut cascade = Cascade::new(&mut tiles, &self.weak_self, &self.document);
            let outcome = match work {
                Work::Render { container, vnode } => cascade.render_root(container, vnode),
                Work::Unmount { container } => cascade.unmount_root(container),
                Work::Tile(id) => cascade.rerender(id),
            };
            match outcome {
                Ok(()) => cascade.into_batch(),
                Err(err) => {
                    let discarded = tiles.discard_pending();
                    if let Some(container) = container {
                        tiles.poisoned.insert(container);
                    }
                    tracing::warn!(target: "dominoz", %err, discarded, "render pass aborted");
                    return Err(err);
                }
            }
        };

        self.phase.set(Phase::Committing);
        Dispatch::new(&self.tiles, &self.document, &self.config).apply(&batch)?;
        if self.config.journal {
            self.journal
                .borrow_mut()
                .extend(batch.mutations.iter().cloned());
        }

        self.phase.set(Phase::Flushing);
        self.depth.set(depth + 1);
        let effects = self.flush_effects(&batch.visited);
        tracing::debug!(
            target: "dominoz",
            mutations = batch.mutations.len(),
            rendered = batch.visited.len(),
            effects,
            tiles = self.tiles.try_borrow().map_or(0, |tiles| tiles.len()),
            "cycle committed"
        );
        Ok(())
    }

    /// Run the effects queued by `visited`, in visit order. Returns how many
    /// effects ran.
    fn flush_effects(&self, visited: &[TileId]) -> usize {
        let mut queue = Vec::new();
        {
            let mut tiles = self.tiles.borrow_mut();
            for &id in visited {
                if let Some(tile) = tiles.get_mut(id) {
                    queue.extend(tile.pending_effects.drain(..).map(|effect| (id, effect)));
                }
            }
        }

        let mut ran = 0;
        for (id, effect) in queue {
            // A cycle started by an earlier effect may have unmounted the tile.
            let previous = {
                let mut tiles = self.tiles.borrow_mut();
                match tiles.get_mut(id) {
                    Some(tile) if tile.state == TileState::Mounted => {
                        tile.hooks.take_cleanup(effect.slot)
                    }
                    _ => continue,
                }
            };
            if let Some(cleanup) = previous {
                cleanup();
            }

            let cleanup = (effect.run)();
            ran += 1;

            if let Some(cleanup) = cleanup {
                let leftover = {
                    let mut tiles = self.tiles.borrow_mut();
                    match tiles.get_mut(id) {
                        Some(tile) if tile.state == TileState::Mounted => {
                            tile.hooks.store_cleanup(effect.slot, cleanup)
                        }
                        _ => Some(cleanup),
                    }
                };
                if let Some(cleanup) = leftover {
                    cleanup();
                }
            }
        }
        ran
    }

    /// Replace a signal value with `f(current)` and re-render its component
    /// when the value changed.
    pub(crate) fn write_signal<T>(&self, tile: TileId, slot: usize, f: impl FnOnce(&T) -> T) -> Result<()>
    where
        T: Clone + PartialEq + 'static,
    {
        self.check_ready()?;

        let current = {
            let tiles = self.tiles.borrow();
            if tiles
                .root_container(tile)
                .is_some_and(|container| tiles.poisoned.contains(&container))
            {
                tracing::warn!(target: "dominoz", "ignoring update to a tree awaiting remount");
                return Ok(());
            }
            let Some(state) = tiles.get(tile).filter(|t| t.state == TileState::Mounted) else {
                tracing::debug!(target: "dominoz", "ignoring update to an unmounted component");
                return Ok(());
            };
            match state.hooks.signal::<T>(slot) {
                Some(value) => value.clone(),
                None => {
                    return Err(Error::HookOrderViolation {
                        component: state.name(),
                        slot,
                        reason: "setter does not match the slot's type",
                    })
                }
            }
        };

        let next = f(&current);
        if next == current {
            return Ok(());
        }

        {
            let mut tiles = self.tiles.borrow_mut();
            match tiles.get_mut(tile).and_then(|t| t.hooks.signal_mut::<T>(slot)) {
                Some(value) => *value = next,
                None => return Ok(()),
            }
        }
        self.cycle(Work::Tile(tile))
    }

    /// Current signal value, if the tile is mounted and not rendering.
    pub(crate) fn read_signal<T: Clone + 'static>(&self, tile: TileId, slot: usize) -> Option<T> {
        let tiles = self.tiles.try_borrow().ok()?;
        let state = tiles.get(tile).filter(|t| t.state == TileState::Mounted)?;
        state.hooks.signal::<T>(slot).cloned()
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Renders VNode trees into containers of a [`Document`].
///
/// Cloning yields another handle to the same runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    /// Create a runtime with the default config.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, RuntimeConfig::default())
    }

    pub fn with_config(document: Document, config: RuntimeConfig) -> Self {
        let inner = Rc::new_cyclic(|weak_self| RuntimeInner {
            config,
            document,
            tiles: RefCell::new(TileArena::default()),
            phase: Cell::new(Phase::Idle),
            depth: Cell::new(0),
            journal: RefCell::new(Vec::new()),
            weak_self: weak_self.clone(),
        });
        Self { inner }
    }

    /// Render `vnode` into `container`, reusing whatever was rendered there
    /// before. Runs diff, commit and effects before returning.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidContainer`] if `container` is not an element attached
    ///   to the document.
    /// - [`Error::RenderInProgress`] if called from a component or cleanup.
    /// - [`Error::HookOrderViolation`] if a component changed its hook calls;
    ///   nothing is committed and the next render starts from scratch.
    pub fn render(&self, vnode: VNode, container: NodeId) -> Result<()> {
        let document = &self.inner.document;
        if !document.is_element(container) || !document.is_connected(container) {
            return Err(Error::InvalidContainer(container));
        }
        self.inner.cycle(Work::Render { container, vnode })
    }

    /// Tear down the tree rendered into `container`: cleanups run and its
    /// nodes leave the document. Returns whether anything was rendered there.
    pub fn unmount(&self, container: NodeId) -> Result<bool> {
        self.inner.check_ready()?;
        let existed = {
            let tiles = self.inner.tiles.borrow();
            tiles.roots.contains_key(&container) || tiles.poisoned.contains(&container)
        };
        self.inner.cycle(Work::Unmount { container })?;
        Ok(existed)
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Drain the committed mutations recorded while the journal is enabled.
    pub fn take_journal(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.inner.journal.borrow_mut())
    }

    /// Number of mounted tiles across all containers.
    pub fn mounted_tiles(&self) -> usize {
        self.inner
            .tiles
            .try_borrow()
            .map_or(0, |tiles| tiles.count_mounted())
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("phase", &self.inner.phase.get())
            .field("mounted_tiles", &self.mounted_tiles())
            .field("config", &self.inner.config)
            .finish()
    }
}
