//! # dominoz
//!
//! A minimal, synchronous virtual-DOM runtime with hook-based components.
//!
//! Describe UI with [`create_element`], mount it with [`Runtime::render`], and
//! keep per-component state with hooks. Every render and every state update
//! runs diff, commit and effect flush to completion before returning.
//!
//! ## Core Systems
//!
//! - **[`vnode`]**: immutable VNodes, props, keys and child flattening
//! - **[`hooks`]**: `use_signal`, `use_after`, `use_anchor` and the render [`Scope`]
//! - **[`tile`]**: persistent render contexts, one per mounted host element or component
//! - **[`cascade`]**: the diff engine producing ordered [`Mutation`]s
//! - **[`runtime`]**: the render cycle, state updates and effect flushing
//! - **[`dom`]**: slotmap-backed in-memory document with events, selectors and HTML
//! - **[`testing`]**: a headless [`Harness`](testing::Harness) and snapshot helpers
//!
//! ## Example
//!
//! ```
//! use dominoz::testing::Harness;
//! use dominoz::{create_element, use_signal, Component, Props, Scope, VNode};
//!
//! fn counter(cx: &mut Scope<'_>, _props: &Props) -> VNode {
//!     let (count, set_count) = use_signal(cx, 0);
//!     create_element(
//!         "button",
//!         Props::new().on("click", move |_| set_count.set(count + 1)),
//!         count,
//!     )
//! }
//!
//! let harness = Harness::new();
//! let counter = Component::new("Counter", counter);
//! harness.mount(create_element(counter, Props::new(), ())).unwrap();
//! harness.click("button").unwrap();
//! assert_eq!(harness.html(), "<button>1</button>");
//! ```

// Foundation
pub mod config;
pub mod dom;
pub mod error;

// Description and state
pub mod hooks;
pub mod vnode;

// Reconciliation
pub mod cascade;
pub(crate) mod dispatch;
pub mod runtime;
pub mod tile;

// Test support
pub mod testing;

pub use cascade::{Mutation, Patch};
pub use config::RuntimeConfig;
pub use dom::{Document, Event, Handler, NodeId};
pub use error::{Error, Result};
pub use hooks::{
    use_after, use_after_with, use_anchor, use_node_ref, use_signal, use_signal_with, Anchor,
    NodeRef, Scope, Setter, Teardown,
};
pub use runtime::Runtime;
pub use tile::{HostParent, TileId, TileState};
pub use vnode::{
    create_element, Child, Component, ElementType, IntoChildren, Key, PropValue, Props, VNode,
};
