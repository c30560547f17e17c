//! In-memory document: slotmap-backed node arena, events, queries, serialization.

pub mod document;
pub mod event;
pub mod html;
pub mod node;
pub mod query;
pub mod tree;

pub use document::Document;
pub use event::{Event, Handler};
pub use node::{ElementData, NodeData, NodeId};
pub use query::Selector;
pub use tree::Dom;
