//! Virtual nodes: immutable descriptions of the desired UI.

pub mod children;
pub mod element;
pub mod props;

pub use children::IntoChildren;
pub use element::{create_element, Child, Component, ElementType, Key, RenderFn, VNode};
pub use props::{PropChange, PropValue, Props};
