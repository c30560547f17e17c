//! VNode, element types, keys, and `create_element`.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::hooks::{NodeRef, Scope};

use super::children::IntoChildren;
use super::props::{PropValue, Props};

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Signature of a component render function.
pub type RenderFn = fn(&mut Scope<'_>, &Props) -> VNode;

/// A named component function.
///
/// Two components are the same type when they share a name and render
/// function, which is what decides whether a tile is reused or replaced.
#[derive(Clone, Copy)]
pub struct Component {
    name: &'static str,
    render: RenderFn,
}

impl Component {
    pub const fn new(name: &'static str, render: RenderFn) -> Self {
        Self { name, render }
    }

    /// Label used in diagnostics and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, cx: &mut Scope<'_>, props: &Props) -> VNode {
        (self.render)(cx, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.render as usize == other.render as usize
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// ElementType / Key / Child
// ---------------------------------------------------------------------------

/// What a VNode describes: a host element tag or a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Host(Cow<'static, str>),
    Component(Component),
}

impl ElementType {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Host(tag) => Some(tag),
            Self::Component(_) => None,
        }
    }

    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Component(component) => Some(component),
            Self::Host(_) => None,
        }
    }
}

impl From<&'static str> for ElementType {
    fn from(tag: &'static str) -> Self {
        Self::Host(Cow::Borrowed(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        Self::Host(Cow::Owned(tag))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

/// Reconciliation key identifying a child among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

// Saturating, matching `PropValue`.
macro_rules! impl_key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_key_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A flattened child: an element or a text node.
#[derive(Debug, Clone)]
pub enum Child {
    Element(VNode),
    Text(String),
}

impl Child {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Element(vnode) => vnode.key(),
            Self::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&VNode> {
        match self {
            Self::Element(vnode) => Some(vnode),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }
}

impl From<VNode> for Child {
    fn from(vnode: VNode) -> Self {
        Self::Element(vnode)
    }
}

// ---------------------------------------------------------------------------
// VNode
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct VNodeData {
    ty: ElementType,
    props: Props,
    children: Vec<Child>,
    key: Option<Key>,
    node_ref: Option<NodeRef>,
}

/// Immutable description of a piece of UI. Cloning shares the description.
#[derive(Debug, Clone)]
pub struct VNode {
    inner: Rc<VNodeData>,
}

impl VNode {
    pub fn ty(&self) -> &ElementType {
        &self.inner.ty
    }

    /// Props without the extracted `key` and `ref` entries.
    pub fn props(&self) -> &Props {
        &self.inner.props
    }

    /// Flattened children.
    pub fn children(&self) -> &[Child] {
        &self.inner.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.inner.key.as_ref()
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.inner.node_ref.as_ref()
    }

    /// Whether both handles share the same description.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Build a VNode.
///
/// Children are flattened; `None`, `()` and booleans are dropped, strings and
/// numbers become text. A `key` prop (string or integer) becomes the node's
/// key and a `ref` prop holding a [`NodeRef`] is bound to the realized host
/// node; neither is rendered as an attribute. Unsupported `key` or `ref`
/// values are dropped with a warning.
///
/// ```
/// use dominoz::{create_element, Props};
///
/// let list = create_element(
///     "ul",
///     Props::new().with("class", "todo"),
///     vec![
///         create_element("li", Props::new().with_key(1), "milk"),
///         create_element("li", Props::new().with_key(2), "eggs"),
///     ],
/// );
/// assert_eq!(list.children().len(), 2);
/// ```
pub fn create_element(
    ty: impl Into<ElementType>,
    mut props: Props,
    children: impl IntoChildren,
) -> VNode {
    let ty = ty.into();

    let key = match props.remove("key") {
        Some(PropValue::Int(n)) => Some(Key::Int(n)),
        Some(PropValue::Str(s)) => Some(Key::Str(s)),
        Some(PropValue::Null) | None => None,
        Some(other) => {
            tracing::warn!(target: "dominoz", value = ?other, "dropping unsupported key");
            None
        }
    };

    let node_ref = match props.remove("ref") {
        Some(PropValue::Ref(node_ref)) if ty.tag().is_some() => Some(node_ref),
        Some(PropValue::Null) | None => None,
        Some(other) => {
            tracing::warn!(target: "dominoz", value = ?other, ?ty, "dropping unsupported ref");
            None
        }
    };

    let mut flat = Vec::new();
    children.into_children(&mut flat);

    VNode {
        inner: Rc::new(VNodeData {
            ty,
            props,
            children: flat,
            key,
            node_ref,
        }),
    }
}
