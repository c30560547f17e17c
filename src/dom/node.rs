//! Node types: NodeId, NodeData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use super::event::Handler;

new_key_type! {
    /// Unique identifier for a document node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Payload of an element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name, e.g. `"div"`.
    pub tag: String,
    /// Attributes in name order.
    pub attributes: BTreeMap<String, String>,
    /// Event listeners keyed by event name (`"click"`, not `"onclick"`).
    pub listeners: BTreeMap<String, Handler>,
}

/// Data associated with a single document node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

impl NodeData {
    /// Create an element node with no attributes or listeners.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(ElementData {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            listeners: BTreeMap::new(),
        })
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            el.attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.tag),
            Self::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Attribute value, if this is an element carrying it.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element()
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Check whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}
