//! Props: the shallow name/value mapping attached to a VNode.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::config::DEFAULT_EVENT_PREFIX;
use crate::dom::{Event, Handler};
use crate::error::Result;
use crate::hooks::NodeRef;

use super::element::Key;

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// A single prop value.
///
/// Scalars compare by value; handlers, refs and opaque values compare by
/// reference.
#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Handler(Handler),
    Ref(NodeRef),
    Any(Rc<dyn Any>),
}

impl PropValue {
    /// Wrap an arbitrary value, e.g. a callback passed to a child component.
    pub fn any<T: 'static>(value: T) -> Self {
        Self::Any(Rc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The attribute string this value renders to, or `None` when the
    /// attribute should be absent.
    ///
    /// `true` renders as a bare attribute; `false` and `Null` remove it.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(true) => Some(String::new()),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            // Bitwise, so NaN equals itself and an unchanged prop never diffs.
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            (Self::Ref(a), Self::Ref(b)) => a.ptr_eq(b),
            (Self::Any(a), Self::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Handler(h) => h.fmt(f),
            Self::Ref(r) => r.fmt(f),
            Self::Any(_) => f.write_str("Any(..)"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// Values beyond the `i64` range saturate at `i64::MAX`.
macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

impl From<NodeRef> for PropValue {
    fn from(value: NodeRef) -> Self {
        Self::Ref(value)
    }
}

impl From<Key> for PropValue {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(n) => Self::Int(n),
            Key::Str(s) => Self::Str(s),
        }
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// A change between two prop sets. `value: None` means the prop was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PropChange {
    pub name: String,
    pub value: Option<PropValue>,
}

/// Shallow mapping from prop names to values, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prop (builder).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set the reconciliation key (builder).
    pub fn with_key(self, key: impl Into<Key>) -> Self {
        self.with("key", key.into())
    }

    /// Attach a node ref (builder).
    pub fn with_ref(self, node_ref: &NodeRef) -> Self {
        self.with("ref", node_ref.clone())
    }

    /// Install a listener for `event` under the default `on` prefix (builder).
    pub fn on(self, event: &str, f: impl Fn(&Event) -> Result<()> + 'static) -> Self {
        self.with(format!("{DEFAULT_EVENT_PREFIX}{event}"), Handler::new(f))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names whose values differ between `self` and `next`, in name order.
    pub fn diff(&self, next: &Props) -> Vec<PropChange> {
        let mut changes = Vec::new();
        for (name, old) in &self.entries {
            match next.entries.get(name) {
                Some(new) if new == old => {}
                new => changes.push(PropChange {
                    name: name.clone(),
                    value: new.cloned(),
                }),
            }
        }
        for (name, new) in &next.entries {
            if !self.entries.contains_key(name) {
                changes.push(PropChange {
                    name: name.clone(),
                    value: Some(new.clone()),
                });
            }
        }
        changes.sort_by(|a, b| a.name.cmp(&b.name));
        changes
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (name, value) in iter {
            props.insert(name, value);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attribute_rendering() {
        assert_eq!(PropValue::from("a").to_attribute().as_deref(), Some("a"));
        assert_eq!(PropValue::from(3).to_attribute().as_deref(), Some("3"));
        assert_eq!(PropValue::from(1.5).to_attribute().as_deref(), Some("1.5"));
        assert_eq!(PropValue::from(true).to_attribute().as_deref(), Some(""));
        assert_eq!(PropValue::from(false).to_attribute(), None);
        assert_eq!(PropValue::Null.to_attribute(), None);
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(PropValue::from(f64::NAN), PropValue::from(f64::NAN));
        assert_ne!(PropValue::from(0.0), PropValue::from(-0.0));
        let props = Props::new().with("x", f64::NAN);
        assert!(props.diff(&props.clone()).is_empty());
    }

    #[test]
    fn wide_integers_saturate() {
        assert_eq!(PropValue::from(usize::MAX), PropValue::Int(i64::MAX));
        assert_eq!(PropValue::from(u64::MAX), PropValue::Int(i64::MAX));
        assert_eq!(PropValue::from(-5_isize), PropValue::Int(-5));
        assert_eq!(PropValue::from(u32::MAX), PropValue::Int(i64::from(u32::MAX)));
    }

    #[test]
    fn option_converts_to_null() {
        assert!(PropValue::from(None::<&str>).is_null());
        assert_eq!(PropValue::from(Some(2)), PropValue::Int(2));
    }

    #[test]
    fn handlers_compare_by_reference() {
        let handler = Handler::new(|_| Ok(()));
        let a = PropValue::from(handler.clone());
        assert_eq!(a, PropValue::Handler(handler));
        assert_ne!(a, PropValue::Handler(Handler::new(|_| Ok(()))));
    }

    #[test]
    fn any_values_downcast() {
        let value = PropValue::any(vec![1, 2]);
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
        assert!(value.downcast_ref::<String>().is_none());
        assert_eq!(value, value.clone());
    }

    #[test]
    fn diff_reports_changed_added_and_removed() {
        let old = Props::new()
            .with("class", "a")
            .with("id", "x")
            .with("title", "same");
        let new = Props::new()
            .with("class", "b")
            .with("title", "same")
            .with("value", 4);
        assert_eq!(
            old.diff(&new),
            vec![
                PropChange { name: "class".into(), value: Some(PropValue::from("b")) },
                PropChange { name: "id".into(), value: None },
                PropChange { name: "value".into(), value: Some(PropValue::Int(4)) },
            ]
        );
        assert!(new.diff(&new.clone()).is_empty());
    }

    #[test]
    fn on_uses_the_default_prefix() {
        let props = Props::new().on("click", |_| Ok(()));
        assert!(props.get("onclick").and_then(PropValue::as_handler).is_some());
    }

    #[test]
    fn collect_from_pairs() {
        let props: Props = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("b").and_then(PropValue::as_int), Some(2));
    }
}
