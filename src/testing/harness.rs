//! Harness for driving a runtime in tests.
//!
//! A [`Harness`] owns a fresh [`Document`] with a `<div id="root">` container
//! in its body, a [`Runtime`] with the mutation journal enabled, and helpers to
//! fire events at nodes found by selector.

use crate::cascade::Mutation;
use crate::config::RuntimeConfig;
use crate::dom::{Document, Event, NodeId};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::vnode::VNode;

/// A runtime bound to a single root container.
///
/// # Examples
///
/// ```
/// use dominoz::testing::Harness;
/// use dominoz::{create_element, Props};
///
/// let harness = Harness::new();
/// harness.mount(create_element("p", Props::new(), "hi")).unwrap();
/// assert_eq!(harness.html(), "<p>hi</p>");
/// ```
pub struct Harness {
    runtime: Runtime,
    root: NodeId,
}

impl Harness {
    /// Create a harness with the journal enabled.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::new().with_journal(true))
    }

    /// Create a harness with a custom config.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let document = Document::new();
        let root = document.create_element("div");
        document
            .set_attribute(root, "id", "root")
            .expect("fresh element accepts attributes");
        document
            .append_child(document.body(), root)
            .expect("body accepts the root container");
        Self {
            runtime: Runtime::with_config(document, config),
            root,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Render `vnode` into the root container.
    pub fn mount(&self, vnode: VNode) -> Result<()> {
        self.runtime.render(vnode, self.root)
    }

    /// Unmount whatever is rendered into the root container.
    pub fn unmount(&self) -> Result<bool> {
        self.runtime.unmount(self.root)
    }

    /// Serialized children of the root container.
    pub fn html(&self) -> String {
        self.document().inner_html(self.root)
    }

    /// Drain the mutations committed since the last call.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        self.runtime.take_journal()
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// First node under the body matching `selector`.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.document().query_selector(selector)
    }

    /// Text content of the first node matching `selector`.
    pub fn text(&self, selector: &str) -> Option<String> {
        self.query(selector)
            .map(|node| self.document().text_content(node))
    }

    // ── Event simulation ─────────────────────────────────────────────────

    /// Dispatch a `click` at the first match of `selector`.
    ///
    /// Returns `Ok(false)` when nothing matches or no listener ran.
    pub fn click(&self, selector: &str) -> Result<bool> {
        self.fire(selector, Event::new("click"))
    }

    /// Set the `value` attribute of the first match of `selector`, then
    /// dispatch an `input` event carrying the value.
    pub fn input(&self, selector: &str, value: &str) -> Result<bool> {
        let Some(node) = self.query(selector) else {
            return Ok(false);
        };
        self.document().set_attribute(node, "value", value)?;
        self.document()
            .dispatch_event(node, Event::new("input").with_value(value))
    }

    /// Dispatch an arbitrary event at the first match of `selector`.
    pub fn fire(&self, selector: &str, event: Event) -> Result<bool> {
        match self.query(selector) {
            Some(node) => self.document().dispatch_event(node, event),
            None => Ok(false),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn document(&self) -> &Document {
        self.runtime.document()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::{create_element, Props};
    use pretty_assertions::assert_eq;

    #[test]
    fn root_container_is_in_the_body() {
        let harness = Harness::new();
        assert_eq!(harness.query("#root"), Some(harness.root()));
        assert_eq!(harness.html(), "");
    }

    #[test]
    fn missing_targets_report_false() {
        let harness = Harness::new();
        harness
            .mount(create_element("p", Props::new(), "x"))
            .unwrap();
        assert!(!harness.click("button").unwrap());
        assert!(!harness.input("input", "v").unwrap());
        assert_eq!(harness.text("p").as_deref(), Some("x"));
    }
}
