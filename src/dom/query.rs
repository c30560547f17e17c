//! DOM queries: simple compound selectors (`tag`, `#id`, `.class`, `tag#id.a.b`).

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a compound selector. Unsupported syntax simply fails to match.
    pub fn parse(input: &str) -> Self {
        let mut selector = Self::default();
        let input = input.trim();
        let tag_end = input.find(['#', '.']).unwrap_or(input.len());
        if tag_end > 0 {
            selector.tag = Some(input[..tag_end].to_ascii_lowercase());
        }

        let mut rest = &input[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = body[..end].to_owned();
            match marker {
                '#' => selector.id = Some(name),
                _ => selector.classes.push(name),
            }
            rest = &body[end..];
        }
        selector
    }

    /// Whether a node satisfies every part of the selector.
    pub fn matches(&self, data: &NodeData) -> bool {
        let Some(tag) = data.tag() else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|want| want != tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|want| data.id() != Some(want)) {
            return false;
        }
        self.classes.iter().all(|class| data.has_class(class))
    }
}

impl Dom {
    /// First descendant of `root` (inclusive) matching `selector`, in document order.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector);
        self.walk_depth_first(root)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|data| selector.matches(data)))
    }

    /// All descendants of `root` (inclusive) matching `selector`, in document order.
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|data| selector.matches(data)))
            .collect()
    }

    /// Find all nodes under `root` matching an arbitrary predicate.
    pub fn query_all(&self, root: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&predicate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;

    /// ```text
    /// body
    ///  └ div#app.shell
    ///     ├ button#save.btn.primary
    ///     ├ button#cancel.btn
    ///     └ "label"
    /// ```
    fn build_query_tree() -> Dom {
        let mut dom = Dom::new();
        let body = dom.body();
        let app = dom.create(
            NodeData::element("div")
                .with_attribute("id", "app")
                .with_attribute("class", "shell"),
        );
        let save = dom.create(
            NodeData::element("button")
                .with_attribute("id", "save")
                .with_attribute("class", "btn primary"),
        );
        let cancel = dom.create(
            NodeData::element("button")
                .with_attribute("id", "cancel")
                .with_attribute("class", "btn"),
        );
        let label = dom.create(NodeData::text("label"));
        dom.append_child(body, app).unwrap();
        dom.append_child(app, save).unwrap();
        dom.append_child(app, cancel).unwrap();
        dom.append_child(app, label).unwrap();
        dom
    }

    #[test]
    fn parse_compound() {
        let sel = Selector::parse("button#save.btn.primary");
        assert_eq!(sel.tag.as_deref(), Some("button"));
        assert_eq!(sel.id.as_deref(), Some("save"));
        assert_eq!(sel.classes, vec!["btn", "primary"]);
    }

    #[test]
    fn query_by_id() {
        let dom = build_query_tree();
        let found = dom.query_selector(dom.body(), "#cancel").unwrap();
        assert_eq!(dom.get(found).unwrap().id(), Some("cancel"));
    }

    #[test]
    fn query_by_tag_returns_first_in_document_order() {
        let dom = build_query_tree();
        let found = dom.query_selector(dom.body(), "button").unwrap();
        assert_eq!(dom.get(found).unwrap().id(), Some("save"));
    }

    #[test]
    fn query_by_class_all() {
        let dom = build_query_tree();
        assert_eq!(dom.query_selector_all(dom.body(), ".btn").len(), 2);
        assert_eq!(dom.query_selector_all(dom.body(), ".btn.primary").len(), 1);
    }

    #[test]
    fn query_not_found() {
        let dom = build_query_tree();
        assert!(dom.query_selector(dom.body(), "#missing").is_none());
        assert!(dom.query_selector(dom.body(), "span").is_none());
    }

    #[test]
    fn text_nodes_never_match() {
        let dom = build_query_tree();
        let texts = dom.query_all(dom.body(), |data| data.tag().is_none());
        assert_eq!(texts.len(), 1);
        assert!(dom.query_selector_all(dom.body(), "").len() >= 4);
    }
}
