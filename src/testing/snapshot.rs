//! Snapshot rendering helpers.

use crate::dom::Document;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::vnode::VNode;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render `vnode` into the body of a fresh document and return the HTML of
/// the body's children once all effects have run.
///
/// # Examples
///
/// ```
/// use dominoz::testing::render_to_string;
/// use dominoz::{create_element, Props};
///
/// let html = render_to_string(create_element("b", Props::new(), "bold")).unwrap();
/// assert_eq!(html, "<b>bold</b>");
/// ```
pub fn render_to_string(vnode: VNode) -> Result<String> {
    let document = Document::new();
    let body = document.body();
    let runtime = Runtime::new(document);
    runtime.render(vnode, body)?;
    Ok(runtime.document().inner_html(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::{create_element, Props};

    #[test]
    fn nested_elements() {
        let vnode = create_element(
            "ul",
            Props::new().with("class", "list"),
            (
                create_element("li", Props::new(), "a"),
                create_element("li", Props::new(), 2),
            ),
        );
        insta::assert_snapshot!(
            render_to_string(vnode).unwrap(),
            @r#"<ul class="list"><li>a</li><li>2</li></ul>"#
        );
    }
}
