//! DOM Module - What the core needs from the page, as traits.
//!
//! - [`Document`] - read side: queries, tree shape, layout geometry
//! - [`Presentation`] - write side: classes, inline styles, attributes, text
//! - [`MemoryDocument`] - in-memory implementation of both
//! - [`Selector`] - the selector subset queries understand
//!
//! Lookups return `Option`/`bool` instead of failing: an element that is no
//! longer in the document is "not found", and mutations on it are no-ops.
//! Coordinates are page coordinates (scroll offset already applied).

mod memory;
mod selector;

pub use memory::MemoryDocument;
pub use selector::{Selector, SelectorError};

use crate::types::{ElementId, Rect};

// =============================================================================
// READ SIDE
// =============================================================================

pub trait Document {
    /// Root of the element tree.
    fn body(&self) -> ElementId;

    /// Lowercase tag name, `None` if the handle does not resolve.
    fn tag_name(&self, el: ElementId) -> Option<String>;

    /// Attribute value. `id` and `class` are exposed as attributes too.
    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Children in document order.
    fn children(&self, el: ElementId) -> Vec<ElementId>;

    /// Whether the element is attached to this document's tree.
    fn contains(&self, el: ElementId) -> bool;

    /// Layout box in page coordinates. `None` when detached.
    fn bounding_rect(&self, el: ElementId) -> Option<Rect>;

    /// All descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }

    /// Every element matching `selector`, in document order.
    ///
    /// An invalid selector matches nothing.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let body = self.body();
        let mut scope = vec![body];
        scope.extend(self.descendants(body));
        filter_matching(self, scope, selector)
    }

    /// Descendants of `root` matching `selector`, in document order.
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let scope = self.descendants(root);
        filter_matching(self, scope, selector)
    }

    /// First match of `selector`, if any.
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.query_selector_all(selector).into_iter().next()
    }
}

fn filter_matching<D: Document + ?Sized>(
    doc: &D,
    scope: Vec<ElementId>,
    selector: &str,
) -> Vec<ElementId> {
    match Selector::parse(selector) {
        Ok(parsed) => scope.into_iter().filter(|&el| parsed.matches(doc, el)).collect(),
        Err(err) => {
            tracing::debug!(selector, %err, "ignoring invalid selector");
            Vec::new()
        }
    }
}

// =============================================================================
// WRITE SIDE
// =============================================================================

/// Presentation mutations. Each returns `false` (or `None`) when the element
/// does not resolve, and does nothing in that case.
pub trait Presentation {
    fn add_class(&mut self, el: ElementId, class: &str) -> bool;

    fn remove_class(&mut self, el: ElementId, class: &str) -> bool;

    /// Returns whether the class is present afterwards.
    fn toggle_class(&mut self, el: ElementId, class: &str) -> Option<bool>;

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> bool;

    fn style(&self, el: ElementId, property: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) -> bool;

    fn remove_attribute(&mut self, el: ElementId, name: &str) -> bool;

    fn set_text(&mut self, el: ElementId, text: &str) -> bool;

    fn text(&self, el: ElementId) -> Option<String>;
}
