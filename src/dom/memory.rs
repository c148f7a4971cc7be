//! In-memory element tree.
//!
//! Backs tests and the demo, and is the reference for what a host binding
//! must provide. Handles are indices into an append-only node list, so they
//! are never reused.

use std::collections::BTreeMap;

use super::{Document, Presentation};
use crate::types::{ElementId, Rect};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            rect: Rect::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
}

impl MemoryDocument {
    /// Empty document containing only `body`.
    pub fn new() -> Self {
        Self { nodes: vec![Node::new("body")] }
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.0 as usize)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.0 as usize)
    }

    /// Connected node, for operations that only make sense on attached elements.
    fn live(&self, el: ElementId) -> Option<&Node> {
        self.contains(el).then(|| self.node(el)).flatten()
    }

    fn live_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        if !self.contains(el) {
            return None;
        }
        self.node_mut(el)
    }

    /// Create a detached element. Presentation mutations on it are no-ops
    /// until it is appended.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        id
    }

    /// Move `child` under `parent`, after its existing children.
    ///
    /// Refuses to create cycles.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(el) = cursor {
            if el == child {
                return false;
            }
            cursor = self.node(el).and_then(|n| n.parent);
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Create an element under `parent` with a class list and layout box.
    ///
    /// `classes` is whitespace-separated, like the `class` attribute.
    pub fn append_element(
        &mut self,
        parent: ElementId,
        tag: &str,
        classes: &str,
        rect: Rect,
    ) -> ElementId {
        let el = self.create_element(tag);
        if let Some(node) = self.node_mut(el) {
            node.classes = classes.split_whitespace().map(str::to_string).collect();
            node.rect = rect;
        }
        self.append_child(parent, el);
        el
    }

    pub fn set_rect(&mut self, el: ElementId, rect: Rect) -> bool {
        match self.node_mut(el) {
            Some(node) => {
                node.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Detach `el` (and its subtree) from the tree. The handle stays valid
    /// but no longer resolves through [`Document`] queries.
    pub fn remove(&mut self, el: ElementId) -> bool {
        if el == self.body() || !self.contains(el) {
            return false;
        }
        self.detach(el);
        true
    }

    fn detach(&mut self, el: ElementId) {
        let Some(parent) = self.node(el).and_then(|n| n.parent) else { return };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != el);
        }
        if let Some(node) = self.node_mut(el) {
            node.parent = None;
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Document
// =============================================================================

impl Document for MemoryDocument {
    fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn tag_name(&self, el: ElementId) -> Option<String> {
        self.node(el).map(|n| n.tag.clone())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        let node = self.node(el)?;
        match name {
            "id" => node.id.clone(),
            "class" => (!node.classes.is_empty()).then(|| node.classes.join(" ")),
            _ => node.attributes.get(name).cloned(),
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el)?.parent
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn contains(&self, el: ElementId) -> bool {
        let body = self.body();
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == body {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn bounding_rect(&self, el: ElementId) -> Option<Rect> {
        self.live(el).map(|n| n.rect)
    }
}

// =============================================================================
// Presentation
// =============================================================================

impl Presentation for MemoryDocument {
    fn add_class(&mut self, el: ElementId, class: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        true
    }

    fn remove_class(&mut self, el: ElementId, class: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        node.classes.retain(|c| c != class);
        true
    }

    fn toggle_class(&mut self, el: ElementId, class: &str) -> Option<bool> {
        if self.has_class(el, class) {
            self.remove_class(el, class).then_some(false)
        } else {
            self.add_class(el, class).then_some(true)
        }
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        node.styles.insert(property.to_string(), value.to_string());
        true
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.node(el)?.styles.get(property).cloned()
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        match name {
            "id" => node.id = Some(value.to_string()),
            "class" => node.classes = value.split_whitespace().map(str::to_string).collect(),
            _ => {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        }
        true
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        match name {
            "id" => node.id = None,
            "class" => node.classes.clear(),
            _ => {
                node.attributes.remove(name);
            }
        }
        true
    }

    fn set_text(&mut self, el: ElementId, text: &str) -> bool {
        let Some(node) = self.live_mut(el) else { return false };
        node.text = text.to_string();
        true
    }

    fn text(&self, el: ElementId) -> Option<String> {
        self.node(el).map(|n| n.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryDocument, ElementId, Vec<ElementId>) {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let section = doc.append_element(body, "section", "gallery-section", Rect::new(0.0, 800.0, 400.0, 600.0));
        let items = (0..3)
            .map(|i| {
                doc.append_element(
                    section,
                    "div",
                    "gallery-item",
                    Rect::new(0.0, 800.0 + i as f32 * 200.0, 400.0, 200.0),
                )
            })
            .collect();
        (doc, section, items)
    }

    #[test]
    fn test_query_document_order() {
        let (doc, section, items) = page();
        assert_eq!(doc.query_selector_all(".gallery-item"), items);
        assert_eq!(doc.query_selector(".gallery-section"), Some(section));
        assert_eq!(doc.query_within(section, "div"), items);
        assert_eq!(doc.query_selector_all("section .gallery-item").len(), 3);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let (doc, _, _) = page();
        assert!(doc.query_selector_all("section > div").is_empty());
    }

    #[test]
    fn test_attribute_selectors() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let link = doc.append_element(body, "a", "nav-link", Rect::default());
        doc.set_attribute(link, "href", "#about");
        let other = doc.append_element(body, "a", "nav-link", Rect::default());
        doc.set_attribute(other, "href", "https://example.org");

        assert_eq!(doc.query_selector_all("a[href^=\"#\"]"), vec![link]);
        assert_eq!(doc.query_selector_all(".nav-link[href=\"#about\"]"), vec![link]);
        assert_eq!(doc.query_selector_all("a:not([href^=\"#\"])"), vec![other]);
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let (mut doc, section, items) = page();
        assert!(doc.remove(section));
        assert!(!doc.contains(items[0]));
        assert_eq!(doc.bounding_rect(items[0]), None);
        assert!(doc.query_selector_all(".gallery-item").is_empty());
        assert!(!doc.remove(section));
    }

    #[test]
    fn test_class_mutations() {
        let (mut doc, section, _) = page();
        assert_eq!(doc.toggle_class(section, "visible"), Some(true));
        assert!(doc.has_class(section, "visible"));
        assert_eq!(doc.toggle_class(section, "visible"), Some(false));
        assert_eq!(doc.toggle_class(ElementId(999), "visible"), None);
        assert!(!doc.add_class(ElementId(999), "visible"));
    }

    #[test]
    fn test_detached_element_ignores_mutations() {
        let (mut doc, section, items) = page();
        assert!(doc.remove(section));

        assert!(!doc.add_class(items[1], "visible"));
        assert!(!doc.has_class(items[1], "visible"));
        assert!(!doc.set_style(items[1], "opacity", "1"));
        assert_eq!(doc.style(items[1], "opacity"), None);
        assert!(!doc.set_attribute(section, "data-src", "img/1.png"));
        assert!(!doc.set_text(section, "gone"));
        assert_eq!(doc.toggle_class(section, "active"), None);

        let loose = doc.create_element("div");
        assert!(!doc.add_class(loose, "visible"));
        assert!(doc.append_child(doc.body(), loose));
        assert!(doc.add_class(loose, "visible"));
    }

    #[test]
    fn test_append_child_refuses_cycle() {
        let (mut doc, section, items) = page();
        assert!(!doc.append_child(items[0], section));
        assert!(!doc.append_child(section, section));
    }
}
