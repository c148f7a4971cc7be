//! Images: lazy sources, loading state, failure placeholder.
//!
//! A lazy image carries its real source in `data-src` and the `lazy` class.
//! Loading swaps it into `src`. Images with a source fade in from a blurred
//! loading state once the host reports them loaded; a failed image gets a
//! neutral placeholder instead of staying transparent.

use crate::dom::{Document, Presentation};
use crate::types::ElementId;

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

const LAZY: &str = "lazy";
const PLACEHOLDER_GLYPH: &str = "\u{1F4F8}";

/// Copy `data-src` into `src` and drop the `lazy` class.
///
/// Returns `false` for images without `data-src`.
pub fn load_lazy_image<D: Document + Presentation + ?Sized>(doc: &mut D, img: ElementId) -> bool {
    let Some(src) = doc.attribute(img, "data-src") else {
        return false;
    };
    doc.set_attribute(img, "src", &src);
    doc.remove_class(img, LAZY);
    tracing::trace!(%img, %src, "lazy image loaded");
    true
}

/// Hand deferral to the host: source in place, `loading="lazy"`.
pub fn defer_to_host<D: Document + Presentation + ?Sized>(doc: &mut D, img: ElementId) -> bool {
    doc.set_attribute(img, "loading", "lazy");
    load_lazy_image(doc, img)
}

/// Put every image that has a source into the blurred loading state.
///
/// Images with neither `src` nor `data-src` are left alone, so nothing is
/// hidden that no load event will ever reveal. Returns the staged images.
pub fn stage_loading<D: Document + Presentation + ?Sized>(doc: &mut D) -> Vec<ElementId> {
    let images: Vec<ElementId> = doc
        .query_selector_all("img")
        .into_iter()
        .filter(|&img| doc.attribute(img, "src").is_some() || doc.attribute(img, "data-src").is_some())
        .collect();
    for &img in &images {
        doc.set_style(img, "opacity", "0");
        doc.set_style(img, "filter", "blur(5px)");
        doc.set_style(img, "transition", "opacity 0.5s ease, filter 0.5s ease");
    }
    images
}

/// The host finished loading `img`.
pub fn mark_loaded<D: Presentation + ?Sized>(doc: &mut D, img: ElementId) -> bool {
    doc.set_style(img, "opacity", "1") && doc.set_style(img, "filter", "none")
}

/// The host failed to load `img`: show a placeholder instead.
pub fn mark_failed<D: Document + Presentation + ?Sized>(doc: &mut D, img: ElementId) -> bool {
    let src = doc.attribute(img, "src").unwrap_or_default();
    tracing::warn!(%img, %src, "image failed to load");
    if !mark_loaded(doc, img) {
        return false;
    }
    for (property, value) in [
        ("background-color", "#f0f0f0"),
        ("display", "flex"),
        ("align-items", "center"),
        ("justify-content", "center"),
    ] {
        doc.set_style(img, property, value);
    }
    doc.set_text(img, PLACEHOLDER_GLYPH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::types::Rect;

    fn doc() -> (MemoryDocument, ElementId, ElementId, ElementId) {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let lazy = doc.append_element(body, "img", "lazy", Rect::default());
        doc.set_attribute(lazy, "data-src", "img/party.jpg");
        let eager = doc.append_element(body, "img", "", Rect::default());
        doc.set_attribute(eager, "src", "img/cake.jpg");
        let empty = doc.append_element(body, "img", "", Rect::default());
        (doc, lazy, eager, empty)
    }

    #[test]
    fn test_lazy_image_swaps_source() {
        let (mut doc, lazy, eager, _) = doc();
        assert_eq!(doc.query_selector_all(LAZY_IMAGE_SELECTOR), vec![lazy]);
        assert!(load_lazy_image(&mut doc, lazy));
        assert_eq!(doc.attribute(lazy, "src").as_deref(), Some("img/party.jpg"));
        assert!(!doc.has_class(lazy, "lazy"));
        assert!(!load_lazy_image(&mut doc, eager));
    }

    #[test]
    fn test_defer_to_host() {
        let (mut doc, lazy, _, _) = doc();
        assert!(defer_to_host(&mut doc, lazy));
        assert_eq!(doc.attribute(lazy, "loading").as_deref(), Some("lazy"));
        assert_eq!(doc.attribute(lazy, "src").as_deref(), Some("img/party.jpg"));
    }

    #[test]
    fn test_loading_state_skips_sourceless_images() {
        let (mut doc, lazy, eager, empty) = doc();
        assert_eq!(stage_loading(&mut doc), vec![lazy, eager]);
        assert_eq!(doc.style(eager, "filter").as_deref(), Some("blur(5px)"));
        assert_eq!(doc.style(empty, "opacity"), None);

        assert!(mark_loaded(&mut doc, eager));
        assert_eq!(doc.style(eager, "opacity").as_deref(), Some("1"));
        assert_eq!(doc.style(eager, "filter").as_deref(), Some("none"));
    }

    #[test]
    fn test_failed_image_is_never_transparent() {
        let (mut doc, _, eager, _) = doc();
        stage_loading(&mut doc);
        assert!(mark_failed(&mut doc, eager));
        assert_eq!(doc.style(eager, "opacity").as_deref(), Some("1"));
        assert_eq!(doc.style(eager, "background-color").as_deref(), Some("#f0f0f0"));
        assert_eq!(doc.text(eager).as_deref(), Some(PLACEHOLDER_GLYPH));
    }
}
