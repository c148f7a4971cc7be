//! Navigation: hamburger menu, smooth-scroll targets, scroll spy.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PageConfig;
use crate::dom::{Document, Presentation};
use crate::types::ElementId;

const ACTIVE: &str = "active";
const SOLID: &str = "scrolled";

pub struct NavMenu<D> {
    doc: Rc<RefCell<D>>,
    hamburger: ElementId,
    menu: ElementId,
    links: Vec<ElementId>,
    navbar: Option<ElementId>,
    nav_offset_px: f32,
    active_link_offset_px: f32,
    solid_after_px: f32,
}

impl<D> Clone for NavMenu<D> {
    fn clone(&self) -> Self {
        Self {
            doc: self.doc.clone(),
            hamburger: self.hamburger,
            menu: self.menu,
            links: self.links.clone(),
            navbar: self.navbar,
            nav_offset_px: self.nav_offset_px,
            active_link_offset_px: self.active_link_offset_px,
            solid_after_px: self.solid_after_px,
        }
    }
}

impl<D: Document + Presentation> NavMenu<D> {
    /// Find `.hamburger`, `.nav-menu`, `.nav-link` and `.navbar`.
    ///
    /// Returns `None` when the page has no hamburger menu.
    pub fn attach(doc: &Rc<RefCell<D>>, config: &PageConfig) -> Option<Self> {
        let (hamburger, menu, links, navbar) = {
            let d = doc.borrow();
            (
                d.query_selector(".hamburger")?,
                d.query_selector(".nav-menu")?,
                d.query_selector_all(".nav-link"),
                d.query_selector(".navbar"),
            )
        };
        Some(Self {
            doc: doc.clone(),
            hamburger,
            menu,
            links,
            navbar,
            nav_offset_px: config.nav_offset_px,
            active_link_offset_px: config.active_link_offset_px,
            solid_after_px: config.navbar_solid_after_px,
        })
    }

    pub fn is_open(&self) -> bool {
        self.doc.borrow().has_class(self.menu, ACTIVE)
    }

    /// Flip the menu. Returns whether it is open afterwards.
    pub fn toggle(&self) -> bool {
        let mut doc = self.doc.borrow_mut();
        doc.toggle_class(self.hamburger, ACTIVE);
        doc.toggle_class(self.menu, ACTIVE).unwrap_or(false)
    }

    pub fn close(&self) {
        let mut doc = self.doc.borrow_mut();
        doc.remove_class(self.hamburger, ACTIVE);
        doc.remove_class(self.menu, ACTIVE);
    }

    /// Handle a click. Link clicks close the menu and yield the scroll
    /// position to move to. Returns `(consumed, scroll_to)`.
    pub fn handle_click(&self, target: ElementId) -> (bool, Option<f32>) {
        if target == self.hamburger {
            self.toggle();
            return (true, None);
        }
        if !self.links.contains(&target) {
            return (false, None);
        }
        self.close();
        let href = self.doc.borrow().attribute(target, "href");
        (true, href.and_then(|href| self.scroll_target(&href)))
    }

    /// Scroll position that brings `#section` just below the fixed navbar.
    ///
    /// `None` for non-fragment links or missing targets.
    pub fn scroll_target(&self, href: &str) -> Option<f32> {
        let fragment = href.strip_prefix('#').filter(|f| !f.is_empty())?;
        let doc = self.doc.borrow();
        let target = doc.query_selector(&format!("#{fragment}"))?;
        let rect = doc.bounding_rect(target)?;
        Some((rect.y - self.nav_offset_px).max(0.0))
    }

    /// Highlight the link of the section under `scroll_y` (plus look-ahead).
    ///
    /// Returns the active section id, or `None` when no section matches, in
    /// which case the previous highlight is kept.
    pub fn update_active_link(&self, scroll_y: f32) -> Option<String> {
        let mut doc = self.doc.borrow_mut();
        let pos = scroll_y + self.active_link_offset_px;
        let current = doc
            .query_selector_all("section")
            .into_iter()
            .filter_map(|section| {
                let rect = doc.bounding_rect(section)?;
                let id = doc.attribute(section, "id")?;
                (pos >= rect.y && pos <= rect.bottom()).then_some(id)
            })
            .last()?;

        for &link in &self.links {
            doc.remove_class(link, ACTIVE);
        }
        let wanted = format!("#{current}");
        let matching: Vec<ElementId> = self
            .links
            .iter()
            .copied()
            .filter(|&link| doc.attribute(link, "href").as_deref() == Some(wanted.as_str()))
            .collect();
        for link in matching {
            doc.add_class(link, ACTIVE);
        }
        Some(current)
    }

    /// Solid navbar past the threshold. Returns whether it is solid.
    pub fn update_navbar(&self, scroll_y: f32) -> bool {
        let solid = scroll_y > self.solid_after_px;
        if let Some(navbar) = self.navbar {
            let mut doc = self.doc.borrow_mut();
            if solid {
                doc.add_class(navbar, SOLID);
            } else {
                doc.remove_class(navbar, SOLID);
            }
        }
        solid
    }
}
