//! Page Module - Invitation page wiring around the reveal engine.
//!
//! One [`InvitationPage`] per document. It owns the single
//! [`RevealRegistry`] of the page, so every script-level reveal (sections,
//! golden lines, the hero typewriter) shares one observer and no element
//! can be revealed twice.
//!
//! - [`ImageModal`] - gallery lightbox
//! - [`NavMenu`] - hamburger menu, smooth-scroll targets, scroll spy
//! - [`RsvpForm`] - validation and mocked submission
//! - [`effects`] - parallax, hero entrance delays, typewriter
//! - [`images`] - lazy sources, loading state, failure placeholder
//!
//! # Example
//!
//! ```ignore
//! let doc = Rc::new(RefCell::new(build_page()));
//! let timers = Timers::new();
//! let page = InvitationPage::boot(doc, &timers, HostCapabilities::all(),
//!     PageConfig::default(), Rect::new(0.0, 0.0, 1280.0, 720.0));
//!
//! page.dispatch(PageEvent::Scroll { y: 900.0 });
//! timers.advance_by(500);
//! ```

pub mod effects;
mod events;
pub mod images;
mod form;
mod modal;
mod nav;

pub use effects::Typewriter;
pub use events::{KeyboardEvent, PageEvent};
pub use form::{validate, FormError, Notice, NoticeKind, RsvpForm, RsvpSubmission, SENDING_LABEL};
pub use modal::ImageModal;
pub use nav::NavMenu;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::PageConfig;
use crate::dom::{Document, Presentation};
use crate::engine::Timers;
use crate::limiter::{debounce, throttle, Debounced, Throttled};
use crate::reveal::{resolve_reveal_set, RevealOptions, RevealRegistry};
use crate::types::{ElementId, HostCapabilities, Millis, Rect, RootMargin};

/// Hero elements that fade in one after another on load.
pub const HERO_ENTRANCE_SELECTOR: &str =
    ".couple-names, .wedding-date, .wedding-time, .invitation-text, .scroll-indicator";

/// The invitation text starts typing this long after the hero shows.
pub const TYPEWRITER_DELAY_MS: Millis = 2_500;
pub const TYPEWRITER_SPEED_MS: Millis = 30;

/// Scroll the host should perform after a navigation click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub y: f32,
    /// The host animates the scroll and reports progress as
    /// [`PageEvent::Scroll`]. Otherwise the page has already jumped.
    pub smooth: bool,
}

// =============================================================================
// PAGE
// =============================================================================

pub struct InvitationPage<D> {
    doc: Rc<RefCell<D>>,
    timers: Timers,
    config: PageConfig,
    capabilities: HostCapabilities,
    registry: RevealRegistry,
    viewport: Rc<Cell<Rect>>,
    scroll_request: Cell<Option<ScrollRequest>>,
    on_scroll: Throttled<f32>,
    on_resize: Debounced<()>,
    modal: Option<ImageModal<D>>,
    nav: Option<NavMenu<D>>,
    form: Option<RsvpForm<D>>,
    typewriter: Rc<RefCell<Option<Typewriter>>>,
}

impl<D: Document + Presentation + 'static> InvitationPage<D> {
    /// Wire up everything the document has markup for and run the first
    /// reveal check against `viewport`.
    pub fn boot(
        doc: Rc<RefCell<D>>,
        timers: &Timers,
        capabilities: HostCapabilities,
        config: PageConfig,
        viewport: Rect,
    ) -> Self {
        let config = config.sanitized();
        let registry = {
            let weak = Rc::downgrade(&doc);
            let class = config.visible_class.clone();
            RevealRegistry::new(timers, capabilities, move |el| {
                if let Some(doc) = weak.upgrade() {
                    doc.borrow_mut().add_class(el, &class);
                }
            })
        };
        let viewport = Rc::new(Cell::new(viewport));

        let modal = ImageModal::attach(&doc);
        let nav = NavMenu::attach(&doc, &config);
        let form = RsvpForm::attach(&doc, timers, config.submit_delay_ms);

        let on_scroll = {
            let weak = Rc::downgrade(&doc);
            let nav = nav.clone();
            let speed = config.hero_parallax_speed;
            throttle(timers, config.scroll_throttle_ms, move |scroll_y: f32| {
                let Some(doc) = weak.upgrade() else { return };
                {
                    let mut doc = doc.borrow_mut();
                    if let Some(hero) = doc.query_selector(".hero-image") {
                        doc.set_style(hero, "transform", &effects::parallax_transform(scroll_y, speed));
                    }
                }
                if let Some(nav) = &nav {
                    nav.update_navbar(scroll_y);
                    nav.update_active_link(scroll_y);
                }
            })
        };

        let on_resize = {
            let weak = Rc::downgrade(&doc);
            let registry = registry.clone();
            let viewport = viewport.clone();
            debounce(timers, config.resize_debounce_ms, move |()| {
                if let Some(doc) = weak.upgrade() {
                    let entered = check_reveals(&doc, &registry, viewport.get());
                    tracing::debug!(entered, "reveal check after resize");
                }
            })
        };

        let page = Self {
            doc,
            timers: timers.clone(),
            config,
            capabilities,
            registry,
            viewport,
            scroll_request: Cell::new(None),
            on_scroll,
            on_resize,
            modal,
            nav,
            form,
            typewriter: Rc::new(RefCell::new(None)),
        };
        page.register_reveal_sets();
        page.stage_hero_entrance();
        page.watch_golden_lines();
        page.watch_images();
        page.watch_hero_text();
        page.check_reveals();
        tracing::info!(
            watched = page.registry.watched(),
            modal = page.modal.is_some(),
            nav = page.nav.is_some(),
            form = page.form.is_some(),
            "invitation page ready"
        );
        page
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    fn register_reveal_sets(&self) {
        // Resolve everything first: registration may reveal synchronously,
        // and the apply callback needs the document.
        let resolved: Vec<_> = {
            let doc = self.doc.borrow();
            self.config
                .reveal_sets
                .iter()
                .map(|set| (set, resolve_reveal_set(&*doc, &set.root, &set.items)))
                .collect()
        };
        for (set, found) in resolved {
            let Some((anchor, items)) = found else {
                tracing::warn!(set = %set.id, root = %set.root, "reveal set root not found, skipping");
                continue;
            };
            if let Err(err) = self.registry.register(&set.id, anchor, &items, self.config.options_for(set)) {
                tracing::warn!(%err, "reveal set not registered");
                continue;
            }
            let weak = Rc::downgrade(&self.doc);
            let class = self.config.visible_class.clone();
            let listening = self.registry.on_reveal_set_visible(&set.id, move |anchor| {
                if let Some(doc) = weak.upgrade() {
                    doc.borrow_mut().add_class(anchor, &class);
                }
            });
            if let Err(err) = listening {
                tracing::warn!(%err, "reveal set anchor not styled");
            }
        }
    }

    fn stage_hero_entrance(&self) {
        let mut doc = self.doc.borrow_mut();
        let elements = doc.query_selector_all(HERO_ENTRANCE_SELECTOR);
        for (el, delay) in elements.iter().zip(effects::entrance_delays(elements.len())) {
            doc.set_style(*el, "animation-delay", &effects::css_seconds(delay));
        }
    }

    fn watch_golden_lines(&self) {
        let lines = {
            let mut doc = self.doc.borrow_mut();
            let lines = doc.query_selector_all(".golden-line");
            for &line in &lines {
                doc.set_style(line, "transform", "scaleX(0)");
                doc.set_style(line, "opacity", "0");
                doc.set_style(line, "transition", "transform 1s ease, opacity 1s ease");
            }
            lines
        };
        for line in lines {
            let weak = Rc::downgrade(&self.doc);
            let watched = self.registry.on_reveal(line, move |el| {
                if let Some(doc) = weak.upgrade() {
                    let mut doc = doc.borrow_mut();
                    doc.set_style(el, "transform", "scaleX(1)");
                    doc.set_style(el, "opacity", "1");
                }
            });
            if let Err(err) = watched {
                tracing::debug!(%err, "golden line not watched, showing it now");
                let mut doc = self.doc.borrow_mut();
                doc.set_style(line, "transform", "scaleX(1)");
                doc.set_style(line, "opacity", "1");
            }
        }
    }

    fn watch_images(&self) {
        let lazy = {
            let mut doc = self.doc.borrow_mut();
            images::stage_loading(&mut *doc);
            let lazy = doc.query_selector_all(images::LAZY_IMAGE_SELECTOR);
            if self.capabilities.contains(HostCapabilities::NATIVE_LAZY_LOADING) {
                for &img in &lazy {
                    images::defer_to_host(&mut *doc, img);
                }
                return;
            }
            lazy
        };
        let options = RevealOptions {
            base_delay_ms: 0,
            per_item_delay_ms: 0,
            ..RevealOptions::default()
        }
        .with_threshold(0.0, RootMargin::ZERO);
        for img in lazy {
            let weak = Rc::downgrade(&self.doc);
            let watched = self.registry.on_reveal_with(img, options, move |el| {
                if let Some(doc) = weak.upgrade() {
                    images::load_lazy_image(&mut *doc.borrow_mut(), el);
                }
            });
            if let Err(err) = watched {
                tracing::debug!(%err, "lazy image not watched, loading it now");
                images::load_lazy_image(&mut *self.doc.borrow_mut(), img);
            }
        }
    }

    /// Retype the invitation text once half the hero is on screen.
    fn watch_hero_text(&self) {
        let (hero, text) = {
            let doc = self.doc.borrow();
            match (doc.query_selector(".hero"), doc.query_selector(".invitation-text")) {
                (Some(hero), Some(text)) => (hero, text),
                _ => return,
            }
        };
        let options = RevealOptions {
            base_delay_ms: TYPEWRITER_DELAY_MS,
            per_item_delay_ms: 0,
            ..RevealOptions::default()
        }
        .with_threshold(0.5, RootMargin::ZERO);

        let weak = Rc::downgrade(&self.doc);
        let timers = self.timers.clone();
        let slot = Rc::downgrade(&self.typewriter);
        let watched = self.registry.on_reveal_with(hero, options, move |_| {
            let (Some(doc), Some(slot)) = (weak.upgrade(), slot.upgrade()) else { return };
            let original = doc.borrow().text(text).unwrap_or_default();
            let target = Rc::downgrade(&doc);
            let typewriter = Typewriter::start(&timers, &original, TYPEWRITER_SPEED_MS, move |typed| {
                if let Some(doc) = target.upgrade() {
                    doc.borrow_mut().set_text(text, typed);
                }
            });
            *slot.borrow_mut() = Some(typewriter);
        });
        if let Err(err) = watched {
            tracing::debug!(%err, "hero typewriter skipped");
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Route one host event. Returns whether anything handled it.
    pub fn dispatch(&self, event: PageEvent) -> bool {
        match event {
            PageEvent::Scroll { y } => {
                self.scroll_to(y);
                true
            }
            PageEvent::Resize { width, height } => {
                let mut viewport = self.viewport.get();
                viewport.width = width.max(0.0);
                viewport.height = height.max(0.0);
                self.viewport.set(viewport);
                self.on_resize.call(());
                true
            }
            PageEvent::Click { target } => self.handle_click(target),
            PageEvent::Key(key) => self.modal.as_ref().is_some_and(|m| m.handle_key(&key)),
            PageEvent::Focus { target } => self.form.as_ref().is_some_and(|f| f.handle_focus(target)),
            PageEvent::Blur { target } => self.form.as_ref().is_some_and(|f| f.handle_blur(target)),
            PageEvent::Submit => match &self.form {
                Some(form) => {
                    if let Err(err) = form.submit() {
                        tracing::info!(%err, "rsvp rejected");
                    }
                    true
                }
                None => false,
            },
            PageEvent::ImageLoaded { target } => images::mark_loaded(&mut *self.doc.borrow_mut(), target),
            PageEvent::ImageFailed { target } => images::mark_failed(&mut *self.doc.borrow_mut(), target),
        }
    }

    fn scroll_to(&self, y: f32) {
        let mut viewport = self.viewport.get();
        viewport.y = y.max(0.0);
        self.viewport.set(viewport);
        self.check_reveals();
        self.on_scroll.call(viewport.y);
    }

    fn handle_click(&self, target: ElementId) -> bool {
        if let Some(modal) = &self.modal {
            if modal.handle_click(target) {
                return true;
            }
            let item = {
                let doc = self.doc.borrow();
                std::iter::successors(Some(target), |&el| doc.parent(el))
                    .find(|&el| doc.has_class(el, "gallery-item"))
            };
            if let Some(item) = item {
                return modal.open_from(item);
            }
        }
        let Some(nav) = &self.nav else { return false };
        let (consumed, scroll_to) = nav.handle_click(target);
        if let Some(y) = scroll_to {
            let smooth = self.capabilities.contains(HostCapabilities::SMOOTH_SCROLL);
            self.scroll_request.set(Some(ScrollRequest { y, smooth }));
            if !smooth {
                self.scroll_to(y);
            }
        }
        consumed
    }

    /// Measure the watched anchors against the current viewport and deliver
    /// entries. Returns how many anchors entered.
    pub fn check_reveals(&self) -> usize {
        check_reveals(&self.doc, &self.registry, self.viewport.get())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// The latest navigation scroll, cleared by reading it.
    pub fn take_scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn registry(&self) -> &RevealRegistry {
        &self.registry
    }

    pub fn modal(&self) -> Option<&ImageModal<D>> {
        self.modal.as_ref()
    }

    pub fn nav(&self) -> Option<&NavMenu<D>> {
        self.nav.as_ref()
    }

    pub fn form(&self) -> Option<&RsvpForm<D>> {
        self.form.as_ref()
    }

    /// Whether the hero typewriter is still typing.
    pub fn is_typing(&self) -> bool {
        self.typewriter.borrow().as_ref().is_some_and(Typewriter::is_running)
    }

    pub fn document(&self) -> Weak<RefCell<D>> {
        Rc::downgrade(&self.doc)
    }
}

/// Measure under a shared borrow, deliver after releasing it.
fn check_reveals<D: Document>(doc: &RefCell<D>, registry: &RevealRegistry, viewport: Rect) -> usize {
    let batch = registry.measure(&*doc.borrow(), viewport);
    batch.deliver()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RevealSetConfig;
    use crate::dom::MemoryDocument;

    const WIDTH: f32 = 400.0;
    const HEIGHT: f32 = 600.0;

    struct Fixture {
        doc: Rc<RefCell<MemoryDocument>>,
        hero_text: ElementId,
        gallery_items: Vec<ElementId>,
        gallery: ElementId,
        line: ElementId,
        lazy_image: ElementId,
        navbar: ElementId,
        gallery_link: ElementId,
    }

    /// Hero at the top, gallery at 1200, a golden line at 2400.
    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let navbar = doc.append_element(body, "nav", "navbar", Rect::new(0.0, 0.0, WIDTH, 70.0));
        doc.append_element(navbar, "div", "hamburger", Rect::default());
        let menu = doc.append_element(navbar, "ul", "nav-menu", Rect::default());
        let gallery_link = doc.append_element(menu, "a", "nav-link", Rect::default());
        doc.set_attribute(gallery_link, "href", "#gallery");
        let hero = doc.append_element(body, "section", "hero", Rect::new(0.0, 0.0, WIDTH, HEIGHT));
        doc.set_attribute(hero, "id", "home");
        doc.append_element(hero, "div", "hero-image", Rect::new(0.0, 0.0, WIDTH, HEIGHT));
        doc.append_element(hero, "h1", "couple-names", Rect::new(0.0, 100.0, WIDTH, 50.0));
        doc.append_element(hero, "p", "wedding-date", Rect::new(0.0, 160.0, WIDTH, 20.0));
        let hero_text = doc.append_element(hero, "p", "invitation-text", Rect::new(0.0, 200.0, WIDTH, 40.0));
        doc.set_text(hero_text, "Join us");

        let gallery = doc.append_element(body, "section", "gallery-section", Rect::new(0.0, 1200.0, WIDTH, 600.0));
        doc.set_attribute(gallery, "id", "gallery");
        let gallery_items = (0..3)
            .map(|i| {
                let item = doc.append_element(
                    gallery,
                    "div",
                    "gallery-item",
                    Rect::new(0.0, 1200.0 + i as f32 * 200.0, WIDTH, 200.0),
                );
                doc.set_attribute(item, "data-src", &format!("img/{i}.png"));
                doc.append_element(item, "img", "", Rect::default());
                item
            })
            .collect();
        let line = doc.append_element(body, "div", "golden-line", Rect::new(0.0, 2400.0, WIDTH, 2.0));
        let lazy_image = doc.append_element(body, "img", "lazy", Rect::new(0.0, 3000.0, WIDTH, 200.0));
        doc.set_attribute(lazy_image, "data-src", "img/venue.jpg");

        let modal = doc.append_element(body, "div", "modal hidden", Rect::default());
        doc.set_attribute(modal, "id", "modal");
        let image = doc.append_element(modal, "img", "", Rect::default());
        doc.set_attribute(image, "id", "modal-image");

        Fixture {
            doc: Rc::new(RefCell::new(doc)),
            hero_text,
            gallery_items,
            gallery,
            line,
            lazy_image,
            navbar,
            gallery_link,
        }
    }

    fn config() -> PageConfig {
        PageConfig {
            reveal_sets: vec![RevealSetConfig::new("gallery", ".gallery-section", ".gallery-item")
                .with_options(RevealOptions::with_delays(0, 100))],
            ..PageConfig::default()
        }
    }

    fn boot(f: &Fixture, timers: &Timers, caps: HostCapabilities) -> InvitationPage<MemoryDocument> {
        InvitationPage::boot(f.doc.clone(), timers, caps, config(), Rect::new(0.0, 0.0, WIDTH, HEIGHT))
    }

    fn visible(f: &Fixture) -> Vec<bool> {
        let doc = f.doc.borrow();
        f.gallery_items.iter().map(|&el| doc.has_class(el, "visible")).collect()
    }

    #[test]
    fn test_scroll_reveals_gallery_staggered() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());
        assert_eq!(visible(&f), vec![false, false, false]);

        page.dispatch(PageEvent::Scroll { y: 900.0 });
        assert_eq!(page.registry().is_set_visible("gallery"), Some(true));
        timers.advance_by(0);
        assert_eq!(visible(&f), vec![true, false, false]);
        timers.advance_by(100);
        assert_eq!(visible(&f), vec![true, true, false]);
        timers.advance_by(100);
        assert_eq!(visible(&f), vec![true, true, true]);

        // Scrolling away and back does not replay anything.
        let outstanding = page.registry().scheduler().outstanding();
        page.dispatch(PageEvent::Scroll { y: 0.0 });
        page.dispatch(PageEvent::Scroll { y: 900.0 });
        assert_eq!(page.registry().scheduler().outstanding(), outstanding);
    }

    #[test]
    fn test_fallback_reveals_everything_on_boot() {
        let f = fixture();
        let timers = Timers::new();
        let _page = boot(&f, &timers, HostCapabilities::empty());
        assert_eq!(visible(&f), vec![true, true, true]);
        assert_eq!(f.doc.borrow().style(f.line, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_golden_line_starts_collapsed() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());
        assert_eq!(f.doc.borrow().style(f.line, "transform").as_deref(), Some("scaleX(0)"));

        page.dispatch(PageEvent::Scroll { y: 2000.0 });
        timers.advance_by(0);
        let doc = f.doc.borrow();
        assert_eq!(doc.style(f.line, "transform").as_deref(), Some("scaleX(1)"));
        assert_eq!(doc.style(f.line, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_hero_entrance_delays() {
        let f = fixture();
        let timers = Timers::new();
        let _page = boot(&f, &timers, HostCapabilities::all());
        let doc = f.doc.borrow();
        let names = doc.query_selector(".couple-names").unwrap();
        assert_eq!(doc.style(names, "animation-delay").as_deref(), Some("0.5s"));
        assert_eq!(doc.style(f.hero_text, "animation-delay").as_deref(), Some("1.1s"));
    }

    #[test]
    fn test_hero_text_is_retyped() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());

        timers.advance_by(TYPEWRITER_DELAY_MS);
        assert!(page.is_typing());
        assert_eq!(f.doc.borrow().text(f.hero_text).as_deref(), Some("J"));
        timers.run_until_idle();
        assert!(!page.is_typing());
        assert_eq!(f.doc.borrow().text(f.hero_text).as_deref(), Some("Join us"));
    }

    #[test]
    fn test_scroll_handlers_are_throttled() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());

        page.dispatch(PageEvent::Scroll { y: 200.0 });
        let hero = f.doc.borrow().query_selector(".hero-image").unwrap();
        assert_eq!(f.doc.borrow().style(hero, "transform").as_deref(), Some("translateY(100px)"));
        assert!(f.doc.borrow().has_class(f.navbar, "scrolled"));

        // Within the 16 ms window: dropped.
        page.dispatch(PageEvent::Scroll { y: 400.0 });
        assert_eq!(f.doc.borrow().style(hero, "transform").as_deref(), Some("translateY(100px)"));

        timers.advance_by(16);
        page.dispatch(PageEvent::Scroll { y: 400.0 });
        assert_eq!(f.doc.borrow().style(hero, "transform").as_deref(), Some("translateY(200px)"));
    }

    #[test]
    fn test_nav_link_scrolls_below_navbar() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::VISIBILITY_OBSERVER);

        assert!(page.dispatch(PageEvent::Click { target: f.gallery_link }));
        assert_eq!(page.take_scroll_request(), Some(ScrollRequest { y: 1_130.0, smooth: false }));
        assert_eq!(page.viewport().y, 1_130.0);
        assert_eq!(page.registry().is_set_visible("gallery"), Some(true));
        let doc = f.doc.borrow();
        assert!(doc.has_class(f.gallery_link, "active"));
        assert!(doc.has_class(f.navbar, "scrolled"));
    }

    #[test]
    fn test_smooth_scroll_is_left_to_the_host() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());

        assert!(page.dispatch(PageEvent::Click { target: f.gallery_link }));
        assert_eq!(page.take_scroll_request(), Some(ScrollRequest { y: 1_130.0, smooth: true }));
        assert_eq!(page.take_scroll_request(), None);
        assert_eq!(page.viewport().y, 0.0);
        assert_eq!(page.registry().is_set_visible("gallery"), Some(false));

        page.dispatch(PageEvent::Scroll { y: 1_130.0 });
        assert_eq!(page.registry().is_set_visible("gallery"), Some(true));
    }

    #[test]
    fn test_section_anchor_gets_visible_class() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());
        assert!(!f.doc.borrow().has_class(f.gallery, "visible"));

        page.dispatch(PageEvent::Scroll { y: 900.0 });
        assert!(f.doc.borrow().has_class(f.gallery, "visible"));

        let f = fixture();
        let _page = boot(&f, &timers, HostCapabilities::empty());
        assert!(f.doc.borrow().has_class(f.gallery, "visible"));
    }

    #[test]
    fn test_golden_line_owned_by_a_set_stays_visible() {
        let mut config = config();
        config.reveal_sets.push(RevealSetConfig::new("lines", "body", ".golden-line"));

        for caps in [HostCapabilities::all(), HostCapabilities::empty()] {
            let f = fixture();
            let timers = Timers::new();
            let _page = InvitationPage::boot(f.doc.clone(), &timers, caps, config.clone(), Rect::new(0.0, 0.0, WIDTH, HEIGHT));
            let doc = f.doc.borrow();
            assert_eq!(doc.style(f.line, "opacity").as_deref(), Some("1"));
            assert_eq!(doc.style(f.line, "transform").as_deref(), Some("scaleX(1)"));
        }
    }

    #[test]
    fn test_lazy_image_loads_when_scrolled_into_view() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::VISIBILITY_OBSERVER);
        {
            let doc = f.doc.borrow();
            assert_eq!(doc.attribute(f.lazy_image, "src"), None);
            assert_eq!(doc.style(f.lazy_image, "opacity").as_deref(), Some("0"));
        }

        page.dispatch(PageEvent::Scroll { y: 2_700.0 });
        timers.advance_by(0);
        {
            let doc = f.doc.borrow();
            assert_eq!(doc.attribute(f.lazy_image, "src").as_deref(), Some("img/venue.jpg"));
            assert!(!doc.has_class(f.lazy_image, "lazy"));
        }

        assert!(page.dispatch(PageEvent::ImageLoaded { target: f.lazy_image }));
        assert_eq!(f.doc.borrow().style(f.lazy_image, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_native_lazy_loading_defers_to_host() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());
        {
            let doc = f.doc.borrow();
            assert_eq!(doc.attribute(f.lazy_image, "loading").as_deref(), Some("lazy"));
            assert_eq!(doc.attribute(f.lazy_image, "src").as_deref(), Some("img/venue.jpg"));
        }
        assert_eq!(page.registry().state(f.lazy_image), None);

        assert!(page.dispatch(PageEvent::ImageFailed { target: f.lazy_image }));
        let doc = f.doc.borrow();
        assert_eq!(doc.style(f.lazy_image, "opacity").as_deref(), Some("1"));
        assert_eq!(doc.style(f.lazy_image, "background-color").as_deref(), Some("#f0f0f0"));
    }

    #[test]
    fn test_resize_is_debounced() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());

        page.dispatch(PageEvent::Resize { width: WIDTH, height: 1_000.0 });
        page.dispatch(PageEvent::Resize { width: WIDTH, height: 1_500.0 });
        assert_eq!(page.registry().is_set_visible("gallery"), Some(false));

        timers.advance_by(250);
        assert_eq!(page.registry().is_set_visible("gallery"), Some(true));
    }

    #[test]
    fn test_click_gallery_image_opens_modal() {
        let f = fixture();
        let timers = Timers::new();
        let page = boot(&f, &timers, HostCapabilities::all());
        let img = f.doc.borrow().children(f.gallery_items[1])[0];

        assert!(page.dispatch(PageEvent::Click { target: img }));
        assert!(page.modal().unwrap().is_open());
        assert!(page.dispatch(PageEvent::Key(KeyboardEvent::new("Escape"))));
        assert!(!page.modal().unwrap().is_open());
        assert!(!page.dispatch(PageEvent::Submit));
    }
}
