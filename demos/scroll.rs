//! Scroll Example - Reveal timeline of an invitation page
//!
//! This example builds an in-memory invitation page and scrolls through it:
//! - Sections reveal their items staggered as they enter the viewport
//! - A reactive effect reports every gallery item state change
//! - Scroll handling is throttled, so the navbar only updates once per window
//!
//! Run with: cargo run --example scroll
//! More detail: RUST_LOG=reveal_kit=debug cargo run --example scroll

use std::cell::RefCell;
use std::rc::Rc;

use reveal_kit::{
    Document, HostCapabilities, InvitationPage, MemoryDocument, PageConfig, PageEvent, Presentation,
    Rect, Timers,
};
use spark_signals::effect;
use tracing_subscriber::EnvFilter;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

/// Section stack: hero, about, gallery, details, schedule.
fn build_page() -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    let body = doc.body();

    let navbar = doc.append_element(body, "nav", "navbar", Rect::new(0.0, 0.0, WIDTH, 70.0));
    doc.append_element(navbar, "div", "hamburger", Rect::default());
    let menu = doc.append_element(navbar, "ul", "nav-menu", Rect::default());

    let mut top = 0.0;
    let mut section = |doc: &mut MemoryDocument, id: &str, class: &str, height: f32| {
        let el = doc.append_element(body, "section", class, Rect::new(0.0, top, WIDTH, height));
        doc.set_attribute(el, "id", id);
        let link = doc.append_element(menu, "a", "nav-link", Rect::default());
        doc.set_attribute(link, "href", &format!("#{id}"));
        top += height;
        el
    };

    let hero = section(&mut doc, "home", "hero", HEIGHT);
    doc.append_element(hero, "div", "hero-image", Rect::new(0.0, 0.0, WIDTH, HEIGHT));
    for class in ["couple-names", "wedding-date", "wedding-time", "invitation-text"] {
        let el = doc.append_element(hero, "p", class, Rect::new(0.0, 200.0, WIDTH, 40.0));
        if class == "invitation-text" {
            doc.set_text(el, "Together with their families");
        }
    }

    let rows = [
        ("about", "about-section", "about-person", 2, 500.0),
        ("gallery", "gallery-section", "gallery-item", 6, 300.0),
        ("details", "details-section", "detail-card", 3, 250.0),
        ("schedule", "schedule-section", "timeline-item", 4, 200.0),
    ];
    for (id, class, item_class, count, item_height) in rows {
        let height = count as f32 * item_height;
        let el = section(&mut doc, id, class, height);
        let y = doc.bounding_rect(el).map(|r| r.y).unwrap_or_default();
        for i in 0..count {
            let item = doc.append_element(
                el,
                "div",
                item_class,
                Rect::new(0.0, y + i as f32 * item_height, WIDTH, item_height),
            );
            if item_class == "gallery-item" {
                doc.set_attribute(item, "data-src", &format!("images/{i}.jpg"));
            }
        }
    }
    doc
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== reveal-kit Scroll Example ===\n");

    let doc = Rc::new(RefCell::new(build_page()));
    let timers = Timers::new();
    let page = InvitationPage::boot(
        doc.clone(),
        &timers,
        HostCapabilities::all(),
        PageConfig::default(),
        Rect::new(0.0, 0.0, WIDTH, HEIGHT),
    );

    // Report gallery item transitions as they happen
    let gallery = page.registry().set_items("gallery").unwrap_or_default();
    let mut stops = Vec::new();
    for (i, &item) in gallery.iter().enumerate() {
        let Some(state) = page.registry().state_signal(item) else { continue };
        let clock = timers.clone();
        stops.push(effect(move || {
            println!("  t={:>5}ms  gallery[{i}] -> {:?}", clock.now(), state.get());
        }));
    }

    // Scroll down the page in 400px steps, 120ms apart
    let mut y = 0.0;
    while y < 4_000.0 {
        y += 400.0;
        timers.advance_by(120);
        page.dispatch(PageEvent::Scroll { y });
        println!(
            "scroll y={y:>6}  revealed {}/{}",
            page.registry().revealed_count(),
            page.registry().watched()
        );
    }
    timers.run_until_idle();

    let doc = doc.borrow();
    let navbar_solid = doc
        .query_selector(".navbar")
        .is_some_and(|nav| doc.has_class(nav, "scrolled"));
    let active = doc
        .query_selector(".nav-link.active")
        .and_then(|link| doc.attribute(link, "href"));
    let typed = doc
        .query_selector(".invitation-text")
        .and_then(|el| doc.text(el));

    println!("\n=== Final State ===");
    println!("Revealed: {}/{}", page.registry().revealed_count(), page.registry().watched());
    println!("Navbar solid: {navbar_solid}");
    println!("Active link: {}", active.unwrap_or_default());
    println!("Invitation text: {}", typed.unwrap_or_default());
    println!("Clock: {}ms", timers.now());

    for stop in stops {
        stop();
    }
}
