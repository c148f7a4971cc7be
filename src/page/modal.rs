//! Image modal (gallery lightbox).
//!
//! Opening copies the gallery item's `data-src` and its image's `alt` into
//! the modal image, swaps `hidden` for `visible` and locks body scroll.
//! Closing reverses that. Escape and backdrop clicks close; clicks inside
//! the modal content do not.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::events::KeyboardEvent;
use crate::dom::{Document, Presentation};
use crate::types::ElementId;

pub struct ImageModal<D> {
    doc: Rc<RefCell<D>>,
    modal: ElementId,
    image: ElementId,
    close_button: Option<ElementId>,
    open: Signal<bool>,
}

impl<D> Clone for ImageModal<D> {
    fn clone(&self) -> Self {
        Self {
            doc: self.doc.clone(),
            modal: self.modal,
            image: self.image,
            close_button: self.close_button,
            open: self.open.clone(),
        }
    }
}

impl<D: Document + Presentation> ImageModal<D> {
    /// Find `#modal`, `#modal-image` and `.modal-close`.
    ///
    /// Returns `None` when the page has no modal markup.
    pub fn attach(doc: &Rc<RefCell<D>>) -> Option<Self> {
        let (modal, image, close_button) = {
            let d = doc.borrow();
            let modal = d.query_selector("#modal")?;
            let image = d.query_selector("#modal-image")?;
            (modal, image, d.query_within(modal, ".modal-close").into_iter().next())
        };
        Some(Self {
            doc: doc.clone(),
            modal,
            image,
            close_button,
            open: signal(false),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Reactive open state.
    pub fn open_signal(&self) -> Signal<bool> {
        self.open.clone()
    }

    /// Show `item`'s full-size image. Returns `false` if the item has no
    /// `data-src`.
    pub fn open_from(&self, item: ElementId) -> bool {
        {
            let mut doc = self.doc.borrow_mut();
            let Some(src) = doc.attribute(item, "data-src") else {
                return false;
            };
            let alt = doc
                .query_within(item, "img")
                .into_iter()
                .next()
                .and_then(|img| doc.attribute(img, "alt"))
                .unwrap_or_default();

            doc.set_attribute(self.image, "src", &src);
            doc.set_attribute(self.image, "alt", &alt);
            doc.remove_class(self.modal, "hidden");
            doc.add_class(self.modal, "visible");
            let body = doc.body();
            doc.set_style(body, "overflow", "hidden");
        }
        tracing::debug!(%item, "image modal opened");
        self.open.set(true);
        true
    }

    /// Returns `false` if the modal was not open.
    pub fn close(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        {
            let mut doc = self.doc.borrow_mut();
            doc.remove_class(self.modal, "visible");
            doc.add_class(self.modal, "hidden");
            let body = doc.body();
            doc.set_style(body, "overflow", "auto");
        }
        self.open.set(false);
        true
    }

    /// Escape closes an open modal. Returns whether the event was consumed.
    pub fn handle_key(&self, event: &KeyboardEvent) -> bool {
        event.is_escape() && self.close()
    }

    /// Backdrop or close-button clicks close. Returns whether consumed.
    pub fn handle_click(&self, target: ElementId) -> bool {
        if target == self.modal || Some(target) == self.close_button {
            return self.close();
        }
        false
    }
}
