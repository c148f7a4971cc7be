//! RSVP form: validation, mocked submission, field focus styling.
//!
//! Nothing is sent anywhere. Submitting disables the button for the
//! configured delay, then clears the form and records a thank-you notice.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::{Document, Presentation};
use crate::engine::Timers;
use crate::types::{ElementId, Millis};

pub const SENDING_LABEL: &str = "Sending...";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("please enter your name")]
    MissingName,
    #[error("please tell us whether you will attend")]
    MissingAttendance,
    #[error("a submission is already in progress")]
    InProgress,
}

/// Validated form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpSubmission {
    pub name: String,
    pub attendance: String,
    pub guests: Option<u32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-facing message (rendered by the host as a toast or alert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Check required fields. Blank values count as missing.
pub fn validate(fields: &BTreeMap<String, String>) -> Result<RsvpSubmission, FormError> {
    let field = |name: &str| {
        fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let name = field("name").ok_or(FormError::MissingName)?;
    let attendance = field("attendance").ok_or(FormError::MissingAttendance)?;
    Ok(RsvpSubmission {
        name,
        attendance,
        guests: field("guests").and_then(|g| g.parse().ok()),
        message: field("message"),
    })
}

pub struct RsvpForm<D> {
    doc: Rc<RefCell<D>>,
    timers: Timers,
    form: ElementId,
    button: Option<ElementId>,
    delay_ms: Millis,
    submitting: Rc<Cell<bool>>,
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl<D: Document + Presentation + 'static> RsvpForm<D> {
    /// Find `.rsvp-form` and its `.submit-btn`.
    pub fn attach(doc: &Rc<RefCell<D>>, timers: &Timers, delay_ms: Millis) -> Option<Self> {
        let (form, button) = {
            let d = doc.borrow();
            let form = d.query_selector(".rsvp-form")?;
            (form, d.query_within(form, ".submit-btn").into_iter().next())
        };
        Some(Self {
            doc: doc.clone(),
            timers: timers.clone(),
            form,
            button,
            delay_ms,
            submitting: Rc::new(Cell::new(false)),
            notices: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Current `name -> value` pairs of the form's named fields.
    pub fn fields(&self) -> BTreeMap<String, String> {
        let doc = self.doc.borrow();
        doc.query_within(self.form, "[name]")
            .into_iter()
            .filter_map(|el| {
                let name = doc.attribute(el, "name")?;
                Some((name, doc.attribute(el, "value").unwrap_or_default()))
            })
            .collect()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Validate and start the mocked submission.
    pub fn submit(&self) -> Result<RsvpSubmission, FormError> {
        if self.submitting.get() {
            return Err(FormError::InProgress);
        }
        let submission = match validate(&self.fields()) {
            Ok(submission) => submission,
            Err(err) => {
                self.notices.borrow_mut().push(Notice {
                    kind: NoticeKind::Error,
                    text: err.to_string(),
                });
                return Err(err);
            }
        };

        let original_label = self.button.and_then(|b| {
            let mut doc = self.doc.borrow_mut();
            let label = doc.text(b);
            doc.set_text(b, SENDING_LABEL);
            doc.set_attribute(b, "disabled", "");
            label
        });
        self.submitting.set(true);
        tracing::debug!(name = %submission.name, "rsvp submission started");

        let doc = Rc::downgrade(&self.doc);
        let form = self.form;
        let button = self.button;
        let submitting = self.submitting.clone();
        let notices = self.notices.clone();
        let name = submission.name.clone();
        self.timers.set_timeout(self.delay_ms, move || {
            if let Some(doc) = doc.upgrade() {
                let mut doc = doc.borrow_mut();
                for field in doc.query_within(form, "[name]") {
                    doc.set_attribute(field, "value", "");
                }
                if let Some(button) = button {
                    doc.set_text(button, original_label.as_deref().unwrap_or_default());
                    doc.remove_attribute(button, "disabled");
                }
            }
            submitting.set(false);
            notices.borrow_mut().push(Notice {
                kind: NoticeKind::Success,
                text: format!("Thank you, {name}! Your reply has been received."),
            });
        });
        Ok(submission)
    }

    /// Mark the field's group as focused.
    pub fn handle_focus(&self, input: ElementId) -> bool {
        let mut doc = self.doc.borrow_mut();
        match doc.parent(input) {
            Some(group) if doc.has_class(group, "form-group") => doc.add_class(group, "focused"),
            _ => false,
        }
    }

    /// Unmark the field's group, unless the field has a value.
    pub fn handle_blur(&self, input: ElementId) -> bool {
        let mut doc = self.doc.borrow_mut();
        let empty = doc.attribute(input, "value").is_none_or(|v| v.is_empty());
        match doc.parent(input) {
            Some(group) if empty && doc.has_class(group, "form-group") => doc.remove_class(group, "focused"),
            _ => false,
        }
    }
}
