use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use log::{debug, error};
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Window};

use crate::config;
use crate::dom;

/// Where a dialog lives in the page and how it animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalSpec {
    pub name: &'static str,
    pub container_id: &'static str,
    pub opener_id: &'static str,
    pub closer_id: &'static str,
    pub overlay_selector: &'static str,
    /// Delay before the `show` class is added. `None` means the dialog has no
    /// fade and never gets the class.
    pub show_delay_ms: Option<u32>,
    /// Delay between dropping `show` and hiding, long enough for the fade out.
    pub hide_delay_ms: Option<u32>,
    pub marks_opener_active: bool,
    pub opener_toggles: bool,
    /// Clicks landing on the container itself (outside the content) close it.
    pub closes_on_backdrop: bool,
}

pub const SCHEDULING: ModalSpec = ModalSpec {
    name: "scheduling",
    container_id: "calendly-modal",
    opener_id: "schedule-btn",
    closer_id: "close-calendly",
    overlay_selector: ".calendly-modal-overlay",
    show_delay_ms: Some(config::MODAL_SHOW_DELAY_MS),
    hide_delay_ms: Some(config::SCHEDULING_HIDE_DELAY_MS),
    marks_opener_active: true,
    opener_toggles: true,
    closes_on_backdrop: true,
};

pub const CONTACT: ModalSpec = ModalSpec {
    name: "contact",
    container_id: "contact-form-modal",
    opener_id: "open-contact-modal",
    closer_id: "close-contact-modal",
    overlay_selector: ".contact-modal-overlay",
    show_delay_ms: Some(config::MODAL_SHOW_DELAY_MS),
    hide_delay_ms: Some(config::CONTACT_HIDE_DELAY_MS),
    marks_opener_active: false,
    opener_toggles: false,
    closes_on_backdrop: false,
};

pub const CREDITS: ModalSpec = ModalSpec {
    name: "credits",
    container_id: "credits-modal",
    opener_id: "credits-link",
    closer_id: "close-credits",
    overlay_selector: ".credits-modal-overlay",
    show_delay_ms: None,
    hide_delay_ms: None,
    marks_opener_active: false,
    opener_toggles: false,
    closes_on_backdrop: false,
};

/// Visibility of a dialog as read from its inline `display` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Hidden,
    Open,
    /// Any other display value set by page styles.
    Other,
}

impl ModalPhase {
    pub fn from_display(display: &str) -> Self {
        match display.trim() {
            "" | "none" => ModalPhase::Hidden,
            "flex" => ModalPhase::Open,
            _ => ModalPhase::Other,
        }
    }

    pub fn toggle_opens(self) -> bool {
        self == ModalPhase::Hidden
    }

    pub fn escape_closes(self) -> bool {
        self == ModalPhase::Open
    }
}

/// True when the page URL asks for the scheduling dialog, as in `?meet=true`.
pub fn meet_requested(href: &str) -> bool {
    Url::parse(href)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "meet")
                .map(|(_, value)| value == "true")
        })
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct Modal {
    spec: ModalSpec,
    document: Document,
    container: HtmlElement,
    opener: Option<HtmlElement>,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl Modal {
    pub fn find(document: &Document, spec: ModalSpec) -> Option<Self> {
        let container = dom::by_id(document, spec.container_id)?;
        Some(Self {
            spec,
            document: document.clone(),
            container,
            opener: dom::by_id(document, spec.opener_id),
            pending: Rc::new(RefCell::new(None)),
        })
    }

    pub fn phase(&self) -> ModalPhase {
        ModalPhase::from_display(&dom::style_value(&self.container, "display"))
    }

    pub fn open(&self) {
        debug!("Opening {} modal", self.spec.name);
        dom::set_style(&self.container, "display", "flex");
        if self.spec.marks_opener_active {
            if let Some(opener) = &self.opener {
                dom::add_class(opener, "active");
            }
        }
        dom::lock_body_scroll(&self.document, true);

        match self.spec.show_delay_ms {
            Some(delay) => {
                let container = self.container.clone();
                self.defer(delay, move || dom::add_class(&container, "show"));
            }
            None => self.cancel_pending(),
        }
    }

    pub fn close(&self) {
        debug!("Closing {} modal", self.spec.name);
        dom::remove_class(&self.container, "show");
        if let Some(opener) = &self.opener {
            dom::remove_class(opener, "active");
        }
        dom::lock_body_scroll(&self.document, false);

        match self.spec.hide_delay_ms {
            Some(delay) => {
                let container = self.container.clone();
                self.defer(delay, move || dom::set_style(&container, "display", "none"));
            }
            None => {
                self.cancel_pending();
                dom::set_style(&self.container, "display", "none");
            }
        }
    }

    pub fn toggle(&self) {
        if self.phase().toggle_opens() {
            self.open();
        } else {
            self.close();
        }
    }

    // Replacing the handle drops the previous timeout, so a late hide can never
    // undo a reopen.
    fn defer(&self, delay: u32, f: impl FnOnce() + 'static) {
        let pending = Rc::clone(&self.pending);
        let timeout = Timeout::new(delay, move || {
            pending.borrow_mut().take();
            f();
        });
        *self.pending.borrow_mut() = Some(timeout);
    }

    fn cancel_pending(&self) {
        self.pending.borrow_mut().take();
    }

    /// Wires opener, closer, overlay and Escape for the lifetime of the page.
    pub fn bind(&self) {
        if let Some(opener) = &self.opener {
            let modal = self.clone();
            listen_prevented(opener, "click", move |_| {
                if modal.spec.opener_toggles {
                    modal.toggle();
                } else {
                    modal.open();
                }
            });
        }

        if let Some(closer) = dom::by_id(&self.document, self.spec.closer_id) {
            let modal = self.clone();
            listen_prevented(&closer, "click", move |_| modal.close());
        }

        if self.spec.closes_on_backdrop {
            let modal = self.clone();
            EventListener::new(&self.container, "click", move |event| {
                if modal.is_backdrop_click(event) {
                    modal.close();
                }
            })
            .forget();
        } else if let Some(overlay) = self.overlay() {
            let modal = self.clone();
            EventListener::new(&overlay, "click", move |_| modal.close()).forget();
        }

        let modal = self.clone();
        EventListener::new(&self.document, "keydown", move |event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .map(|event| event.key() == "Escape")
                .unwrap_or(false);
            if is_escape && modal.phase().escape_closes() {
                modal.close();
            }
        })
        .forget();
    }

    fn overlay(&self) -> Option<Element> {
        self.container
            .query_selector(self.spec.overlay_selector)
            .ok()
            .flatten()
            .or_else(|| dom::query(&self.document, self.spec.overlay_selector))
    }

    fn is_backdrop_click(&self, event: &Event) -> bool {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return false;
        };
        let container: &Element = &self.container;
        target == *container
            || target
                .class_list()
                .contains(self.spec.overlay_selector.trim_start_matches('.'))
    }
}

fn listen_prevented(target: &HtmlElement, event_type: &'static str, mut f: impl FnMut(&Event) + 'static) {
    EventListener::new_with_options(
        target,
        event_type,
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            event.prevent_default();
            f(event);
        },
    )
    .forget();
}

/// Caches the first successful lookup. Failed lookups are retried on the next
/// call, since the element may not be parsed yet.
struct Resolved<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T: Clone> Resolved<T> {
    fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    fn get_or_find(&self, find: impl FnOnce() -> Option<T>) -> Option<T> {
        if let Some(value) = self.slot.borrow().as_ref() {
            return Some(value.clone());
        }
        let found = find()?;
        *self.slot.borrow_mut() = Some(found.clone());
        Some(found)
    }
}

impl<T> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

/// The scheduling dialog, looked up when first needed so the exported
/// helpers work before the page finishes loading.
#[derive(Clone)]
pub struct Scheduling {
    document: Document,
    modal: Resolved<Modal>,
}

impl Scheduling {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
            modal: Resolved::new(),
        }
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
            .get_or_find(|| Modal::find(&self.document, SCHEDULING))
    }
}

/// Publishes `toggleCalendly` and `closeCalendly` for inline handlers.
pub fn export_scheduling(window: &Window, document: &Document) -> Scheduling {
    let scheduling = Scheduling::new(document);

    let toggle = scheduling.clone();
    dom::export_fn0(window, "toggleCalendly", move || match toggle.modal() {
        Some(modal) => modal.toggle(),
        None => error!("Calendly modal not found!"),
    });
    let close = scheduling.clone();
    dom::export_fn0(window, "closeCalendly", move || {
        if let Some(modal) = close.modal() {
            modal.close();
        }
    });

    scheduling
}

/// Binds every dialog found on the page.
pub fn init(window: &Window, document: &Document, scheduling: &Scheduling) {
    if let Some(modal) = scheduling.modal() {
        modal.bind();
        let href = window.location().href().unwrap_or_default();
        if meet_requested(&href) {
            Timeout::new(config::MEET_AUTO_OPEN_DELAY_MS, move || modal.toggle()).forget();
        }
    }

    if let Some(modal) = Modal::find(document, CONTACT) {
        modal.bind();
    }

    // The credits link only does something when both it and the dialog exist.
    if let Some(modal) = Modal::find(document, CREDITS).filter(|m| m.opener.is_some()) {
        modal.bind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_retried_until_found() {
        let resolved: Resolved<u32> = Resolved::new();
        assert_eq!(resolved.get_or_find(|| None), None);
        assert_eq!(resolved.get_or_find(|| Some(1)), Some(1));

        // Clones share the slot, and later lookups are skipped.
        let shared = resolved.clone();
        assert_eq!(shared.get_or_find(|| Some(2)), Some(1));
        assert_eq!(
            resolved.get_or_find(|| panic!("lookup after resolution")),
            Some(1)
        );
    }

    #[test]
    fn test_phase_from_display() {
        assert_eq!(ModalPhase::from_display(""), ModalPhase::Hidden);
        assert_eq!(ModalPhase::from_display("none"), ModalPhase::Hidden);
        assert_eq!(ModalPhase::from_display("flex"), ModalPhase::Open);
        assert_eq!(ModalPhase::from_display("block"), ModalPhase::Other);
    }

    #[test]
    fn test_toggle_only_opens_hidden_dialogs() {
        assert!(ModalPhase::Hidden.toggle_opens());
        assert!(!ModalPhase::Open.toggle_opens());
        assert!(!ModalPhase::Other.toggle_opens());
    }

    #[test]
    fn test_escape_only_closes_open_dialogs() {
        assert!(ModalPhase::Open.escape_closes());
        assert!(!ModalPhase::Hidden.escape_closes());
        assert!(!ModalPhase::Other.escape_closes());
    }

    #[test]
    fn test_meet_requested() {
        assert!(meet_requested("https://example.com/?meet=true"));
        assert!(meet_requested("https://example.com/es/?lang=es&meet=true#contact"));
        assert!(!meet_requested("https://example.com/?meet=false"));
        assert!(!meet_requested("https://example.com/?meet=TRUE"));
        assert!(!meet_requested("https://example.com/"));
        // First value wins, like URLSearchParams.get
        assert!(!meet_requested("https://example.com/?meet=no&meet=true"));
        assert!(!meet_requested("not a url"));
    }

    #[test]
    fn test_specs_use_site_ids() {
        assert_eq!(SCHEDULING.container_id, "calendly-modal");
        assert!(SCHEDULING.opener_toggles && SCHEDULING.marks_opener_active);
        assert_eq!(CONTACT.hide_delay_ms, Some(250));
        assert_eq!(CREDITS.show_delay_ms, None);
        for spec in [SCHEDULING, CONTACT, CREDITS] {
            assert!(spec.overlay_selector.starts_with('.'));
        }
    }
}
