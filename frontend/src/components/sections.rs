use log::{debug, error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{
    Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use crate::config;
use crate::dom;

/// Expands or collapses a card body and marks its card as active.
///
/// Returns false when the body or its card could not be found.
pub fn toggle_expandable(document: &Document, content_id: &str, card_selector: &str) -> bool {
    let Some(content) = document.get_element_by_id(content_id) else {
        error!("Could not find element with ID: {}", content_id);
        return false;
    };
    let Some(card) = content.closest(card_selector).ok().flatten() else {
        error!("Could not find parent {} for: {}", card_selector, content_id);
        return false;
    };

    dom::toggle_class(&content, "show");
    dom::toggle_class(&card, "active");
    true
}

/// Exports `toggleService` and `toggleTechCategory` for inline handlers.
pub fn export_toggles(window: &Window, document: &Document) {
    let doc = document.clone();
    dom::export_fn1(window, "toggleService", move |id| {
        toggle_expandable(&doc, &id, ".service-card");
    });
    let doc = document.clone();
    dom::export_fn1(window, "toggleTechCategory", move |id| {
        toggle_expandable(&doc, &id, ".tech-category");
    });
}

/// Adds `animate-in` to each landing section the first time it scrolls into view.
pub fn reveal_on_scroll(document: &Document) {
    let sections = dom::query_all(document, config::REVEAL_SECTIONS);
    if sections.is_empty() {
        return;
    }

    let callback = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.is_intersecting() {
                dom::add_class(&entry.target(), "animate-in");
            }
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config::REVEAL_THRESHOLD));
    options.set_root_margin(config::REVEAL_ROOT_MARGIN);

    let observer = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
        Ok(observer) => observer,
        Err(e) => {
            dom::log_js_error("IntersectionObserver unavailable", &e);
            return;
        }
    };
    callback.forget();

    for section in &sections {
        observer.observe(section);
    }
    debug!("Watching {} sections for reveal", sections.len());
}
