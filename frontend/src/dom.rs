use gloo_events::EventListener;
use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Reflect;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

pub fn log_js_error(context: &str, err: &JsValue) {
    error!("{}: {:?}", context, err);
}

pub fn by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    query(document, selector).and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            log_js_error(&format!("Invalid selector {}", selector), &e);
            Vec::new()
        }
    }
}

/// Collects the element nodes of a `NodeList`, skipping text and comment nodes.
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn add_class(element: &Element, class: &str) {
    if let Err(e) = element.class_list().add_1(class) {
        log_js_error("Failed to add class", &e);
    }
}

pub fn remove_class(element: &Element, class: &str) {
    if let Err(e) = element.class_list().remove_1(class) {
        log_js_error("Failed to remove class", &e);
    }
}

pub fn toggle_class(element: &Element, class: &str) {
    if let Err(e) = element.class_list().toggle(class) {
        log_js_error("Failed to toggle class", &e);
    }
}

pub fn set_class(element: &Element, class: &str, enabled: bool) {
    if enabled {
        add_class(element, class);
    } else {
        remove_class(element, class);
    }
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log_js_error(&format!("Failed to set {}", property), &e);
    }
}

pub fn clear_style(element: &HtmlElement, property: &str) {
    if let Err(e) = element.style().remove_property(property) {
        log_js_error(&format!("Failed to clear {}", property), &e);
    }
}

pub fn style_value(element: &HtmlElement, property: &str) -> String {
    element.style().get_property_value(property).unwrap_or_default()
}

/// Stops the page behind an open dialog from scrolling.
pub fn lock_body_scroll(document: &Document, locked: bool) {
    if let Some(body) = document.body() {
        if locked {
            set_style(&body, "overflow", "hidden");
        } else {
            clear_style(&body, "overflow");
        }
    }
}

pub fn scroll_y(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

/// Reads a global like `window.JAAB_DEBUG` with JS truthiness.
pub fn window_flag(window: &Window, name: &str) -> bool {
    Reflect::get(window, &JsValue::from_str(name))
        .map(|value| value.is_truthy())
        .unwrap_or(false)
}

pub fn window_value(window: &Window, name: &str) -> JsValue {
    Reflect::get(window, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

/// Publishes a zero-argument function on `window` for inline `onclick` handlers.
pub fn export_fn0(window: &Window, name: &str, f: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    if let Err(e) = Reflect::set(window, &JsValue::from_str(name), closure.as_ref()) {
        log_js_error(&format!("Failed to export {}", name), &e);
    }
    closure.forget();
}

/// Publishes a function taking one string argument on `window`.
pub fn export_fn1(window: &Window, name: &str, f: impl FnMut(String) + 'static) {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(String)>);
    if let Err(e) = Reflect::set(window, &JsValue::from_str(name), closure.as_ref()) {
        log_js_error(&format!("Failed to export {}", name), &e);
    }
    closure.forget();
}

fn is_loading(document: &Document) -> bool {
    Reflect::get(document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .map(|state| state == "loading")
        .unwrap_or(false)
}

/// Runs `f` once the document has been parsed, right away if that already happened.
pub fn on_ready(document: &Document, f: impl FnOnce(&Document) + 'static) {
    if is_loading(document) {
        let doc = document.clone();
        EventListener::once(document, "DOMContentLoaded", move |_| f(&doc)).forget();
    } else {
        f(document);
    }
}
