//! Marks links to other sites so the stylesheet can draw an external-link icon.
//!
//! External anchors also open in a new tab (unless the author chose a target)
//! and always carry `rel="noopener noreferrer"`. Anchors inserted after load
//! are picked up through a `MutationObserver`.

use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord, Node, Window};

use crate::config;
use crate::dom;

pub fn is_external(href: &str, origin: &str) -> bool {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href == "javascript:void(0)"
    {
        return false;
    }

    let Ok(base) = Url::parse(origin) else {
        return false;
    };
    match base.join(href) {
        Ok(url) => url.origin() != base.origin(),
        Err(_) => false,
    }
}

/// Adds `noopener` and `noreferrer` to a `rel` value, keeping existing tokens.
pub fn merge_rel(rel: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for token in rel
        .split_whitespace()
        .chain(["noopener", "noreferrer"])
    {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens.join(" ")
}

#[derive(Clone)]
struct Marker {
    origin: String,
    debug: bool,
}

impl Marker {
    fn process(&self, anchor: &Element) {
        if anchor.has_attribute("data-no-external") {
            return;
        }
        let Some(href) = anchor.get_attribute("href") else {
            return;
        };
        if !is_external(&href, &self.origin) {
            return;
        }

        let class_list = anchor.class_list();
        if !class_list.contains("external-link") {
            dom::add_class(anchor, "external-link");
            if self.debug {
                gloo_console::debug!("Marked external link:", href.clone());
            }
        }

        if !anchor.has_attribute("target") && !anchor.has_attribute("data-preserve-target") {
            self.set(anchor, "target", "_blank");
        }
        let rel = anchor.get_attribute("rel").unwrap_or_default();
        self.set(anchor, "rel", &merge_rel(&rel));
    }

    fn set(&self, anchor: &Element, name: &str, value: &str) {
        if let Err(e) = anchor.set_attribute(name, value) {
            if self.debug {
                gloo_console::debug!("Failed to set attribute", e);
            }
        }
    }

    fn scan(&self, root: &Element) {
        match root.query_selector_all("a[href]") {
            Ok(list) => dom::elements(&list).iter().for_each(|a| self.process(a)),
            Err(e) => {
                if self.debug {
                    gloo_console::debug!("Anchor scan failed", e);
                }
            }
        }
    }

    fn process_added(&self, node: Node) {
        if node.node_type() != Node::ELEMENT_NODE {
            return;
        }
        let Ok(element) = node.dyn_into::<Element>() else {
            return;
        };
        if element.tag_name().eq_ignore_ascii_case("a") {
            self.process(&element);
        } else {
            self.scan(&element);
        }
    }
}

/// Marks current anchors once the DOM is ready and watches for new ones.
pub fn init(window: &Window, document: &Document) {
    let marker = Marker {
        origin: window.location().origin().unwrap_or_default(),
        debug: dom::window_flag(window, config::DEBUG_FLAG),
    };

    let initial = marker.clone();
    dom::on_ready(document, move |document| {
        if let Some(root) = document.document_element() {
            initial.scan(&root);
        }
    });

    let debug = marker.debug;
    let callback = Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
        for record in records.iter() {
            let Ok(record) = record.dyn_into::<MutationRecord>() else {
                continue;
            };
            let added = record.added_nodes();
            for i in 0..added.length() {
                if let Some(node) = added.get(i) {
                    marker.process_added(node);
                }
            }
        }
    }) as Box<dyn FnMut(Array, MutationObserver)>);

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(e) => {
            if debug {
                gloo_console::debug!("MutationObserver failed to observe:", e);
            }
            return;
        }
    };
    callback.forget();

    let Some(root) = document
        .document_element()
        .map(Node::from)
        .or_else(|| document.body().map(Node::from))
    else {
        return;
    };
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    if let Err(e) = observer.observe_with_options(&root, &options) {
        if debug {
            gloo_console::debug!("MutationObserver failed to observe:", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://jaab.example";

    #[test]
    fn test_other_origins_are_external() {
        assert!(is_external("https://github.com/jaab", ORIGIN));
        assert!(is_external("http://jaab.example/", ORIGIN));
        assert!(is_external("https://jaab.example:8443/", ORIGIN));
        assert!(is_external("//cdn.example.org/lib.js", ORIGIN));
    }

    #[test]
    fn test_same_origin_is_internal() {
        assert!(!is_external("/en/solutions/", ORIGIN));
        assert!(!is_external("about/", ORIGIN));
        assert!(!is_external("https://jaab.example/blog/", ORIGIN));
        assert!(!is_external("  https://jaab.example/  ", ORIGIN));
    }

    #[test]
    fn test_hooks_and_special_schemes_are_skipped() {
        for href in ["", "   ", "#contact", "mailto:hola@jaab.example", "tel:+34900000000", "javascript:void(0)"] {
            assert!(!is_external(href, ORIGIN), "{href:?} should not be external");
        }
    }

    #[test]
    fn test_unusable_origin_is_never_external() {
        assert!(!is_external("https://github.com/", ""));
    }

    #[test]
    fn test_merge_rel_adds_safe_tokens_once() {
        assert_eq!(merge_rel(""), "noopener noreferrer");
        assert_eq!(merge_rel("nofollow"), "nofollow noopener noreferrer");
        assert_eq!(merge_rel("  noreferrer   nofollow "), "noreferrer nofollow noopener");
        assert_eq!(merge_rel("noopener noreferrer"), "noopener noreferrer");
    }
}
