use std::collections::BTreeMap;

use gloo_events::{EventListener, EventListenerOptions};
use log::{debug, info, warn};
use serde::Deserialize;
use web_sys::{Document, Element, Window};

use crate::config;
use crate::dom;

pub const LANGUAGES: [&str; 3] = ["es", "en", "pt"];

/// URLs of one page in each language the site is published in.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageVariants {
    pub es: Option<String>,
    pub en: Option<String>,
    pub pt: Option<String>,
}

impl PageVariants {
    pub fn url_for(&self, lang: &str) -> Option<&str> {
        match lang {
            "es" => self.es.as_deref(),
            "en" => self.en.as_deref(),
            "pt" => self.pt.as_deref(),
            _ => None,
        }
    }

    fn contains(&self, path: &str) -> bool {
        LANGUAGES.iter().any(|lang| self.url_for(lang) == Some(path))
    }
}

/// Translated page URLs published by the site generator as `window.pageMappings`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageMappings {
    #[serde(default)]
    pub solutions: BTreeMap<String, PageVariants>,
}

impl PageMappings {
    pub fn page_for(&self, path: &str) -> Option<&PageVariants> {
        self.solutions.values().find(|variants| variants.contains(path))
    }

    fn from_window(window: &Window) -> Self {
        let value = dom::window_value(window, "pageMappings");
        if value.is_undefined() || value.is_null() {
            return Self::default();
        }
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
            warn!("Ignoring malformed pageMappings: {}", e);
            Self::default()
        })
    }
}

/// Where a language link should go from the current page.
///
/// A mapped page jumps to its own translation. Anything else goes to the
/// link's home page and keeps the current `#section`.
pub fn resolve_target(
    mappings: &PageMappings,
    current_path: &str,
    current_hash: &str,
    lang: Option<&str>,
    href: &str,
) -> String {
    lang.and_then(|lang| mappings.page_for(current_path)?.url_for(lang))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", href, current_hash))
}

pub fn init(window: &Window, document: &Document) {
    for link in dom::query_all(document, ".lang-switch-link") {
        let win = window.clone();
        let anchor = link.clone();
        EventListener::new_with_options(
            &link,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                switch_language(&win, &anchor);
            },
        )
        .forget();
    }
}

fn switch_language(window: &Window, link: &Element) {
    let lang = link.get_attribute("data-lang");
    let href = link.get_attribute("href").unwrap_or_default();
    let location = window.location();
    let current_path = location.pathname().unwrap_or_default();
    let current_hash = location.hash().unwrap_or_default();

    if let Some(lang) = &lang {
        match window.local_storage() {
            Ok(Some(storage)) => {
                if let Err(e) = storage.set_item(config::PREFERRED_LANG_KEY, lang) {
                    dom::log_js_error("Failed to store preferred language", &e);
                }
            }
            _ => debug!("localStorage unavailable, language preference not stored"),
        }
    }

    let mappings = PageMappings::from_window(window);
    let target = resolve_target(&mappings, &current_path, &current_hash, lang.as_deref(), &href);
    info!("Switching language to {:?}: {}", lang, target);
    if let Err(e) = location.set_href(&target) {
        dom::log_js_error("Failed to navigate", &e);
    }
}
