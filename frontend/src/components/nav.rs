use gloo_events::{EventListener, EventListenerOptions};
use log::debug;
use web_sys::{Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollToOptions, Window};

use crate::config;
use crate::dom;

pub fn navbar_scrolled(scroll_y: f64) -> bool {
    scroll_y > config::NAVBAR_SCROLLED_AFTER
}

pub fn back_to_top_visible(scroll_y: f64) -> bool {
    scroll_y > config::BACK_TO_TOP_AFTER
}

pub fn init(window: &Window, document: &Document) {
    let navbar = dom::query(document, ".navbar");
    mobile_menu(document, navbar.clone());
    if let Some(navbar) = navbar {
        scroll_state(window, navbar);
    }
    smooth_anchors(document);
    back_to_top(window, document);
}

fn mobile_menu(document: &Document, navbar: Option<Element>) {
    let toggle = dom::query(document, ".mobile-menu-toggle");

    if let (Some(toggle), Some(navbar)) = (&toggle, &navbar) {
        let navbar = navbar.clone();
        let button = toggle.clone();
        EventListener::new(toggle, "click", move |_| {
            dom::toggle_class(&navbar, "mobile-menu-open");
            dom::toggle_class(&button, "active");
        })
        .forget();
    }

    for link in dom::query_all(document, ".nav-links a, .language-switcher a") {
        let navbar = navbar.clone();
        let toggle = toggle.clone();
        EventListener::new(&link, "click", move |_| {
            if let Some(navbar) = &navbar {
                dom::remove_class(navbar, "mobile-menu-open");
            }
            if let Some(toggle) = &toggle {
                dom::remove_class(toggle, "active");
            }
        })
        .forget();
    }
}

fn scroll_state(window: &Window, navbar: Element) {
    let win = window.clone();
    EventListener::new(window, "scroll", move |_| {
        dom::set_class(&navbar, "scrolled", navbar_scrolled(dom::scroll_y(&win)));
    })
    .forget();
}

fn smooth_anchors(document: &Document) {
    for link in dom::query_all(document, "a[href^=\"#\"]") {
        let doc = document.clone();
        let anchor = link.clone();
        EventListener::new_with_options(
            &link,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                let Some(href) = anchor.get_attribute("href") else {
                    return;
                };
                // A bare "#" is not a valid selector; query just yields nothing.
                if let Some(target) = dom::query(&doc, &href) {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    target.scroll_into_view_with_scroll_into_view_options(&options);
                } else {
                    debug!("No anchor target for {}", href);
                }
            },
        )
        .forget();
    }
}

fn back_to_top(window: &Window, document: &Document) {
    let Some(button) = dom::by_id(document, "back-to-top") else {
        return;
    };

    let update = {
        let win = window.clone();
        let button = button.clone();
        move || dom::set_class(&button, "visible", back_to_top_visible(dom::scroll_y(&win)))
    };
    update();
    EventListener::new(window, "scroll", move |_| update()).forget();

    let win = window.clone();
    EventListener::new(&button, "click", move |_| {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
    })
    .forget();
}
