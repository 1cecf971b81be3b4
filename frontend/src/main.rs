use std::rc::Rc;

use gloo_events::EventListener;
use log::info;
use web_sys::{Document, Window};

mod config;
mod dom;
mod external_links;
mod language;
mod components {
    pub mod carousel;
    pub mod modal;
    pub mod nav;
    pub mod sections;
}

use components::{carousel::CarouselAnimator, modal, nav, sections};

fn start_carousel(window: &Window, document: &Document) {
    let Some(carousel) = CarouselAnimator::mount(document) else {
        return;
    };
    carousel.start();

    // Pause while the page sits in the back/forward cache.
    let hidden = Rc::clone(&carousel);
    EventListener::new(window, "pagehide", move |_| hidden.stop()).forget();
    EventListener::new(window, "pageshow", move |_| carousel.start()).forget();
}

fn init_page(window: &Window, document: &Document, scheduling: &modal::Scheduling) {
    info!("Wiring page behaviour");
    modal::init(window, document, scheduling);
    nav::init(window, document);
    language::init(window, document);
    sections::reveal_on_scroll(document);
    start_carousel(window, document);
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::get_log_level()).expect("error initializing log");

    info!("Starting site scripts");
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // Inline onclick handlers may fire before the DOM is fully parsed.
    sections::export_toggles(&window, &document);
    let scheduling = modal::export_scheduling(&window, &document);
    external_links::init(&window, &document);

    dom::on_ready(&document, move |document| {
        init_page(&window, document, &scheduling)
    });
}
