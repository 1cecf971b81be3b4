use log::Level;

#[cfg(debug_assertions)]
pub fn get_log_level() -> Level {
    Level::Debug  // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_log_level() -> Level {
    Level::Info
}

// Carousel
pub const CAROUSEL_BASE_SPEED: f64 = 0.5; // px per frame
pub const CAROUSEL_OVERRIDE_SPEED: f64 = 2.0;
pub const CAROUSEL_CARD_WIDTH: f64 = 400.0; // matches .insight-card in the stylesheet
pub const CAROUSEL_GAP: f64 = 32.0; // 2rem

// Scroll thresholds in px
pub const NAVBAR_SCROLLED_AFTER: f64 = 100.0;
pub const BACK_TO_TOP_AFTER: f64 = 300.0;

// Delays in ms
pub const MODAL_SHOW_DELAY_MS: u32 = 10;
pub const SCHEDULING_HIDE_DELAY_MS: u32 = 300;
pub const CONTACT_HIDE_DELAY_MS: u32 = 250;
pub const MEET_AUTO_OPEN_DELAY_MS: u32 = 300;

pub const PREFERRED_LANG_KEY: &str = "jaab_preferred_lang";
pub const DEBUG_FLAG: &str = "JAAB_DEBUG";

pub const REVEAL_SECTIONS: &str = ".identity-hero, .services-section, .solutions-section, .insights-section, .about-section, .contact-section";
pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
