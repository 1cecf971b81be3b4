//! Continuously scrolling insights carousel.
//!
//! The track holds every card twice: the originals followed by an identical
//! copy. The track is translated left a little every animation frame and,
//! once it has moved by exactly one copy's width, snapped back by that width.
//! Because the copy looks identical the snap is invisible and the strip appears
//! to scroll forever.
//!
//! [`CarouselState`] holds the motion rules and never touches the DOM;
//! [`CarouselAnimator`] binds it to the page and drives it from
//! `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_render::{request_animation_frame, AnimationFrame};
use log::{debug, info, warn};
use thiserror::Error;
use web_sys::{Document, Element, EventTarget, HtmlElement};

use crate::config;
use crate::dom;

#[derive(Debug, Error, PartialEq)]
pub enum CarouselError {
    #[error("track has {0} items, expected a non-zero even count")]
    UnevenTrack(u32),
    #[error("carousel width must be positive and finite, got {0}")]
    InvalidWidth(f64),
}

/// Widths that decide where the track wraps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselGeometry {
    item_full_width: f64,
    loop_width: f64,
}

impl CarouselGeometry {
    /// `total_items` counts the duplicated half too, so it has to be even.
    pub fn new(item_width: f64, gap: f64, total_items: u32) -> Result<Self, CarouselError> {
        if total_items == 0 || total_items % 2 != 0 {
            return Err(CarouselError::UnevenTrack(total_items));
        }
        let item_full_width = item_width + gap;
        Self::from_widths(item_full_width, f64::from(total_items / 2) * item_full_width)
    }

    pub fn from_widths(item_full_width: f64, loop_width: f64) -> Result<Self, CarouselError> {
        for width in [item_full_width, loop_width] {
            if !width.is_finite() || width <= 0.0 {
                return Err(CarouselError::InvalidWidth(width));
            }
        }
        Ok(Self {
            item_full_width,
            loop_width,
        })
    }

    /// One card plus the gap after it.
    pub fn item_full_width(&self) -> f64 {
        self.item_full_width
    }

    /// Width of the original cards without their copies.
    pub fn loop_width(&self) -> f64 {
        self.loop_width
    }
}

/// Arrow controls on either side of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Offset and speed of the track.
///
/// The offset stays in `(-loop_width, 0]` after every [`tick`](Self::tick).
#[derive(Debug, Clone)]
pub struct CarouselState {
    geometry: CarouselGeometry,
    offset: f64,
    base_speed: f64,
    arrow_speed: f64,
    override_speed: f64,
    is_hovered: bool,
}

impl CarouselState {
    pub fn new(geometry: CarouselGeometry) -> Self {
        Self {
            geometry,
            offset: 0.0,
            base_speed: config::CAROUSEL_BASE_SPEED,
            arrow_speed: config::CAROUSEL_OVERRIDE_SPEED,
            override_speed: 0.0,
            is_hovered: false,
        }
    }

    #[cfg(test)]
    fn with_speeds(geometry: CarouselGeometry, base_speed: f64, arrow_speed: f64) -> Self {
        Self {
            base_speed,
            arrow_speed,
            ..Self::new(geometry)
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn geometry(&self) -> CarouselGeometry {
        self.geometry
    }

    /// Pixels the track moves left on the next frame.
    ///
    /// Hovering the track pauses it, but a hovered arrow wins over the pause.
    pub fn effective_speed(&self) -> f64 {
        if self.override_speed != 0.0 {
            self.override_speed
        } else if self.is_hovered {
            0.0
        } else {
            self.base_speed
        }
    }

    /// Advances one frame and returns the new offset.
    pub fn tick(&mut self) -> f64 {
        self.offset -= self.effective_speed();

        let loop_width = self.geometry.loop_width;
        if self.offset <= -loop_width {
            self.offset += loop_width;
        } else if self.offset > 0.0 {
            self.offset -= loop_width;
        }
        self.offset
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.is_hovered = hovered;
    }

    /// Hovering an arrow drives the track towards it at arrow speed.
    pub fn set_override(&mut self, direction: Direction) {
        self.override_speed = match direction {
            Direction::Prev => -self.arrow_speed,
            Direction::Next => self.arrow_speed,
        };
    }

    pub fn clear_override(&mut self) {
        self.override_speed = 0.0;
    }

    /// Skips a whole card. Only the bound the jump can cross is corrected.
    pub fn jump(&mut self, direction: Direction) {
        let CarouselGeometry {
            item_full_width,
            loop_width,
        } = self.geometry;

        match direction {
            Direction::Prev => {
                self.offset += item_full_width;
                if self.offset > 0.0 {
                    self.offset -= loop_width;
                }
            }
            Direction::Next => {
                self.offset -= item_full_width;
                if self.offset <= -loop_width {
                    self.offset += loop_width;
                }
            }
        }
    }

    /// CSS transform for the current offset.
    pub fn transform(&self) -> String {
        format!("translateX({}px)", self.offset)
    }

    #[cfg(test)]
    fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

/// Drives a [`CarouselState`] against the `.insights-track` element.
pub struct CarouselAnimator {
    track: HtmlElement,
    state: RefCell<CarouselState>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl CarouselAnimator {
    /// Binds to the page's carousel. Returns `None` when the page has none.
    pub fn mount(document: &Document) -> Option<Rc<Self>> {
        let (Some(track), Some(prev), Some(next)) = (
            dom::query_html(document, ".insights-track"),
            dom::query(document, ".prev-control"),
            dom::query(document, ".next-control"),
        ) else {
            debug!("No carousel on this page");
            return None;
        };

        let total_items = track.children().length();
        let geometry = match CarouselGeometry::new(
            config::CAROUSEL_CARD_WIDTH,
            config::CAROUSEL_GAP,
            total_items,
        ) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!("Carousel disabled: {}", e);
                return None;
            }
        };

        let animator = Rc::new(Self {
            track,
            state: RefCell::new(CarouselState::new(geometry)),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        animator.install_listeners(&prev, &next);
        info!(
            "Carousel mounted with {} cards, loop width {}px",
            total_items,
            animator.state.borrow().geometry().loop_width()
        );
        Some(animator)
    }

    pub fn is_running(&self) -> bool {
        self.frame.borrow().is_some()
    }

    pub fn start(self: &Rc<Self>) {
        if self.is_running() {
            return;
        }
        debug!("Carousel started");
        self.schedule_frame();
    }

    /// Cancels the pending frame. The offset is kept for a later `start`.
    pub fn stop(&self) {
        if self.frame.borrow_mut().take().is_some() {
            debug!("Carousel stopped");
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        let animator = Rc::clone(self);
        let handle = request_animation_frame(move |_timestamp| {
            animator.frame.borrow_mut().take();
            animator.render_frame();
            animator.schedule_frame();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn render_frame(&self) {
        let transform = {
            let mut state = self.state.borrow_mut();
            state.tick();
            state.transform()
        };
        dom::set_style(&self.track, "transform", &transform);
    }

    fn install_listeners(self: &Rc<Self>, prev: &Element, next: &Element) {
        let listeners = vec![
            self.listen(&self.track, "mouseenter", |state| state.set_hovered(true)),
            self.listen(&self.track, "mouseleave", |state| state.set_hovered(false)),
            self.listen(prev, "mouseenter", |state| state.set_override(Direction::Prev)),
            self.listen(prev, "mouseleave", CarouselState::clear_override),
            self.listen(next, "mouseenter", |state| state.set_override(Direction::Next)),
            self.listen(next, "mouseleave", CarouselState::clear_override),
            self.listen(prev, "click", |state| state.jump(Direction::Prev)),
            self.listen(next, "click", |state| state.jump(Direction::Next)),
        ];
        *self.listeners.borrow_mut() = listeners;
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        event_type: &'static str,
        apply: impl Fn(&mut CarouselState) + 'static,
    ) -> EventListener {
        let animator: Weak<Self> = Rc::downgrade(self);
        EventListener::new(target, event_type, move |_| {
            if let Some(animator) = animator.upgrade() {
                apply(&mut animator.state.borrow_mut());
            }
        })
    }
}
