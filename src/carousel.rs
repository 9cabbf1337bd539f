//! Indexed slide state machine shared by the hero slideshow and the photo
//! gallery.
//!
//! ## States
//!
//! ```text
//!            N = 0
//!   new ───────────────▶ Inert (terminal, every call is a no-op)
//!    │
//!    │ N > 0: mark slide 0, start()
//!    ▼
//!  Running ◀── start() ── Stopped
//!     └────── stop() ───────▶
//! ```
//!
//! `Running` means an auto-play tick is armed. A carousel with a single slide,
//! with auto-play disabled, or with a zero interval never arms one and stays
//! `Stopped`. Index moves (`next`, `previous`, `go_to`) work in both states and
//! leave the play state alone.
//!
//! ## User input
//!
//! [`Carousel::dispatch`] is the entry point for controls. Navigation through
//! it (arrow buttons, indicator dots, arrow keys) restarts auto-play after
//! moving, so a manual step is never followed by an early automatic one.
//! Pointer enter/leave pause and resume auto-play when `pause_on_hover` is on.
//! Arrow keys only act while the pointer is over the carousel.
//!
//! ## Markers
//!
//! Each index change clears the previous slide's active marker and sets the
//! new one. Indicators follow only when their count equals the slide count;
//! a mismatched indicator set is left alone.

use crate::config::CarouselConfig;
use crate::timer::{Clock, TimerId, TimerQueue};
use crate::view::CarouselView;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// No slides, or torn down.
    Inert,
    Stopped,
    Running,
}

/// Control input routed to a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselInput {
    Next,
    Previous,
    /// Indicator dot or thumbnail click.
    Select(usize),
    PointerEnter,
    PointerLeave,
    ArrowLeft,
    ArrowRight,
}

pub struct Carousel<V, C> {
    name: String,
    view: V,
    clock: C,
    config: CarouselConfig,
    len: usize,
    index: usize,
    state: PlayState,
    hovered: bool,
    timers: TimerQueue<()>,
    tick: Option<TimerId>,
}

impl<V: CarouselView, C: Clock> Carousel<V, C> {
    /// Build a carousel over the slides the view reports right now.
    ///
    /// The slide count is fixed from here on. With at least one slide the
    /// first is marked active and auto-play starts.
    pub fn new(name: impl Into<String>, view: V, clock: C, config: CarouselConfig) -> Self {
        let len = view.slide_count();
        let mut carousel = Self {
            name: name.into(),
            view,
            clock,
            config,
            len,
            index: 0,
            state: if len == 0 {
                PlayState::Inert
            } else {
                PlayState::Stopped
            },
            hovered: false,
            timers: TimerQueue::new(),
            tick: None,
        };
        if len == 0 {
            debug!(carousel = %carousel.name, "no slides, carousel inert");
            return carousel;
        }
        carousel.mark_initial();
        carousel.start();
        carousel
    }

    fn mark_initial(&mut self) {
        for i in 0..self.len {
            self.view.set_slide_active(i, i == 0);
        }
        if self.indicators_track_slides() {
            for i in 0..self.len {
                self.view.set_indicator_active(i, i == 0);
            }
        }
        self.view.show_position(0, self.len);
    }

    fn indicators_track_slides(&self) -> bool {
        self.view.indicator_count() == self.len
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayState::Running
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// When the armed auto-play tick is due, if any.
    pub fn next_tick(&self) -> Option<Duration> {
        self.tick.and_then(|id| self.timers.deadline(id))
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.show((self.index + 1) % self.len);
    }

    pub fn previous(&mut self) {
        if self.len == 0 {
            return;
        }
        self.show((self.index + self.len - 1) % self.len);
    }

    /// Move to `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.show(index);
        } else {
            trace!(carousel = %self.name, index, len = self.len, "go_to out of range ignored");
        }
    }

    fn show(&mut self, index: usize) {
        if self.state == PlayState::Inert || index == self.index {
            return;
        }
        let previous = self.index;
        self.view.set_slide_active(previous, false);
        self.view.set_slide_active(index, true);
        if self.indicators_track_slides() {
            self.view.set_indicator_active(previous, false);
            self.view.set_indicator_active(index, true);
        }
        self.index = index;
        self.view.show_position(index, self.len);
        debug!(carousel = %self.name, from = previous, to = index, "slide changed");
    }

    /// Arm the auto-play tick one interval from now, replacing any armed tick.
    pub fn start(&mut self) {
        if self.state == PlayState::Inert {
            return;
        }
        self.cancel_tick();
        let interval = self.config.interval();
        if !self.config.autoplay || self.len <= 1 || interval.is_zero() {
            self.state = PlayState::Stopped;
            return;
        }
        let deadline = self.clock.elapsed() + interval;
        self.tick = Some(self.timers.schedule_at(deadline, ()));
        self.state = PlayState::Running;
        trace!(carousel = %self.name, ?deadline, "auto-play armed");
    }

    /// Cancel the auto-play tick. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if self.state == PlayState::Inert {
            return;
        }
        self.cancel_tick();
        self.state = PlayState::Stopped;
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.tick.take() {
            self.timers.cancel(id);
        }
    }

    fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Apply a user control.
    pub fn dispatch(&mut self, input: CarouselInput) {
        if self.state == PlayState::Inert {
            return;
        }
        match input {
            CarouselInput::Next => {
                self.next();
                self.restart();
            }
            CarouselInput::Previous => {
                self.previous();
                self.restart();
            }
            CarouselInput::Select(index) => {
                self.go_to(index);
                self.restart();
            }
            CarouselInput::PointerEnter => {
                self.hovered = true;
                if self.config.pause_on_hover {
                    self.stop();
                }
            }
            CarouselInput::PointerLeave => {
                self.hovered = false;
                if self.config.pause_on_hover {
                    self.start();
                }
            }
            CarouselInput::ArrowLeft if self.accepts_keys() => {
                self.previous();
                self.restart();
            }
            CarouselInput::ArrowRight if self.accepts_keys() => {
                self.next();
                self.restart();
            }
            CarouselInput::ArrowLeft | CarouselInput::ArrowRight => {}
        }
    }

    fn accepts_keys(&self) -> bool {
        self.config.keyboard && self.hovered
    }

    /// Fire every auto-play tick due by now. Returns how many fired.
    ///
    /// Each fired tick re-arms one interval after its own deadline, so a host
    /// that polls late still sees one advance per elapsed interval.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.elapsed();
        let mut fired = 0;
        while let Some((id, deadline, ())) = self.timers.pop_due(now) {
            if self.tick != Some(id) {
                continue;
            }
            self.tick = Some(
                self.timers
                    .schedule_at(deadline + self.config.interval(), ()),
            );
            self.next();
            fired += 1;
        }
        fired
    }

    /// Cancel all timers and make the carousel inert.
    pub fn shutdown(&mut self) {
        self.timers.clear();
        self.tick = None;
        self.state = PlayState::Inert;
        debug!(carousel = %self.name, "carousel shut down");
    }
}
