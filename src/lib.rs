//! # Trilha
//!
//! The interactive core of an outdoor-adventure brochure site: the hero
//! slideshow, the adventure photo gallery, and the search/filter over the
//! downloads catalog. Markup, styling and the server are somebody else's
//! problem; this crate owns the state machines and their timing.
//!
//! # Architecture: Engines Behind View Traits
//!
//! Each page region is driven by an engine that never touches markup. It reads
//! counts from, and writes markers to, a small view trait:
//!
//! ```text
//! user input ──▶ Carousel ──────▶ CarouselView   (active slide, indicators, counter)
//!                    ▲
//!      Clock ────────┤
//!                    ▼
//! user input ──▶ CatalogFilter ─▶ CatalogView    (layout/reveal per entry, status line)
//! ```
//!
//! Engines share nothing and never talk to each other. The host calls
//! `poll()` when the clock may have passed a deadline; due timers fire in
//! deadline order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`timer`] | `Clock` trait, system and manual clocks, cancellable `TimerQueue` |
//! | [`carousel`] | Indexed slide state machine with auto-play and hover pause |
//! | [`catalog`] | Catalog entries, TOML loading, normalization, the filter predicate |
//! | [`filter`] | Catalog filter engine: debounced search, two-phase show/hide |
//! | [`status`] | Results line text and tone |
//! | [`view`] | View traits plus in-memory recording views |
//! | [`config`] | Layered `config.toml` loading, merging, and validation |
//! | [`scenario`] | Scripted page visits replayed under a manual clock |
//! | [`reset`] | Password-reset request contract and form state |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Time Is Injected
//!
//! Engines read time through [`timer::Clock`] and keep their own
//! [`timer::TimerQueue`]. Tests and scenario replay drive a
//! [`timer::ManualClock`], so every debounce and fade is asserted to the
//! millisecond without sleeping. Timers are cancel-and-reschedule: a new
//! debounce replaces the pending one, and a new show/hide for an entry
//! replaces that entry's pending phase.
//!
//! ## Literal Search By Default
//!
//! Search is a lower-cased substring test, so `seguranca` does not find
//! `Segurança`. Sites that want accent-insensitive search turn on
//! `catalog.fold_diacritics`.
//!
//! ## Unknown Categories Match Nothing
//!
//! A category slug is compared with strict equality. Selecting a slug no entry
//! carries empties the grid and reports `Nenhum item nesta categoria`, rather
//! than silently falling back to showing everything.

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod output;
pub mod reset;
pub mod scenario;
pub mod status;
pub mod timer;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
