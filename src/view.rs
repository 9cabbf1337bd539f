//! View contracts and in-memory views.
//!
//! Engines never touch markup. They read counts and write markers through
//! [`CarouselView`] and [`CatalogView`]; the page host implements those over
//! its real elements. [`SlideStrip`] and [`CatalogGrid`] are the in-memory
//! implementations used by scenario replay and tests: they keep the current
//! marker state and an append-only log of every write, drained with
//! `take_events()`.

use crate::catalog::{Catalog, Category};
use crate::status::{Status, Tone};
use serde::Serialize;

/// What a carousel engine reads from and writes to its page region.
pub trait CarouselView {
    fn slide_count(&self) -> usize;

    /// Indicator dots. Updated only when this equals `slide_count()`.
    fn indicator_count(&self) -> usize;

    fn set_slide_active(&mut self, index: usize, active: bool);

    fn set_indicator_active(&mut self, index: usize, active: bool);

    /// Called after every index change so a gallery can update its main
    /// photo and its "3 / 8" counter.
    fn show_position(&mut self, _index: usize, _total: usize) {}
}

/// What the catalog filter reads from and writes to the downloads page.
///
/// Showing an entry is `set_in_layout(true)` then, after a delay,
/// `set_revealed(true)`. Hiding is `set_revealed(false)` then, after a delay,
/// `set_in_layout(false)`.
pub trait CatalogView {
    /// False when the page has no catalog grid; the engine then stays inert.
    fn has_container(&self) -> bool {
        true
    }

    /// Entry takes part in layout (`display`) and drops its hidden marker.
    fn set_in_layout(&mut self, index: usize, in_layout: bool);

    /// Entry is opaque and in place, as opposed to faded and displaced.
    fn set_revealed(&mut self, index: usize, revealed: bool);

    fn set_status(&mut self, status: &Status);

    fn set_active_category(&mut self, _category: &Category) {}

    fn set_search_text(&mut self, _text: &str) {}

    /// Searching marker on the field and visibility of the clear button.
    fn set_search_cues(&mut self, _active: bool) {}

    fn focus_search(&mut self, _select: bool) {}

    fn blur_search(&mut self) {}

    fn is_search_focused(&self) -> bool {
        false
    }
}

/// One recorded view write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ViewEvent {
    Slide { index: usize, active: bool },
    Indicator { index: usize, active: bool },
    Position { index: usize, total: usize },
    Layout { entry: String, in_layout: bool },
    Reveal { entry: String, revealed: bool },
    Status { text: String, tone: Tone },
    Category { slug: String },
    SearchText { text: String },
    SearchCues { active: bool },
    Focus { select: bool },
    Blur,
}

// ============================================================================
// Slides
// ============================================================================

/// In-memory slide and indicator markers.
#[derive(Debug, Clone, Default)]
pub struct SlideStrip {
    slides: Vec<bool>,
    indicators: Vec<bool>,
    position: Option<(usize, usize)>,
    events: Vec<ViewEvent>,
}

impl SlideStrip {
    pub fn new(slides: usize, indicators: usize) -> Self {
        Self {
            slides: vec![false; slides],
            indicators: vec![false; indicators],
            position: None,
            events: Vec::new(),
        }
    }

    /// Indices of slides currently marked active.
    pub fn active_slides(&self) -> Vec<usize> {
        marked(&self.slides)
    }

    pub fn active_indicators(&self) -> Vec<usize> {
        marked(&self.indicators)
    }

    /// Last `(index, total)` reported, as the gallery counter would show it.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

fn marked(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, on)| on.then_some(i))
        .collect()
}

impl CarouselView for SlideStrip {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    fn set_slide_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.slides.get_mut(index) {
            *slot = active;
            self.events.push(ViewEvent::Slide { index, active });
        }
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = active;
            self.events.push(ViewEvent::Indicator { index, active });
        }
    }

    fn show_position(&mut self, index: usize, total: usize) {
        self.position = Some((index, total));
        self.events.push(ViewEvent::Position { index, total });
    }
}

// ============================================================================
// Catalog grid
// ============================================================================

/// In-memory downloads grid: per-entry layout/reveal flags plus the search
/// box and results line.
///
/// Every entry starts in layout and revealed, matching a page where all
/// materials are rendered visible.
#[derive(Debug, Clone)]
pub struct CatalogGrid {
    ids: Vec<String>,
    in_layout: Vec<bool>,
    revealed: Vec<bool>,
    mounted: bool,
    status: Option<Status>,
    category: Category,
    search_text: String,
    search_cues: bool,
    focused: bool,
    events: Vec<ViewEvent>,
}

impl CatalogGrid {
    pub fn new(ids: Vec<String>) -> Self {
        let n = ids.len();
        Self {
            ids,
            in_layout: vec![true; n],
            revealed: vec![true; n],
            mounted: true,
            status: None,
            category: Category::All,
            search_text: String::new(),
            search_cues: false,
            focused: false,
            events: Vec::new(),
        }
    }

    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.entries().iter().map(|e| e.id.clone()).collect())
    }

    /// A page without a catalog grid.
    pub fn detached() -> Self {
        Self {
            mounted: false,
            ..Self::new(Vec::new())
        }
    }

    /// Entries both in layout and revealed.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.ids
            .iter()
            .enumerate()
            .filter(|(i, _)| self.in_layout[*i] && self.revealed[*i])
            .map(|(_, id)| id.as_str())
            .collect()
    }

    /// True when no entry is mid-transition.
    pub fn is_settled(&self) -> bool {
        self.in_layout
            .iter()
            .zip(&self.revealed)
            .all(|(layout, revealed)| layout == revealed)
    }

    pub fn in_layout(&self, index: usize) -> Option<bool> {
        self.in_layout.get(index).copied()
    }

    pub fn revealed(&self, index: usize) -> Option<bool> {
        self.revealed.get(index).copied()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn active_category(&self) -> &Category {
        &self.category
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_cues(&self) -> bool {
        self.search_cues
    }

    /// Simulate the user clicking into the search field.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    fn entry_id(&self, index: usize) -> String {
        self.ids
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"))
    }
}

impl CatalogView for CatalogGrid {
    fn has_container(&self) -> bool {
        self.mounted
    }

    fn set_in_layout(&mut self, index: usize, in_layout: bool) {
        if let Some(slot) = self.in_layout.get_mut(index) {
            *slot = in_layout;
            let entry = self.entry_id(index);
            self.events.push(ViewEvent::Layout { entry, in_layout });
        }
    }

    fn set_revealed(&mut self, index: usize, revealed: bool) {
        if let Some(slot) = self.revealed.get_mut(index) {
            *slot = revealed;
            let entry = self.entry_id(index);
            self.events.push(ViewEvent::Reveal { entry, revealed });
        }
    }

    fn set_status(&mut self, status: &Status) {
        self.status = Some(status.clone());
        self.events.push(ViewEvent::Status {
            text: status.text.clone(),
            tone: status.tone,
        });
    }

    fn set_active_category(&mut self, category: &Category) {
        self.category = category.clone();
        self.events.push(ViewEvent::Category {
            slug: category.slug().to_string(),
        });
    }

    fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.events.push(ViewEvent::SearchText {
            text: text.to_string(),
        });
    }

    fn set_search_cues(&mut self, active: bool) {
        if self.search_cues != active {
            self.search_cues = active;
            self.events.push(ViewEvent::SearchCues { active });
        }
    }

    fn focus_search(&mut self, select: bool) {
        self.focused = true;
        self.events.push(ViewEvent::Focus { select });
    }

    fn blur_search(&mut self) {
        self.focused = false;
        self.events.push(ViewEvent::Blur);
    }

    fn is_search_focused(&self) -> bool {
        self.focused
    }
}
