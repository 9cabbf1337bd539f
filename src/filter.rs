//! Catalog filter engine for the downloads page.
//!
//! Holds the current [`FilterState`] (category + normalized search term) over
//! a fixed catalog and keeps the view's visible set equal to the entries the
//! predicate accepts.
//!
//! ## Triggers
//!
//! | Call | Recompute |
//! |---|---|
//! | [`CatalogFilter::set_category`] | immediate |
//! | [`CatalogFilter::set_search_term`] | debounced; a new call within the window reschedules |
//! | [`CatalogFilter::clear`] | immediate, cancels a pending debounce |
//!
//! ## Recompute
//!
//! Only entries whose predicate result flips are touched. A recompute with an
//! unchanged predicate writes nothing, and the status line is only re-sent
//! when its content changes.
//!
//! ## Two-phase transitions
//!
//! ```text
//! show:  set_in_layout(true)  ──show_delay──▶ set_revealed(true)
//! hide:  set_revealed(false)  ──hide_delay──▶ set_in_layout(false)
//! ```
//!
//! Each entry has at most one pending second phase. A new show/hide for the
//! same entry cancels it first, so the last instruction wins and entries never
//! end half-shown. Other entries' pending phases are unaffected.
//!
//! ## Timing under late polls
//!
//! Follow-up timers scheduled while firing a due timer are placed relative to
//! that timer's deadline rather than to the poll time, so a host that polls
//! late replays the same timeline it would have seen polling on time.

use crate::catalog::{Catalog, CatalogEntry, Category, FilterState, SearchText, normalize};
use crate::config::{CatalogConfig, FALLBACK_CATEGORY_LABEL, SiteConfig};
use crate::status::{Status, describe};
use crate::timer::{Clock, TimerId, TimerQueue};
use crate::view::CatalogView;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, trace};

/// Control input routed to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogInput {
    /// Category button press, by slug.
    SelectCategory(String),
    /// New raw contents of the search field.
    Type(String),
    /// Clear button.
    Clear,
    /// Escape key.
    Escape,
    /// Ctrl+F / Cmd+F.
    FindShortcut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterTimer {
    Debounce,
    /// Second phase of a show.
    Reveal(usize),
    /// Second phase of a hide.
    Collapse(usize),
}

pub struct CatalogFilter<V, C> {
    view: V,
    clock: C,
    config: CatalogConfig,
    labels: BTreeMap<String, String>,
    entries: Vec<CatalogEntry>,
    texts: Vec<SearchText>,
    state: FilterState,
    raw_text: String,
    shown: Vec<bool>,
    timers: TimerQueue<FilterTimer>,
    debounce: Option<TimerId>,
    transitions: HashMap<usize, TimerId>,
    firing_at: Option<Duration>,
    last_status: Option<Status>,
    recomputes: usize,
    inert: bool,
}

impl<V: CatalogView, C: Clock> CatalogFilter<V, C> {
    /// Attach to a downloads grid that currently shows every entry.
    ///
    /// Nothing is written to the view until the first input. When the view
    /// reports no catalog container the engine is inert.
    pub fn new(catalog: &Catalog, view: V, clock: C, config: &SiteConfig) -> Self {
        let inert = !view.has_container();
        let entries = if inert {
            Vec::new()
        } else {
            catalog.entries().to_vec()
        };
        let fold = config.catalog.fold_diacritics;
        let texts = entries.iter().map(|e| SearchText::new(e, fold)).collect();
        let shown = vec![true; entries.len()];
        if inert {
            debug!("no catalog container, filter inert");
        }
        Self {
            view,
            clock,
            config: config.catalog.clone(),
            labels: config.categories.clone(),
            entries,
            texts,
            state: FilterState::default(),
            raw_text: String::new(),
            shown,
            timers: TimerQueue::new(),
            debounce: None,
            transitions: HashMap::new(),
            firing_at: None,
            last_status: None,
            recomputes: 0,
            inert,
        }
    }

    fn now(&self) -> Duration {
        self.firing_at.unwrap_or_else(|| self.clock.elapsed())
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn category(&self) -> &Category {
        &self.state.category
    }

    pub fn term(&self) -> &str {
        &self.state.term
    }

    /// Number of recomputes run so far.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn has_pending_search(&self) -> bool {
        self.debounce.is_some()
    }

    /// Entries with a second phase still pending.
    pub fn pending_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Ids the last recompute decided should be visible.
    pub fn target_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .zip(&self.shown)
            .filter_map(|(e, shown)| shown.then_some(e.id.as_str()))
            .collect()
    }

    /// Results line for the current state.
    pub fn status(&self) -> Status {
        let visible = self.shown.iter().filter(|s| **s).count();
        describe(
            visible,
            self.entries.len(),
            &self.state.term,
            self.category_label(),
        )
    }

    fn category_label(&self) -> Option<&str> {
        match &self.state.category {
            Category::All => None,
            Category::Named(slug) => Some(
                self.labels
                    .get(slug)
                    .map(String::as_str)
                    .unwrap_or(FALLBACK_CATEGORY_LABEL),
            ),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Select a category and recompute immediately.
    pub fn set_category(&mut self, slug: &str) {
        if self.inert {
            return;
        }
        self.state.category = Category::parse(slug);
        self.view.set_active_category(&self.state.category);
        debug!(category = %self.state.category, "category selected");
        self.recompute();
    }

    /// Store a new search term and (re)schedule the debounced recompute.
    pub fn set_search_term(&mut self, raw: &str) {
        if self.inert {
            return;
        }
        self.raw_text = raw.to_string();
        self.state.term = normalize(raw, self.config.fold_diacritics);
        self.view.set_search_cues(!self.state.term.is_empty());
        self.cancel_debounce();
        let deadline = self.now() + self.config.debounce();
        self.debounce = Some(self.timers.schedule_at(deadline, FilterTimer::Debounce));
        trace!(term = %self.state.term, ?deadline, "search debounced");
    }

    /// Empty the search, recompute immediately, and refocus the field.
    pub fn clear(&mut self) {
        if self.inert {
            return;
        }
        self.clear_term();
        self.view.focus_search(false);
    }

    fn clear_term(&mut self) {
        self.cancel_debounce();
        self.raw_text.clear();
        self.state.term.clear();
        self.view.set_search_text("");
        self.view.set_search_cues(false);
        self.recompute();
    }

    fn cancel_debounce(&mut self) {
        if let Some(id) = self.debounce.take() {
            self.timers.cancel(id);
        }
    }

    /// Apply a user control.
    pub fn dispatch(&mut self, input: CatalogInput) {
        if self.inert {
            return;
        }
        match input {
            CatalogInput::SelectCategory(slug) => self.set_category(&slug),
            CatalogInput::Type(raw) => self.set_search_term(&raw),
            CatalogInput::Clear => self.clear(),
            CatalogInput::Escape => {
                if !self.view.is_search_focused() {
                    return;
                }
                if self.raw_text.is_empty() {
                    self.view.blur_search();
                } else {
                    self.clear_term();
                }
            }
            CatalogInput::FindShortcut => self.view.focus_search(true),
        }
    }

    /// Re-evaluate every entry against the current filter.
    pub fn recompute(&mut self) {
        if self.inert {
            return;
        }
        self.recomputes += 1;
        let mut visible = 0;
        let mut flipped = 0;
        for i in 0..self.entries.len() {
            let wanted = self.state.matches(&self.entries[i], &self.texts[i]);
            if wanted {
                visible += 1;
            }
            if wanted == self.shown[i] {
                continue;
            }
            self.shown[i] = wanted;
            flipped += 1;
            if wanted {
                self.begin_show(i);
            } else {
                self.begin_hide(i);
            }
        }

        let status = describe(
            visible,
            self.entries.len(),
            &self.state.term,
            self.category_label(),
        );
        if self.last_status.as_ref() != Some(&status) {
            self.view.set_status(&status);
            self.last_status = Some(status);
        }
        debug!(
            visible,
            total = self.entries.len(),
            flipped,
            term = %self.state.term,
            category = %self.state.category,
            "catalog recomputed"
        );
    }

    fn begin_show(&mut self, index: usize) {
        self.cancel_transition(index);
        self.view.set_in_layout(index, true);
        let deadline = self.now() + self.config.show_delay();
        let id = self.timers.schedule_at(deadline, FilterTimer::Reveal(index));
        self.transitions.insert(index, id);
    }

    fn begin_hide(&mut self, index: usize) {
        self.cancel_transition(index);
        self.view.set_revealed(index, false);
        let deadline = self.now() + self.config.hide_delay();
        let id = self.timers.schedule_at(deadline, FilterTimer::Collapse(index));
        self.transitions.insert(index, id);
    }

    fn cancel_transition(&mut self, index: usize) {
        if let Some(id) = self.transitions.remove(&index) {
            self.timers.cancel(id);
        }
    }

    /// Fire every timer due by now. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.elapsed();
        let mut fired = 0;
        while let Some((id, deadline, timer)) = self.timers.pop_due(now) {
            self.firing_at = Some(deadline);
            match timer {
                FilterTimer::Debounce => {
                    if self.debounce == Some(id) {
                        self.debounce = None;
                        self.recompute();
                    }
                }
                FilterTimer::Reveal(index) => {
                    if self.transitions.get(&index) == Some(&id) {
                        self.transitions.remove(&index);
                        self.view.set_revealed(index, true);
                    }
                }
                FilterTimer::Collapse(index) => {
                    if self.transitions.get(&index) == Some(&id) {
                        self.transitions.remove(&index);
                        self.view.set_in_layout(index, false);
                    }
                }
            }
            fired += 1;
        }
        self.firing_at = None;
        fired
    }

    /// Cancel the debounce and every pending transition, then go inert.
    pub fn shutdown(&mut self) {
        self.timers.clear();
        self.debounce = None;
        self.transitions.clear();
        self.inert = true;
        debug!("catalog filter shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Tone;
    use crate::test_helpers::*;
    use crate::timer::ManualClock;
    use crate::view::{CatalogGrid, ViewEvent};

    type Filter = CatalogFilter<CatalogGrid, ManualClock>;

    fn mount(catalog: &Catalog, config: &SiteConfig) -> (Filter, ManualClock) {
        let clock = ManualClock::new();
        let filter = CatalogFilter::new(
            catalog,
            CatalogGrid::for_catalog(catalog),
            clock.clone(),
            config,
        );
        (filter, clock)
    }

    /// Advance far enough for every transition to settle.
    fn settle(filter: &mut Filter, clock: &ManualClock) {
        clock.advance_ms(1000);
        filter.poll();
        assert!(filter.view().is_settled());
    }

    fn expected_ids(catalog: &Catalog, filter: &Filter, fold: bool) -> Vec<String> {
        crate::catalog::visible_entries(catalog, filter.state(), fold)
            .into_iter()
            .map(|e| e.id.clone())
            .collect()
    }

    #[test]
    fn category_scenario_two_entries() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("videos");
        settle(&mut f, &clock);
        assert_eq!(f.view().visible_ids(), vec!["b"]);
        assert_eq!(f.view().status().unwrap().text, "1 de 2 materiais em Vídeos");
        assert_eq!(f.view().active_category(), &Category::parse("videos"));
    }

    #[test]
    fn literal_search_scenario_does_not_fold() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_search_term("seguranca");
        settle(&mut f, &clock);
        assert!(f.view().visible_ids().is_empty());
        assert_eq!(
            f.view().status().unwrap().text,
            "Nenhum resultado encontrado para \"seguranca\""
        );

        f.set_search_term("Segurança");
        settle(&mut f, &clock);
        assert_eq!(f.view().visible_ids(), vec!["a"]);
    }

    #[test]
    fn folded_search_scenario_matches_unaccented() {
        let catalog = two_entry_catalog();
        let mut config = SiteConfig::default();
        config.catalog.fold_diacritics = true;
        let (mut f, clock) = mount(&catalog, &config);
        f.set_search_term("seguranca");
        settle(&mut f, &clock);
        assert_eq!(f.view().visible_ids(), vec!["a"]);
        assert_eq!(
            f.view().status().unwrap().text,
            "1 de 2 materiais para \"seguranca\""
        );
    }

    #[test]
    fn empty_catalog_reports_zero_of_zero() {
        let catalog = Catalog::default();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("videos");
        assert_eq!(f.view().status().unwrap().text, "0 de 0 materiais em Vídeos");
        f.set_search_term("mapa");
        settle(&mut f, &clock);
        assert!(f.view().status().unwrap().text.starts_with("0 de 0 materiais"));
        f.clear();
        f.set_category("all");
        assert_eq!(f.view().status().unwrap().text, "0 de 0 materiais");
        assert_eq!(f.status().tone, Tone::NoResults);
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("kayak");
        settle(&mut f, &clock);
        assert!(f.view().visible_ids().is_empty());
        assert_eq!(f.view().status().unwrap().text, "Nenhum item nesta categoria");
    }

    #[test]
    fn visibility_always_equals_predicate() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        let steps: &[(&str, &str)] = &[
            ("all", "equipamentos"),
            ("photos", "equipamentos"),
            ("photos", ""),
            ("guides", "  TRILHAS "),
            ("forms", "pdf"),
            ("all", "vídeo"),
            ("videos", "inexistente"),
            ("all", ""),
        ];
        for (category, term) in steps {
            f.set_category(category);
            f.set_search_term(term);
            settle(&mut f, &clock);
            let expected = expected_ids(&catalog, &f, false);
            let visible: Vec<String> =
                f.view().visible_ids().into_iter().map(String::from).collect();
            assert_eq!(visible, expected, "category={category} term={term:?}");
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("guides");
        settle(&mut f, &clock);
        f.view_mut().take_events();

        f.recompute();
        f.recompute();
        assert!(f.view().events().is_empty());
        assert_eq!(f.pending_transitions(), 0);
    }

    #[test]
    fn same_category_twice_writes_nothing_new() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("photos");
        settle(&mut f, &clock);
        f.view_mut().take_events();
        f.set_category("photos");
        let events = f.view_mut().take_events();
        assert_eq!(
            events,
            vec![ViewEvent::Category {
                slug: "photos".into()
            }]
        );
    }

    #[test]
    fn burst_of_typing_recomputes_once_with_last_term() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_search_term("g");
        clock.advance_ms(40);
        f.poll();
        f.set_search_term("gu");
        clock.advance_ms(40);
        f.poll();
        f.set_search_term("guia");
        assert_eq!(f.recompute_count(), 0);

        clock.advance_ms(299);
        f.poll();
        assert_eq!(f.recompute_count(), 0);
        clock.advance_ms(1);
        f.poll();
        assert_eq!(f.recompute_count(), 1);
        assert_eq!(f.term(), "guia");
        assert!(!f.has_pending_search());

        settle(&mut f, &clock);
        assert_eq!(f.recompute_count(), 1);
        // "Manual de Segurança" mentions "Guia completo" in its description
        assert_eq!(
            f.view().visible_ids(),
            vec!["manual-seguranca", "guia-equipamentos", "guia-trilhas"]
        );
    }

    #[test]
    fn category_change_is_immediate() {
        let catalog = sample_catalog();
        let (mut f, _) = mount(&catalog, &SiteConfig::default());
        f.set_category("forms");
        assert_eq!(f.recompute_count(), 1);
        assert_eq!(f.target_ids(), vec!["ficha-inscricao", "termo-responsabilidade"]);
    }

    #[test]
    fn clear_cancels_pending_search_and_refocuses() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_search_term("trilhas");
        clock.advance_ms(100);
        f.clear();
        assert!(!f.has_pending_search());
        assert_eq!(f.recompute_count(), 1);
        assert_eq!(f.term(), "");
        assert!(f.view().is_search_focused());
        assert_eq!(f.view().search_text(), "");
        assert!(!f.view().search_cues());

        clock.advance_ms(1000);
        f.poll();
        assert_eq!(f.recompute_count(), 1);
        assert_eq!(f.view().visible_ids().len(), catalog.len());
        assert_eq!(
            f.view().status().unwrap().text,
            "Mostrando todos os 10 materiais"
        );
    }

    #[test]
    fn show_and_hide_are_two_phase() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());

        f.set_category("videos");
        // "a" fades immediately but stays in layout for hide_delay
        assert_eq!(f.view().revealed(0), Some(false));
        assert_eq!(f.view().in_layout(0), Some(true));
        clock.advance_ms(299);
        f.poll();
        assert_eq!(f.view().in_layout(0), Some(true));
        clock.advance_ms(1);
        f.poll();
        assert_eq!(f.view().in_layout(0), Some(false));

        f.set_category("all");
        // "a" re-enters layout immediately, reveals after show_delay
        assert_eq!(f.view().in_layout(0), Some(true));
        assert_eq!(f.view().revealed(0), Some(false));
        clock.advance_ms(50);
        f.poll();
        assert_eq!(f.view().revealed(0), Some(true));
        assert!(f.view().is_settled());
    }

    #[test]
    fn show_supersedes_pending_hide() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("videos");
        clock.advance_ms(100);
        f.set_category("all");
        assert_eq!(f.pending_transitions(), 1);

        clock.advance_ms(1000);
        f.poll();
        assert_eq!(f.view().in_layout(0), Some(true));
        assert_eq!(f.view().revealed(0), Some(true));
        assert_eq!(f.view().visible_ids(), vec!["a", "b"]);
    }

    #[test]
    fn hide_supersedes_pending_show() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("videos");
        settle(&mut f, &clock);
        f.set_category("all");
        clock.advance_ms(20);
        f.set_category("videos");

        clock.advance_ms(1000);
        f.poll();
        assert_eq!(f.view().in_layout(0), Some(false));
        assert_eq!(f.view().revealed(0), Some(false));
        assert_eq!(f.view().visible_ids(), vec!["b"]);
    }

    #[test]
    fn rapid_toggling_of_one_entry_leaves_others_alone() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("documents");
        let pending = f.pending_transitions();
        assert_eq!(pending, catalog.len() - 2);
        clock.advance_ms(10);
        f.set_category("videos");
        clock.advance_ms(10);
        f.set_category("documents");
        // every non-document entry still has exactly one pending hide
        assert_eq!(f.pending_transitions(), catalog.len() - 2 + 2);
        settle(&mut f, &clock);
        assert_eq!(
            f.view().visible_ids(),
            vec!["manual-seguranca", "regulamento-geral"]
        );
    }

    #[test]
    fn late_poll_replays_full_timeline() {
        let catalog = two_entry_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_search_term("vídeo");
        clock.advance_ms(5000);
        f.poll();
        // debounce at 300, collapse at 600: both inside one late poll
        assert_eq!(f.recompute_count(), 1);
        assert!(f.view().is_settled());
        assert_eq!(f.view().visible_ids(), vec!["b"]);
    }

    #[test]
    fn escape_clears_then_blurs() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.dispatch(CatalogInput::Escape);
        assert!(f.view().events().is_empty(), "unfocused escape is ignored");

        f.view_mut().set_focused(true);
        f.dispatch(CatalogInput::Type("guia".into()));
        clock.advance_ms(300);
        f.poll();
        f.dispatch(CatalogInput::Escape);
        assert_eq!(f.term(), "");
        assert!(f.view().is_search_focused());
        assert_eq!(f.recompute_count(), 2);

        f.dispatch(CatalogInput::Escape);
        assert!(!f.view().is_search_focused());
        assert_eq!(f.recompute_count(), 2);
    }

    #[test]
    fn find_shortcut_focuses_and_selects() {
        let catalog = sample_catalog();
        let (mut f, _) = mount(&catalog, &SiteConfig::default());
        f.dispatch(CatalogInput::FindShortcut);
        assert!(f.view().is_search_focused());
        assert_eq!(f.view().events(), &[ViewEvent::Focus { select: true }]);
    }

    #[test]
    fn typing_toggles_search_cues() {
        let catalog = sample_catalog();
        let (mut f, _) = mount(&catalog, &SiteConfig::default());
        f.set_search_term("  ");
        assert!(!f.view().search_cues());
        f.set_search_term("mapa");
        assert!(f.view().search_cues());
        f.set_search_term("");
        assert!(!f.view().search_cues());
    }

    #[test]
    fn detached_view_is_inert() {
        let catalog = sample_catalog();
        let clock = ManualClock::new();
        let mut f = CatalogFilter::new(
            &catalog,
            CatalogGrid::detached(),
            clock.clone(),
            &SiteConfig::default(),
        );
        assert!(f.is_inert());
        f.set_category("videos");
        f.set_search_term("x");
        f.clear();
        f.dispatch(CatalogInput::FindShortcut);
        clock.advance_ms(1000);
        assert_eq!(f.poll(), 0);
        assert_eq!(f.recompute_count(), 0);
        assert!(f.view().events().is_empty());
    }

    #[test]
    fn shutdown_cancels_everything() {
        let catalog = sample_catalog();
        let (mut f, clock) = mount(&catalog, &SiteConfig::default());
        f.set_category("videos");
        f.set_search_term("equip");
        assert!(f.next_deadline().is_some());
        f.shutdown();
        assert_eq!(f.next_deadline(), None);
        assert_eq!(f.pending_transitions(), 0);
        f.view_mut().take_events();
        clock.advance_ms(1000);
        assert_eq!(f.poll(), 0);
        assert!(f.view().events().is_empty());
    }

    #[test]
    fn unknown_category_label_falls_back() {
        let catalog = sample_catalog();
        let (mut f, _) = mount(&catalog, &SiteConfig::default());
        f.set_category("kayak");
        f.set_search_term("manual");
        assert_eq!(
            f.status().text,
            "Nenhum resultado encontrado para \"manual\" em Todos"
        );
    }
}
