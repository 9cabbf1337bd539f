//! Scripted sessions replayed against the engines under a manual clock.
//!
//! A scenario file describes one page visit: which regions exist, an optional
//! config overlay, and a timeline of user actions. Replaying it mounts a hero
//! carousel, a gallery carousel and a catalog filter over in-memory views,
//! steps a [`ManualClock`] from deadline to deadline, and records every view
//! write with the millisecond it happened at.
//!
//! ```toml
//! name = "search then clear"
//! hero_slides = 3
//! catalog_file = "../catalog.toml"
//! until_ms = 2000
//!
//! [config.catalog]
//! fold_diacritics = true
//!
//! [[steps]]
//! at_ms = 100
//! action = "type"
//! text = "seguranca"
//!
//! [[steps]]
//! at_ms = 900
//! action = "clear"
//! ```
//!
//! ## Regions
//!
//! - `hero_slides` / `hero_indicators`: hero banner (indicators default to
//!   one per slide). Zero slides means no banner.
//! - `gallery_photos`: adventure photo gallery.
//! - `catalog` (inline entries) or `catalog_file` (path relative to the
//!   scenario file): downloads page. With neither, the page has no catalog
//!   grid and the filter is inert.
//!
//! ## Actions
//!
//! | Action | Target | Fields |
//! |---|---|---|
//! | `next`, `previous`, `pointer-enter`, `pointer-leave` | `hero` / `gallery` | |
//! | `select` | `hero` / `gallery` | `index` |
//! | `key` | `hero` / `gallery` | `key` = `left` / `right` |
//! | `category` | `catalog` | `category` |
//! | `type` | `catalog` | `text` |
//! | `clear`, `escape`, `find-shortcut`, `focus-search` | `catalog` | |
//! | `wait` | none | |
//!
//! Catalog actions default their target. Steps must be in non-decreasing
//! `at_ms` order.

use crate::carousel::{Carousel, CarouselInput};
use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use crate::config::{ConfigError, SiteConfig, resolve_config};
use crate::filter::{CatalogFilter, CatalogInput};
use crate::timer::ManualClock;
use crate::view::{CatalogGrid, SlideStrip, ViewEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Scenario not found: {0}")]
    NotFound(PathBuf),
    #[error("Step {step}: {reason}")]
    InvalidStep { step: usize, reason: String },
    #[error("Scenario sets both `catalog` and `catalog_file`")]
    ConflictingCatalog,
}

/// Page region a step acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Hero,
    Gallery,
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Next,
    Previous,
    Select,
    PointerEnter,
    PointerLeave,
    Key,
    Category,
    Type,
    Clear,
    Escape,
    FindShortcut,
    FocusSearch,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    Left,
    Right,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub at_ms: u64,
    pub action: Action,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub key: Option<Key>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A step resolved to the engine call it makes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Carousel(Target, CarouselInput),
    Catalog(CatalogInput),
    FocusSearch,
    Wait,
}

impl Step {
    fn command(&self, number: usize) -> Result<Command, ScenarioError> {
        let invalid = |reason: String| ScenarioError::InvalidStep {
            step: number,
            reason,
        };
        let carousel = |input: CarouselInput| match self.target {
            Some(t @ (Target::Hero | Target::Gallery)) => Ok(Command::Carousel(t, input)),
            Some(Target::Catalog) => Err(invalid(format!(
                "{:?} needs a carousel target, got catalog",
                self.action
            ))),
            None => Err(invalid(format!(
                "{:?} needs target = \"hero\" or \"gallery\"",
                self.action
            ))),
        };
        let catalog = |command: Command| match self.target {
            None | Some(Target::Catalog) => Ok(command),
            Some(other) => Err(invalid(format!(
                "{:?} only applies to the catalog, got {other:?}",
                self.action
            ))),
        };

        match self.action {
            Action::Next => carousel(CarouselInput::Next),
            Action::Previous => carousel(CarouselInput::Previous),
            Action::PointerEnter => carousel(CarouselInput::PointerEnter),
            Action::PointerLeave => carousel(CarouselInput::PointerLeave),
            Action::Select => {
                let index = self
                    .index
                    .ok_or_else(|| invalid("select needs `index`".into()))?;
                carousel(CarouselInput::Select(index))
            }
            Action::Key => match self.key {
                Some(Key::Left) => carousel(CarouselInput::ArrowLeft),
                Some(Key::Right) => carousel(CarouselInput::ArrowRight),
                None => Err(invalid("key needs `key = \"left\"` or `\"right\"`".into())),
            },
            Action::Category => {
                let slug = self
                    .category
                    .clone()
                    .ok_or_else(|| invalid("category needs `category`".into()))?;
                catalog(Command::Catalog(CatalogInput::SelectCategory(slug)))
            }
            Action::Type => {
                let text = self
                    .text
                    .clone()
                    .ok_or_else(|| invalid("type needs `text`".into()))?;
                catalog(Command::Catalog(CatalogInput::Type(text)))
            }
            Action::Clear => catalog(Command::Catalog(CatalogInput::Clear)),
            Action::Escape => catalog(Command::Catalog(CatalogInput::Escape)),
            Action::FindShortcut => catalog(Command::Catalog(CatalogInput::FindShortcut)),
            Action::FocusSearch => catalog(Command::FocusSearch),
            Action::Wait => Ok(Command::Wait),
        }
    }
}

/// Parsed scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Overlay merged over the site config.
    #[serde(default)]
    pub config: Option<toml::Value>,
    #[serde(default)]
    pub catalog: Option<Vec<CatalogEntry>>,
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,
    #[serde(default)]
    pub hero_slides: usize,
    #[serde(default)]
    pub hero_indicators: Option<usize>,
    #[serde(default)]
    pub gallery_photos: usize,
    /// Keep the clock running to this point after the last step.
    #[serde(default)]
    pub until_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.commands()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        let mut scenario = Self::from_toml_str(&content)?;
        if scenario.name.is_none() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned());
        }
        if let (Some(file), Some(dir)) = (&scenario.catalog_file, path.parent()) {
            scenario.catalog_file = Some(dir.join(file));
        }
        Ok(scenario)
    }

    /// Resolve every step, checking fields and ordering.
    fn commands(&self) -> Result<Vec<(u64, Command)>, ScenarioError> {
        let mut last = 0;
        let mut commands = Vec::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            let number = i + 1;
            if step.at_ms < last {
                return Err(ScenarioError::InvalidStep {
                    step: number,
                    reason: format!("at_ms {} is before the previous step ({last})", step.at_ms),
                });
            }
            last = step.at_ms;
            commands.push((step.at_ms, step.command(number)?));
        }
        Ok(commands)
    }

    fn load_catalog(&self) -> Result<Option<Catalog>, ScenarioError> {
        match (&self.catalog, &self.catalog_file) {
            (Some(_), Some(_)) => Err(ScenarioError::ConflictingCatalog),
            (Some(entries), None) => Ok(Some(Catalog::new(entries.clone())?)),
            (None, Some(path)) => Ok(Some(Catalog::load(path)?)),
            (None, None) => Ok(None),
        }
    }

    /// Replay against `base` (the already-resolved site config).
    pub fn run(&self, base: &SiteConfig) -> Result<Transcript, ScenarioError> {
        let config = match &self.config {
            Some(overlay) => {
                let base = toml::Value::try_from(base).map_err(ConfigError::from)?;
                resolve_config(base, [overlay.clone()])?
            }
            None => base.clone(),
        };
        let catalog = self.load_catalog()?;
        let commands = self.commands()?;
        let name = self.name.clone().unwrap_or_else(|| "scenario".to_string());
        info!(scenario = %name, steps = commands.len(), "replaying");

        let mut session = Session::new(
            &config,
            catalog.as_ref(),
            self.hero_slides,
            self.hero_indicators.unwrap_or(self.hero_slides),
            self.gallery_photos,
        );
        for (at_ms, command) in &commands {
            session.advance_to(Duration::from_millis(*at_ms));
            session.apply(command);
        }
        let end = commands.last().map(|(at, _)| *at).unwrap_or(0);
        let until = self.until_ms.unwrap_or(end).max(end);
        session.advance_to(Duration::from_millis(until));

        Ok(session.finish(name, until))
    }
}

/// One view write, stamped with its replay time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub region: Target,
    #[serde(flatten)]
    pub event: ViewEvent,
}

/// Where every region ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalState {
    pub hero_index: Option<usize>,
    pub gallery_index: Option<usize>,
    pub visible: Vec<String>,
    pub status: Option<String>,
    pub recomputes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub name: String,
    pub until_ms: u64,
    pub events: Vec<TimedEvent>,
    pub final_state: FinalState,
}

impl Transcript {
    pub fn region_events(&self, region: Target) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter().filter(move |e| e.region == region)
    }
}

/// The three engines of one page visit sharing one manual clock.
struct Session {
    clock: ManualClock,
    hero: Carousel<SlideStrip, ManualClock>,
    gallery: Carousel<SlideStrip, ManualClock>,
    catalog: CatalogFilter<CatalogGrid, ManualClock>,
    events: Vec<TimedEvent>,
}

impl Session {
    fn new(
        config: &SiteConfig,
        catalog: Option<&Catalog>,
        hero_slides: usize,
        hero_indicators: usize,
        gallery_photos: usize,
    ) -> Self {
        let clock = ManualClock::new();
        let hero = Carousel::new(
            "hero",
            SlideStrip::new(hero_slides, hero_indicators),
            clock.clone(),
            config.hero.clone(),
        );
        let gallery = Carousel::new(
            "gallery",
            SlideStrip::new(gallery_photos, gallery_photos),
            clock.clone(),
            config.gallery.clone(),
        );
        let empty = Catalog::default();
        let (grid, entries) = match catalog {
            Some(catalog) => (CatalogGrid::for_catalog(catalog), catalog),
            None => (CatalogGrid::detached(), &empty),
        };
        let catalog = CatalogFilter::new(entries, grid, clock.clone(), config);

        let mut session = Self {
            clock,
            hero,
            gallery,
            catalog,
            events: Vec::new(),
        };
        session.drain();
        session
    }

    fn next_deadline(&self) -> Option<Duration> {
        [
            self.hero.next_tick(),
            self.gallery.next_tick(),
            self.catalog.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Step the clock through every deadline up to `at`, polling at each.
    fn advance_to(&mut self, at: Duration) {
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= at) {
            self.clock.set(deadline);
            self.hero.poll();
            self.gallery.poll();
            self.catalog.poll();
            self.drain();
        }
        self.clock.set(at);
    }

    fn apply(&mut self, command: &Command) {
        debug!(at = ?self.clock.now(), ?command, "step");
        match command {
            Command::Carousel(Target::Gallery, input) => self.gallery.dispatch(*input),
            Command::Carousel(_, input) => self.hero.dispatch(*input),
            Command::Catalog(input) => self.catalog.dispatch(input.clone()),
            Command::FocusSearch => self.catalog.view_mut().set_focused(true),
            Command::Wait => {}
        }
        self.drain();
    }

    fn drain(&mut self) {
        let at_ms = self.clock.now().as_millis() as u64;
        let hero = self.hero.view_mut().take_events();
        let gallery = self.gallery.view_mut().take_events();
        let catalog = self.catalog.view_mut().take_events();
        for (region, batch) in [
            (Target::Hero, hero),
            (Target::Gallery, gallery),
            (Target::Catalog, catalog),
        ] {
            self.events
                .extend(batch.into_iter().map(|event| TimedEvent { at_ms, region, event }));
        }
    }

    fn finish(self, name: String, until_ms: u64) -> Transcript {
        let index = |c: &Carousel<SlideStrip, ManualClock>| (!c.is_empty()).then(|| c.index());
        let grid = self.catalog.view();
        let final_state = FinalState {
            hero_index: index(&self.hero),
            gallery_index: index(&self.gallery),
            visible: grid.visible_ids().into_iter().map(String::from).collect(),
            status: grid.status().map(|s| s.text.clone()),
            recomputes: self.catalog.recompute_count(),
        };
        Transcript {
            name,
            until_ms,
            events: self.events,
            final_state,
        }
    }
}

/// Expand files and directories into scenario files.
///
/// Directories are walked recursively for `*.toml`, sorted by file name.
pub fn collect_scenarios(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScenarioError> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
                if entry.file_type().is_file() && is_toml {
                    found.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            found.push(path.clone());
        } else {
            return Err(ScenarioError::NotFound(path.clone()));
        }
    }
    Ok(found)
}

/// Load and replay one scenario file.
pub fn run_file(path: &Path, base: &SiteConfig) -> Result<Transcript, ScenarioError> {
    Scenario::load(path)?.run(base)
}
