//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Configuration
//! is layered: stock defaults are overridden by a user config file, which in
//! turn can be overridden by the `[config]` table of a scenario file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [hero]
//! interval_ms = 5000        # Auto-play period
//! autoplay = true
//! pause_on_hover = true
//! keyboard = false          # Arrow keys while hovered
//!
//! [gallery]
//! interval_ms = 5000
//! autoplay = false          # Photo gallery is manual-only
//! pause_on_hover = true
//! keyboard = true
//!
//! [catalog]
//! debounce_ms = 300         # Quiet period before a typed search applies
//! show_delay_ms = 50        # Layout → fully shown
//! hide_delay_ms = 300       # Faded → removed from layout
//! fold_diacritics = false   # "seguranca" matches "Segurança" when true
//!
//! [categories]              # slug = "Display label"
//! documents = "Documentos"
//! videos = "Vídeos"
//! photos = "Fotos"
//! guides = "Guias"
//! forms = "Formulários"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [hero]
//! interval_ms = 8000
//! ```
//!
//! Unknown keys are rejected to catch typos early. Entries under
//! `[categories]` are added to the stock set rather than replacing it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Label used for a category slug with no configured name.
pub const FALLBACK_CATEGORY_LABEL: &str = "Todos";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Hero banner slideshow.
    pub hero: CarouselConfig,
    /// Adventure photo gallery.
    #[serde(default = "CarouselConfig::gallery")]
    pub gallery: CarouselConfig,
    /// Downloads catalog search and filter timing.
    pub catalog: CatalogConfig,
    /// Category slug → display label.
    pub categories: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hero: CarouselConfig::hero(),
            gallery: CarouselConfig::gallery(),
            catalog: CatalogConfig::default(),
            categories: default_categories(),
        }
    }
}

fn default_categories() -> BTreeMap<String, String> {
    [
        ("documents", "Documentos"),
        ("videos", "Vídeos"),
        ("photos", "Fotos"),
        ("guides", "Guias"),
        ("forms", "Formulários"),
    ]
    .into_iter()
    .map(|(slug, label)| (slug.to_string(), label.to_string()))
    .collect()
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, carousel) in [("hero", &self.hero), ("gallery", &self.gallery)] {
            if carousel.interval_ms == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.interval_ms must be greater than zero"
                )));
            }
        }
        if self.catalog.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "catalog.debounce_ms must be greater than zero".into(),
            ));
        }
        if self.categories.contains_key("all") {
            return Err(ConfigError::Validation(
                "categories: \"all\" is reserved and cannot be relabelled".into(),
            ));
        }
        if let Some((slug, _)) = self.categories.iter().find(|(_, l)| l.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "categories.{slug} must have a non-empty label"
            )));
        }
        Ok(())
    }

    /// Display label for a category slug, `Todos` when unknown.
    pub fn category_label(&self, slug: &str) -> &str {
        self.categories
            .get(slug)
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY_LABEL)
    }
}

/// Settings for one carousel instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Auto-play period in milliseconds.
    pub interval_ms: u64,
    /// Whether the carousel advances on its own.
    pub autoplay: bool,
    /// Pointer entering the carousel pauses auto-play; leaving resumes it.
    pub pause_on_hover: bool,
    /// Arrow keys navigate while the pointer is over the carousel.
    pub keyboard: bool,
}

impl CarouselConfig {
    pub fn hero() -> Self {
        Self {
            interval_ms: 5000,
            autoplay: true,
            pause_on_hover: true,
            keyboard: false,
        }
    }

    pub fn gallery() -> Self {
        Self {
            interval_ms: 5000,
            autoplay: false,
            pause_on_hover: true,
            keyboard: true,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self::hero()
    }
}

/// Catalog filter timing and matching settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Quiet period after the last keystroke before the search applies.
    pub debounce_ms: u64,
    /// Delay between putting an entry back in layout and fully revealing it.
    pub show_delay_ms: u64,
    /// Delay between fading an entry and removing it from layout.
    pub hide_delay_ms: u64,
    /// Fold Latin diacritics before substring matching.
    pub fold_diacritics: bool,
}

impl CatalogConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            show_delay_ms: 50,
            hide_delay_ms: 300,
            fold_diacritics: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays in order onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file, merged over stock defaults.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Trilha Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Scenario files may carry a [config] table that overrides this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Hero slideshow (home page banner)
# ---------------------------------------------------------------------------
[hero]
# Milliseconds between automatic advances.
interval_ms = 5000

# Advance automatically. Manual navigation restarts the interval.
autoplay = true

# Pause while the pointer is over the banner, resume when it leaves.
pause_on_hover = true

# Arrow keys navigate while the pointer is over the banner.
keyboard = false

# ---------------------------------------------------------------------------
# Photo gallery (adventure detail page)
# ---------------------------------------------------------------------------
[gallery]
interval_ms = 5000
autoplay = false
pause_on_hover = true
keyboard = true

# ---------------------------------------------------------------------------
# Downloads catalog
# ---------------------------------------------------------------------------
[catalog]
# Quiet period after the last keystroke before a search is applied.
debounce_ms = 300

# Two-phase transitions: an entry being shown enters the layout at once and
# becomes fully visible after show_delay_ms; an entry being hidden fades at
# once and leaves the layout after hide_delay_ms.
show_delay_ms = 50
hide_delay_ms = 300

# Match "seguranca" against "Segurança". Off keeps plain substring matching.
fold_diacritics = false

# ---------------------------------------------------------------------------
# Category labels used in the results line ("3 de 12 materiais em Guias")
# ---------------------------------------------------------------------------
[categories]
documents = "Documentos"
forms = "Formulários"
guides = "Guias"
photos = "Fotos"
videos = "Vídeos"
"##
}
