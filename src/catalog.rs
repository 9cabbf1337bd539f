//! Downloads catalog: entries, loading, and the filter predicate.
//!
//! A catalog is a fixed, ordered list of downloadable materials. It is
//! written as TOML so the same file can seed a page and drive scenario
//! replays:
//!
//! ```toml
//! [[entries]]
//! id = "manual-seguranca"
//! title = "Manual de Segurança"
//! description = "Guia completo de segurança para aventuras."
//! category = "documents"
//! file_type = "pdf"
//! ```
//!
//! The predicate is deliberately plain: an entry is visible when its category
//! matches the selected one (or the selection is `all`) and the normalized
//! search term is a substring of its title, description, or file type.
//! Normalization is `trim` + lower-case, optionally followed by diacritic
//! folding when the site enables it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Slug that selects every category.
pub const ALL: &str = "all";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Entry #{0} has an empty id")]
    EmptyId(usize),
    #[error("Duplicate entry id: {0}")]
    DuplicateId(String),
}

/// One downloadable material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category slug, e.g. `documents`.
    pub category: String,
    /// File type label shown on the card, e.g. `pdf`.
    pub file_type: String,
}

/// Ordered list of entries with unique ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let catalog = Self { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for (pos, entry) in self.entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(pos + 1));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct category slugs in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

/// Category selection.
///
/// Anything other than `all` is compared with strict equality against the
/// entry's category slug, so an unknown slug matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    All,
    Named(String),
}

impl Category {
    pub fn parse(slug: &str) -> Self {
        if slug == ALL {
            Category::All
        } else {
            Category::Named(slug.to_string())
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Category::All => ALL,
            Category::Named(slug) => slug,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Category::All)
    }

    pub fn matches(&self, entry_category: &str) -> bool {
        match self {
            Category::All => true,
            Category::Named(slug) => slug == entry_category,
        }
    }
}

impl From<&str> for Category {
    fn from(slug: &str) -> Self {
        Category::parse(slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Normalize user or entry text for matching.
pub fn normalize(raw: &str, fold: bool) -> String {
    let lowered = raw.trim().to_lowercase();
    if fold { fold_diacritics(&lowered) } else { lowered }
}

/// Strip combining marks after canonical decomposition, so precomposed and
/// decomposed spellings of `ç` both fold to `c`.
fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Pre-normalized searchable fields of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText {
    title: String,
    description: String,
    file_type: String,
}

impl SearchText {
    pub fn new(entry: &CatalogEntry, fold: bool) -> Self {
        Self {
            title: normalize(&entry.title, fold),
            description: normalize(&entry.description, fold),
            file_type: normalize(&entry.file_type, fold),
        }
    }

    /// `term` must already be normalized.
    pub fn contains(&self, term: &str) -> bool {
        term.is_empty()
            || self.title.contains(term)
            || self.description.contains(term)
            || self.file_type.contains(term)
    }
}

/// Current category + search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: Category,
    /// Normalized term; empty means no search.
    pub term: String,
}

impl FilterState {
    pub fn matches(&self, entry: &CatalogEntry, text: &SearchText) -> bool {
        self.category.matches(&entry.category) && text.contains(&self.term)
    }
}

/// Evaluate a filter once, without timers or a view.
pub fn visible_entries<'a>(
    catalog: &'a Catalog,
    state: &FilterState,
    fold: bool,
) -> Vec<&'a CatalogEntry> {
    catalog
        .entries()
        .iter()
        .filter(|e| state.matches(e, &SearchText::new(e, fold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn parse_catalog_toml() {
        let catalog = Catalog::from_toml_str(
            r#"
[[entries]]
id = "a"
title = "Manual de Segurança"
category = "documents"
file_type = "pdf"
"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].description, "");
        assert_eq!(catalog.get("a").unwrap().file_type, "pdf");
    }

    #[test]
    fn empty_document_is_empty_catalog() {
        let catalog = Catalog::from_toml_str("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::new(vec![
            entry("a", "One", "documents", "pdf"),
            entry("a", "Two", "videos", "mp4"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn empty_id_is_rejected() {
        let result = Catalog::new(vec![
            entry("a", "One", "documents", "pdf"),
            entry(" ", "Two", "videos", "mp4"),
        ]);
        assert!(matches!(result, Err(CatalogError::EmptyId(2))));
    }

    #[test]
    fn unknown_entry_field_is_rejected() {
        let result = Catalog::from_toml_str(
            r#"
[[entries]]
id = "a"
title = "x"
category = "documents"
file_type = "pdf"
size = 10
"#,
        );
        assert!(matches!(result, Err(CatalogError::Toml(_))));
    }

    #[test]
    fn categories_in_first_appearance_order() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.categories(),
            vec!["documents", "videos", "photos", "guides", "forms"]
        );
    }

    #[test]
    fn category_all_and_named() {
        assert_eq!(Category::parse("all"), Category::All);
        assert!(Category::All.matches("videos"));
        let videos = Category::parse("videos");
        assert!(videos.matches("videos"));
        assert!(!videos.matches("Videos"));
        assert_eq!(videos.to_string(), "videos");
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Mapa DE Trilhas ", false), "mapa de trilhas");
        assert_eq!(normalize("SEGURANÇA", false), "segurança");
    }

    #[test]
    fn folding_is_opt_in() {
        assert_eq!(normalize("Segurança", true), "seguranca");
        assert_eq!(normalize("Vídeo Técnicas", true), "video tecnicas");
        assert_eq!(normalize("Vídeo", false), "vídeo");
    }

    #[test]
    fn folding_handles_decomposed_text() {
        assert_eq!(normalize("Segurac\u{327}a", true), "seguranca");
        assert_eq!(normalize("Ve\u{301}u de Noiva", true), "veu de noiva");
        assert_eq!(normalize("Kraków Şile", true), "krakow sile");
        // Unfolded text keeps the decomposed marks.
        assert_eq!(normalize("Segurac\u{327}a", false), "segurac\u{327}a");
    }

    #[test]
    fn search_matches_title_description_and_file_type() {
        let e = CatalogEntry {
            id: "g".into(),
            title: "Guia de Trilhas".into(),
            description: "Mapas e descrições".into(),
            category: "guides".into(),
            file_type: "PDF".into(),
        };
        let text = SearchText::new(&e, false);
        assert!(text.contains("trilhas"));
        assert!(text.contains("mapas"));
        assert!(text.contains("pdf"));
        assert!(text.contains(""));
        assert!(!text.contains("video"));
    }

    #[test]
    fn literal_matching_does_not_fold_accents() {
        let catalog = two_entry_catalog();
        let state = FilterState {
            category: Category::All,
            term: normalize("seguranca", false),
        };
        assert!(visible_entries(&catalog, &state, false).is_empty());

        let state = FilterState {
            category: Category::All,
            term: normalize("Segurança", false),
        };
        assert_eq!(ids(&visible_entries(&catalog, &state, false)), vec!["a"]);
    }

    #[test]
    fn folded_matching_finds_unaccented_term() {
        let catalog = two_entry_catalog();
        let state = FilterState {
            category: Category::All,
            term: normalize("seguranca", true),
        };
        assert_eq!(ids(&visible_entries(&catalog, &state, true)), vec!["a"]);
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let catalog = sample_catalog();
        let state = FilterState {
            category: Category::parse("kayak"),
            term: String::new(),
        };
        assert!(visible_entries(&catalog, &state, false).is_empty());
    }

    #[test]
    fn category_and_term_combine() {
        let catalog = sample_catalog();
        let state = FilterState {
            category: Category::parse("videos"),
            term: normalize("segurança", false),
        };
        assert_eq!(
            ids(&visible_entries(&catalog, &state, false)),
            vec!["video-tecnicas"]
        );
    }

    fn ids<'a>(entries: &[&'a CatalogEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }
}
