//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric**. Each material is shown by its title and
//! positional index, with its id and description as indented context lines,
//! so the output reads as a catalog inventory rather than a data dump.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 Documentos (2 materials)
//!     001 Manual de Segurança [pdf]
//!         Id: manual-seguranca
//!         Guia completo de segurança para aventuras. Contém...
//!
//! Catalog: 10 materials in 5 categories
//! ```
//!
//! ## Filter
//!
//! ```text
//! Filter: category=videos search="segurança"
//! 001 Vídeo: Técnicas de Segurança [video]
//!     Id: video-tecnicas
//!
//! 1 de 10 materiais para "segurança" em Vídeos
//! ```
//!
//! ## Replay
//!
//! ```text
//! search and clear (until 3000 ms)
//!       100 ms  catalog  search cues on
//!       480 ms  catalog  status "5 de 10 materiais para \"equipamentos\"" [searching]
//!       480 ms  catalog  fade regulamento-geral
//!       780 ms  catalog  hide regulamento-geral
//! Final
//!     Hero: none
//!     Gallery: none
//!     Catalog: 2 visible, 3 recomputes
//!         2 de 10 materiais em Fotos
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalog::{Catalog, CatalogEntry, FilterState};
use crate::config::SiteConfig;
use crate::scenario::{Target, Transcript};
use crate::status::Status;
use crate::view::ViewEvent;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Header + context lines for one material.
///
/// ```text
/// 001 Manual de Segurança [pdf]
///     Id: manual-seguranca
///     Guia completo de segurança para aventuras. Contém...
/// ```
fn entry_lines(index: usize, entry: &CatalogEntry, depth: usize) -> Vec<String> {
    let base = indent(depth);
    let mut lines = vec![
        format!("{}{} {} [{}]", base, format_index(index), entry.title, entry.file_type),
        format!("{}    Id: {}", base, entry.id),
    ];
    let desc = truncate_desc(entry.description.trim(), 50);
    if !desc.is_empty() {
        lines.push(format!("{}    {}", base, desc));
    }
    lines
}

// ============================================================================
// Check
// ============================================================================

/// Catalog inventory grouped by category, in first-appearance order.
pub fn format_catalog_inventory(catalog: &Catalog, config: &SiteConfig) -> Vec<String> {
    let mut lines = Vec::new();
    let categories = catalog.categories();

    lines.push("Categories".to_string());
    for (i, slug) in categories.iter().enumerate() {
        let members: Vec<&CatalogEntry> = catalog
            .entries()
            .iter()
            .filter(|e| e.category == *slug)
            .collect();
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            config.category_label(slug),
            plural(members.len(), "material", "materials")
        ));
        if !config.categories.contains_key(*slug) {
            lines.push(format!("    Warning: no label configured for '{slug}'"));
        }
        for (j, entry) in members.iter().enumerate() {
            lines.extend(entry_lines(j + 1, entry, 1));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Catalog: {} in {}",
        plural(catalog.len(), "material", "materials"),
        plural(categories.len(), "category", "categories")
    ));
    lines
}

pub fn print_catalog_inventory(catalog: &Catalog, config: &SiteConfig) {
    for line in format_catalog_inventory(catalog, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Visible materials for a one-shot filter, followed by the status line.
pub fn format_filter_result(
    state: &FilterState,
    visible: &[&CatalogEntry],
    status: &Status,
) -> Vec<String> {
    let mut lines = Vec::new();
    let search = if state.term.is_empty() {
        String::new()
    } else {
        format!(" search=\"{}\"", state.term)
    };
    lines.push(format!("Filter: category={}{}", state.category, search));
    for (i, entry) in visible.iter().enumerate() {
        lines.extend(entry_lines(i + 1, entry, 0));
    }
    lines.push(String::new());
    lines.push(status.text.clone());
    lines
}

pub fn print_filter_result(state: &FilterState, visible: &[&CatalogEntry], status: &Status) {
    for line in format_filter_result(state, visible, status) {
        println!("{}", line);
    }
}

// ============================================================================
// Replay
// ============================================================================

fn region_name(region: Target) -> &'static str {
    match region {
        Target::Hero => "hero",
        Target::Gallery => "gallery",
        Target::Catalog => "catalog",
    }
}

fn on_off(active: bool) -> &'static str {
    if active { "on" } else { "off" }
}

/// One-line description of a view write.
fn describe_event(event: &ViewEvent) -> String {
    match event {
        ViewEvent::Slide { index, active } => format!("slide {} {}", index, on_off(*active)),
        ViewEvent::Indicator { index, active } => {
            format!("indicator {} {}", index, on_off(*active))
        }
        ViewEvent::Position { index, total } => format!("position {} / {}", index + 1, total),
        ViewEvent::Layout { entry, in_layout } => {
            let verb = if *in_layout { "place" } else { "hide" };
            format!("{} {}", verb, entry)
        }
        ViewEvent::Reveal { entry, revealed } => {
            let verb = if *revealed { "reveal" } else { "fade" };
            format!("{} {}", verb, entry)
        }
        ViewEvent::Status { text, tone } => {
            let class = tone.css_class();
            if class.is_empty() {
                format!("status {:?}", text)
            } else {
                format!("status {:?} [{}]", text, class)
            }
        }
        ViewEvent::Category { slug } => format!("category {}", slug),
        ViewEvent::SearchText { text } => format!("search field {:?}", text),
        ViewEvent::SearchCues { active } => format!("search cues {}", on_off(*active)),
        ViewEvent::Focus { select } => {
            if *select {
                "focus search (select)".to_string()
            } else {
                "focus search".to_string()
            }
        }
        ViewEvent::Blur => "blur search".to_string(),
    }
}

/// Timestamped transcript of a replay plus where each region ended up.
pub fn format_transcript(transcript: &Transcript) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} (until {} ms)",
        transcript.name, transcript.until_ms
    ));
    for event in &transcript.events {
        lines.push(format!(
            "{}{:>6} ms  {:<8} {}",
            indent(1),
            event.at_ms,
            region_name(event.region),
            describe_event(&event.event)
        ));
    }

    let state = &transcript.final_state;
    let slide = |index: Option<usize>| match index {
        Some(i) => format!("slide {}", i),
        None => "none".to_string(),
    };
    lines.push("Final".to_string());
    lines.push(format!("{}Hero: {}", indent(1), slide(state.hero_index)));
    lines.push(format!("{}Gallery: {}", indent(1), slide(state.gallery_index)));
    lines.push(format!(
        "{}Catalog: {} visible, {}",
        indent(1),
        state.visible.len(),
        plural(state.recomputes, "recompute", "recomputes")
    ));
    if let Some(status) = &state.status {
        lines.push(format!("{}{}", indent(2), status));
    }
    lines
}

pub fn print_transcript(transcript: &Transcript) {
    for line in format_transcript(transcript) {
        println!("{}", line);
    }
}
