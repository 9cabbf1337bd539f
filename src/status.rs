//! Results line shown under the catalog search box.
//!
//! [`describe`] is a pure function of the visible count, the total count, the
//! active search term, and the active category label. The wording follows the
//! site's Portuguese copy:
//!
//! | Situation | Text | Tone |
//! |---|---|---|
//! | empty catalog | `0 de 0 materiais` (+ suffixes) | no-results |
//! | no term, all categories | `Mostrando todos os 12 materiais` | all |
//! | nothing visible, with term | `Nenhum resultado encontrado para "x"` (+ category) | no-results |
//! | nothing visible, no term | `Nenhum item nesta categoria` | no-results |
//! | otherwise | `3 de 12 materiais para "x" em Guias` | searching |

use serde::Serialize;
use std::fmt;

/// Visual treatment of the results line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    All,
    Searching,
    NoResults,
}

impl Tone {
    /// CSS class applied to the results element.
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::All => "",
            Tone::Searching => "searching",
            Tone::NoResults => "no-results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub text: String,
    pub tone: Tone,
    pub visible: usize,
    pub total: usize,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build the results line.
///
/// `term` is the normalized search term (empty for none). `category_label` is
/// the display name of the selected category, or `None` when all categories
/// are selected.
pub fn describe(
    visible: usize,
    total: usize,
    term: &str,
    category_label: Option<&str>,
) -> Status {
    let term_suffix = if term.is_empty() {
        String::new()
    } else {
        format!(" para \"{term}\"")
    };
    let category_suffix = category_label
        .map(|label| format!(" em {label}"))
        .unwrap_or_default();

    let (text, tone) = if total == 0 {
        (
            format!("0 de 0 materiais{term_suffix}{category_suffix}"),
            Tone::NoResults,
        )
    } else if term.is_empty() && category_label.is_none() {
        (format!("Mostrando todos os {total} materiais"), Tone::All)
    } else if visible == 0 {
        let text = if term.is_empty() {
            "Nenhum item nesta categoria".to_string()
        } else {
            format!("Nenhum resultado encontrado para \"{term}\"{category_suffix}")
        };
        (text, Tone::NoResults)
    } else {
        (
            format!("{visible} de {total} materiais{term_suffix}{category_suffix}"),
            Tone::Searching,
        )
    };

    Status {
        text,
        tone,
        visible,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showing_everything() {
        let s = describe(10, 10, "", None);
        assert_eq!(s.text, "Mostrando todos os 10 materiais");
        assert_eq!(s.tone, Tone::All);
        assert_eq!(s.tone.css_class(), "");
    }

    #[test]
    fn category_only() {
        let s = describe(1, 2, "", Some("Vídeos"));
        assert_eq!(s.text, "1 de 2 materiais em Vídeos");
        assert_eq!(s.tone, Tone::Searching);
    }

    #[test]
    fn term_and_category() {
        let s = describe(3, 12, "trilha", Some("Guias"));
        assert_eq!(s.text, "3 de 12 materiais para \"trilha\" em Guias");
    }

    #[test]
    fn term_only() {
        let s = describe(4, 12, "pdf", None);
        assert_eq!(s.text, "4 de 12 materiais para \"pdf\"");
    }

    #[test]
    fn no_results_for_term() {
        let s = describe(0, 12, "caiaque", None);
        assert_eq!(s.text, "Nenhum resultado encontrado para \"caiaque\"");
        assert_eq!(s.tone, Tone::NoResults);
        assert_eq!(s.tone.css_class(), "no-results");
    }

    #[test]
    fn no_results_for_term_in_category() {
        let s = describe(0, 12, "caiaque", Some("Fotos"));
        assert_eq!(
            s.text,
            "Nenhum resultado encontrado para \"caiaque\" em Fotos"
        );
    }

    #[test]
    fn empty_category() {
        let s = describe(0, 12, "", Some("Todos"));
        assert_eq!(s.text, "Nenhum item nesta categoria");
        assert_eq!(s.tone, Tone::NoResults);
    }

    #[test]
    fn empty_catalog_is_zero_of_zero_regardless_of_filters() {
        assert_eq!(describe(0, 0, "", None).text, "0 de 0 materiais");
        assert_eq!(
            describe(0, 0, "mapa", Some("Guias")).text,
            "0 de 0 materiais para \"mapa\" em Guias"
        );
        assert!(describe(0, 0, "", Some("Fotos")).text.starts_with("0 de 0"));
    }

    #[test]
    fn display_is_text() {
        assert_eq!(describe(2, 5, "", Some("Guias")).to_string(), "2 de 5 materiais em Guias");
    }
}
