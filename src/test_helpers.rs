//! Shared test utilities for the trilha test suite.
//!
//! Provides catalog builders (the ten sample downloads and a two-entry
//! catalog used by the literal-search cases) and on-disk fixture helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let catalog = sample_catalog();
//! assert_eq!(find_entry(&catalog, "guia-trilhas").category, "guides");
//!
//! let tmp = setup_fixtures();
//! let path = tmp.path().join("catalog.toml");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::catalog::{Catalog, CatalogEntry};

// =========================================================================
// Catalog builders
// =========================================================================

/// Entry with an empty description.
pub fn entry(id: &str, title: &str, category: &str, file_type: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        category: category.to_string(),
        file_type: file_type.to_string(),
    }
}

fn described(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    file_type: &str,
) -> CatalogEntry {
    CatalogEntry {
        description: description.to_string(),
        ..entry(id, title, category, file_type)
    }
}

/// The ten sample downloads, two per category.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        described(
            "manual-seguranca",
            "Manual de Segurança",
            "Guia completo de segurança para aventuras. Contém informações essenciais sobre equipamentos de proteção, procedimentos de emergência e boas práticas.",
            "documents",
            "pdf",
        ),
        described(
            "regulamento-geral",
            "Regulamento Geral",
            "Regras e normas para participação em aventuras. Documento oficial com todas as diretrizes e políticas da empresa.",
            "documents",
            "pdf",
        ),
        described(
            "video-tecnicas",
            "Vídeo: Técnicas de Segurança",
            "Tutorial completo sobre técnicas de segurança em aventuras. Demonstrações práticas de uso de equipamentos e procedimentos.",
            "videos",
            "video",
        ),
        described(
            "video-equipamentos",
            "Vídeo: Como Usar Equipamentos",
            "Demonstração prática do uso correto dos equipamentos de aventura. Passo a passo detalhado para iniciantes.",
            "videos",
            "video",
        ),
        described(
            "fotos-equipamentos",
            "Pack Fotos: Equipamentos",
            "Galeria com todos os equipamentos utilizados nas aventuras. Imagens em alta resolução para referência.",
            "photos",
            "image",
        ),
        described(
            "fotos-tecnicas",
            "Pack Fotos: Técnicas",
            "Imagens demonstrativas de técnicas de aventura. Material visual para apoio ao aprendizado.",
            "photos",
            "image",
        ),
        described(
            "guia-equipamentos",
            "Guia de Equipamentos",
            "Lista completa de equipamentos necessários para cada tipo de aventura. Inclui especificações técnicas e recomendações.",
            "guides",
            "pdf",
        ),
        described(
            "guia-trilhas",
            "Guia de Trilhas",
            "Mapas e descrições detalhadas das trilhas disponíveis. Informações sobre dificuldade, duração e pontos de interesse.",
            "guides",
            "pdf",
        ),
        described(
            "ficha-inscricao",
            "Ficha de Inscrição",
            "Formulário padrão para inscrição em aventuras. Documento em PDF editável para preenchimento.",
            "forms",
            "pdf",
        ),
        described(
            "termo-responsabilidade",
            "Termo de Responsabilidade",
            "Documento obrigatório para participação em aventuras. Termo de responsabilidade e isenção de riscos.",
            "forms",
            "pdf",
        ),
    ])
    .unwrap()
}

/// `a` = "Manual de Segurança" (documents), `b` = "Vídeo Técnicas" (videos).
pub fn two_entry_catalog() -> Catalog {
    Catalog::new(vec![
        entry("a", "Manual de Segurança", "documents", "pdf"),
        entry("b", "Vídeo Técnicas", "videos", "mp4"),
    ])
    .unwrap()
}

/// Find an entry by id. Panics if not found.
pub fn find_entry<'a>(catalog: &'a Catalog, id: &str) -> &'a CatalogEntry {
    catalog.get(id).unwrap_or_else(|| {
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        panic!("entry '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Serialize `catalog` to `dir/name` and return the path.
pub fn write_catalog(dir: &Path, name: &str, catalog: &Catalog) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, toml::to_string(catalog).unwrap()).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_catalog_matches_builder() {
        let tmp = setup_fixtures();
        let loaded = Catalog::load(&tmp.path().join("catalog.toml")).unwrap();
        assert_eq!(loaded.entries(), sample_catalog().entries());
    }

    #[test]
    fn written_catalog_loads_back() {
        let tmp = TempDir::new().unwrap();
        let path = write_catalog(tmp.path(), "c.toml", &two_entry_catalog());
        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(find_entry(&loaded, "b").title, "Vídeo Técnicas");
    }
}
