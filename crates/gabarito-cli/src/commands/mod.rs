//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gabarito_core::model::Exam;
use gabarito_providers::GabaritoConfig;
use gabarito_store::ExamStore;

pub mod grade;
pub mod init;
pub mod list;
pub mod new;
pub mod print;
pub mod remove;
pub mod save;
pub mod show;
pub mod validate;

/// Open the collection, preferring an explicit `--store` over the config.
pub(crate) fn open_store(config: &GabaritoConfig, store_override: Option<PathBuf>) -> ExamStore {
    ExamStore::new(store_override.unwrap_or_else(|| config.store_path.clone()))
}

/// Resolve the exam a command operates on: a saved one by `--id`, or an
/// exam file given with `--exam`.
pub(crate) fn resolve_exam(
    id: Option<String>,
    exam_path: Option<PathBuf>,
    store: &ExamStore,
) -> Result<Exam> {
    match (id, exam_path) {
        (Some(id), None) => store
            .get(&id)
            .with_context(|| format!("no saved exam with id '{id}'")),
        (None, Some(path)) => gabarito_core::parser::parse_exam_file(&path),
        (Some(_), Some(_)) => anyhow::bail!("pass either --id or --exam, not both"),
        (None, None) => anyhow::bail!("pass --id <saved exam> or --exam <file.toml>"),
    }
}

/// File-system friendly name derived from an exam title.
pub(crate) fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    let mut out = String::with_capacity(slug.len());
    let mut prev_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    if out.is_empty() {
        "prova".to_string()
    } else {
        out
    }
}

/// All `.toml` files in a directory, sorted by name.
pub(crate) fn toml_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Prova de Matemática"), "prova-de-matemática");
        assert_eq!(slugify("  1º Bimestre!  "), "1º-bimestre");
        assert_eq!(slugify("***"), "prova");
    }
}
