//! The `gabarito save` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_core::parser;
use gabarito_providers::load_config_from;

pub fn execute(
    exam_path: PathBuf,
    store_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = super::open_store(&config, store_override);

    let mut exam = parser::parse_exam_file(&exam_path)?;
    let existing = store.get(&exam.id);
    let replacing = existing.is_some();
    // created_at is set once at creation; re-saving an edited file must not
    // rewrite it.
    if let Some(existing) = existing {
        exam.created_at = existing.created_at;
    }
    store.upsert(&exam)?;

    println!(
        "{} '{}' ({} questions) [id: {}]",
        if replacing { "Updated" } else { "Saved" },
        exam.title,
        exam.questions.len(),
        exam.id
    );
    Ok(())
}
