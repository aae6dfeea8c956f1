//! The `gabarito print` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_print::write_exam_html;
use gabarito_providers::load_config_from;

use super::{open_store, resolve_exam, slugify};

pub fn execute(
    id: Option<String>,
    exam_path: Option<PathBuf>,
    answer_key: bool,
    output: Option<PathBuf>,
    store_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config, store_override);
    let exam = resolve_exam(id, exam_path, &store)?;

    let path = output.unwrap_or_else(|| {
        let suffix = if answer_key { "-gabarito" } else { "" };
        config
            .output_dir
            .join(format!("{}{suffix}.html", slugify(&exam.title)))
    });

    write_exam_html(&exam, answer_key, &path)?;
    println!(
        "{} written to: {}",
        if answer_key { "Answer key" } else { "Exam sheet" },
        path.display()
    );
    Ok(())
}
