//! The `gabarito list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gabarito_providers::load_config_from;

pub fn execute(store_override: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = super::open_store(&config, store_override);

    let exams = store.list();
    if exams.is_empty() {
        println!("No saved exams. Run `gabarito save --exam <file.toml>` to add one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Questions", "Max score", "Created"]);

    for exam in &exams {
        let created = chrono::DateTime::from_timestamp_millis(exam.created_at)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string());
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.title),
            Cell::new(exam.questions.len()),
            Cell::new(exam.max_score()),
            Cell::new(created),
        ]);
    }

    println!("{table}");
    Ok(())
}
