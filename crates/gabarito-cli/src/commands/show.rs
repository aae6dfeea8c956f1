//! The `gabarito show` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gabarito_core::model::option_letter;
use gabarito_providers::load_config_from;

pub fn execute(
    id: String,
    store_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = super::open_store(&config, store_override);

    let exam = store
        .get(&id)
        .with_context(|| format!("no saved exam with id '{id}'"))?;

    println!("Title:    {}", exam.title);
    println!("Id:       {}", exam.id);
    if !exam.header.school_name.is_empty() {
        println!("School:   {}", exam.header.school_name);
    }
    if !exam.header.subject.is_empty() {
        println!("Subject:  {}", exam.header.subject);
    }
    println!("Max score: {}", exam.max_score());

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Options", "Answer", "Points"]);
    for (i, q) in exam.questions.iter().enumerate() {
        let options = q
            .options
            .iter()
            .enumerate()
            .map(|(oi, o)| format!("{}) {o}", option_letter(oi)))
            .collect::<Vec<_>>()
            .join("  ");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&q.text),
            Cell::new(options),
            Cell::new(q.correct_answer),
            Cell::new(q.points),
        ]);
    }
    println!("{table}");

    Ok(())
}
