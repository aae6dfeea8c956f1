//! The `gabarito validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_core::parser;

pub fn execute(exam_path: PathBuf) -> Result<()> {
    let paths = if exam_path.is_dir() {
        super::toml_files_in(&exam_path)?
    } else {
        vec![exam_path]
    };

    let mut total_warnings = 0;

    for path in &paths {
        let exam = parser::parse_exam_file(path)?;
        println!(
            "Exam: {} ({} questions, max score {})",
            exam.title,
            exam.questions.len(),
            exam.max_score()
        );

        let warnings = parser::validate_exam(&exam);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [question {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
