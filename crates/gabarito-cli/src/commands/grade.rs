//! The `gabarito grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;
use comfy_table::{Cell, Table};

use gabarito_core::grading::{reconcile, GradingResult};
use gabarito_core::traits::{RecognizeRequest, SheetImage};
use gabarito_providers::{create_oracle, load_config_from};

use super::{open_store, resolve_exam};

pub async fn execute(
    id: Option<String>,
    exam_path: Option<PathBuf>,
    photo: PathBuf,
    provider: Option<String>,
    model: Option<String>,
    store_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config, store_override);
    let exam = resolve_exam(id, exam_path, &store)?;
    exam.ensure_gradeable()
        .map_err(|e| anyhow::anyhow!("exam '{}' is not gradeable: {e}", exam.title))?;

    let image = load_photo(&photo)?;

    let provider_name = provider.unwrap_or_else(|| config.default_provider.clone());
    let oracle_config = config.providers.get(&provider_name).with_context(|| {
        format!(
            "provider '{provider_name}' not found in config. Available: {:?}",
            config.providers.keys().collect::<Vec<_>>()
        )
    })?;
    let oracle = create_oracle(oracle_config)?;

    let request = RecognizeRequest {
        model: model.unwrap_or_else(|| config.default_model.clone()),
        question_count: exam.questions.len(),
        choice_letters: exam.choice_letters(),
        image,
    };

    eprintln!(
        "Reading answer sheet with {}/{} ({} questions)...",
        oracle.name(),
        request.model,
        request.question_count
    );

    let extraction = match oracle.recognize(&request).await {
        Ok(extraction) => extraction,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(anyhow::Error::new(e).context("sheet recognition failed"));
        }
    };

    let result = reconcile(&exam, &extraction);
    print_result(&exam.title, &result);
    Ok(())
}

fn load_photo(path: &PathBuf) -> Result<SheetImage> {
    let mime_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        other => anyhow::bail!(
            "unsupported photo format {:?}; use a .jpg or .png file",
            other.unwrap_or("none")
        ),
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read photo: {}", path.display()))?;
    Ok(SheetImage {
        mime_type: mime_type.to_string(),
        base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}

fn print_result(exam_title: &str, result: &GradingResult) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Correct", "Read", "Result", "Points"]);

    for m in &result.matches {
        table.add_row(vec![
            Cell::new(m.question_number),
            Cell::new(m.correct_letter),
            Cell::new(&m.student_mark.to_string()),
            Cell::new(if m.is_correct { "OK" } else { "X" }),
            Cell::new(m.points_awarded),
        ]);
    }

    println!("Exam:    {exam_title}");
    println!("Student: {}", result.student_name);
    println!("{table}");
    println!("Score: {} / {}", result.total_score, result.max_score);
}
