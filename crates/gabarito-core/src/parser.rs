//! TOML exam authoring parser.
//!
//! Exams are authored as TOML files and loaded into the data model here.
//! Structural problems that would break grading are hard errors; cosmetic
//! gaps surface as validation warnings.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{letter_index, option_letter, Exam, ExamHeader, Question, MAX_OPTION_COUNT};

/// Intermediate TOML structure for exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamSection,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamSection {
    /// Stable id; generated when absent so re-saving an edited file
    /// upserts instead of duplicating.
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    header: TomlHeader,
}

#[derive(Debug, Default, Deserialize)]
struct TomlHeader {
    #[serde(default)]
    school_name: String,
    #[serde(default)]
    teacher_name: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    grade: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    image_url: Option<String>,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default = "default_points")]
    points: f64,
}

fn default_points() -> f64 {
    1.0
}

/// Parse an exam TOML file.
pub fn parse_exam_file(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;
    parse_exam_str(&content, path)
}

/// Parse an exam TOML string (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut exam = Exam::new(parsed.exam.title);
    if let Some(id) = parsed.exam.id {
        exam.id = id;
    }
    let header = parsed.exam.header;
    exam.header = ExamHeader {
        school_name: header.school_name,
        teacher_name: header.teacher_name,
        subject: header.subject,
        grade: header.grade,
        date: if header.date.is_empty() {
            exam.header.date.clone()
        } else {
            header.date
        },
        instructions: header.instructions,
        logo_url: header.logo_url,
    };

    for (i, q) in parsed.questions.into_iter().enumerate() {
        let number = i + 1;
        anyhow::ensure!(!q.options.is_empty(), "question {number} has no options");
        anyhow::ensure!(
            q.options.len() <= MAX_OPTION_COUNT,
            "question {number} has {} options, more than the {MAX_OPTION_COUNT} letters A..Z",
            q.options.len()
        );
        anyhow::ensure!(
            q.points >= 0.0,
            "question {number} has negative points ({})",
            q.points
        );

        let mut letters = q.correct_answer.trim().chars();
        let letter = match (letters.next(), letters.next()) {
            (Some(c), None) => c.to_ascii_uppercase(),
            _ => anyhow::bail!(
                "question {number}: correct_answer must be a single letter, got {:?}",
                q.correct_answer
            ),
        };
        let position = letter_index(letter).filter(|&p| p < q.options.len());
        anyhow::ensure!(
            position.is_some(),
            "question {number}: correct_answer '{letter}' does not match any of the {} options (A..{})",
            q.options.len(),
            option_letter(q.options.len() - 1)
        );

        let mut question = Question::new();
        if let Some(id) = q.id {
            question.id = id;
        }
        question.text = q.text;
        question.image_url = q.image_url;
        question.options = q.options;
        question.correct_answer = letter;
        question.points = q.points;
        exam.questions.push(question);
    }

    Ok(exam)
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number, when the warning concerns one.
    pub question: Option<usize>,
    pub message: String,
}

/// Validate an exam for common authoring gaps.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.header.school_name.trim().is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "header has no school name".into(),
        });
    }
    if exam.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "exam has no questions".into(),
        });
    }

    for (i, q) in exam.questions.iter().enumerate() {
        let number = i + 1;
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(number),
                message: "question text is empty".into(),
            });
        }
        if q.options.iter().any(|o| o.trim().is_empty()) {
            warnings.push(ValidationWarning {
                question: Some(number),
                message: "one or more options are empty".into(),
            });
        }
        if q.points == 0.0 {
            warnings.push(ValidationWarning {
                question: Some(number),
                message: "question is worth zero points".into(),
            });
        }
    }

    warnings
}
