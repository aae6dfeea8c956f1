//! Deterministic grading: reconciling an oracle extraction against the
//! stored answer key.
//!
//! `reconcile` is a pure function. All recognition uncertainty lives in the
//! extraction it receives; this module only compares letters and tallies
//! points.

use serde::{Deserialize, Serialize};

use crate::extraction::RawExtraction;
use crate::model::{Exam, Mark};

/// Label used when the oracle could not read a student name.
pub const UNIDENTIFIED_STUDENT: &str = "Aluno não identificado";

/// Outcome of grading one photographed answer sheet. Derived and ephemeral,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingResult {
    pub student_name: String,
    pub total_score: f64,
    pub max_score: f64,
    /// One entry per exam question, in exam order.
    pub matches: Vec<QuestionMatch>,
}

/// Per-question reconciliation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMatch {
    pub question_id: String,
    /// 1-based display number.
    pub question_number: u32,
    pub correct_letter: char,
    pub student_mark: Mark,
    pub is_correct: bool,
    /// Full question weight when correct, zero otherwise.
    pub points_awarded: f64,
}

/// Reconcile the oracle's per-question guesses against the answer key.
///
/// Output order follows the exam's question order regardless of the order
/// entries appear in the extraction. A question with no extraction entry
/// scores as blank. Duplicate question numbers are rejected at decode time;
/// if one slips through, the first match wins.
pub fn reconcile(exam: &Exam, extraction: &RawExtraction) -> GradingResult {
    let max_score = exam.max_score();
    let mut total_score = 0.0;

    let matches = exam
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let question_number = (i + 1) as u32;
            let student_mark = extraction
                .answers
                .iter()
                .find(|a| a.question_number == question_number)
                .map(|a| a.mark.normalized())
                .unwrap_or(Mark::Blank);

            let correct_letter = question.correct_answer.to_ascii_uppercase();
            let is_correct = student_mark == Mark::Letter(correct_letter);
            let points_awarded = if is_correct { question.points } else { 0.0 };
            total_score += points_awarded;

            QuestionMatch {
                question_id: question.id.clone(),
                question_number,
                correct_letter,
                student_mark,
                is_correct,
                points_awarded,
            }
        })
        .collect();

    let trimmed = extraction.student_name.trim();
    let student_name = if trimmed.is_empty() {
        UNIDENTIFIED_STUDENT.to_string()
    } else {
        trimmed.to_string()
    };

    GradingResult {
        student_name,
        total_score,
        max_score,
        matches,
    }
}
