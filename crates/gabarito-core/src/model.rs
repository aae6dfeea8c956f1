//! Core data model types for gabarito.
//!
//! These are the fundamental types the entire system uses to represent
//! exams, questions, and recognized answer marks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExamValidationError;

/// Number of answer options a freshly added question starts with.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Most options a question can carry: one per letter A..Z.
pub const MAX_OPTION_COUNT: usize = 26;

/// Canonical choice letter for the option at 0-based position `index`.
///
/// The letter is always derived from position and never stored, so
/// reordering or removing options cannot leave stale letters behind.
pub fn option_letter(index: usize) -> char {
    debug_assert!(index < 26, "option index out of letter range");
    (b'A' + index as u8) as char
}

/// 0-based option position denoted by a choice letter, if it is one.
pub fn letter_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| (upper as u8 - b'A') as usize)
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A single multiple-choice assessment item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique, stable identifier, assigned at creation and never reused.
    pub id: String,
    /// Prompt text. May be empty while the exam is being edited.
    #[serde(default)]
    pub text: String,
    /// Optional embedded illustration (data URI or external URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Ordered answer choices; position `i` prints as `option_letter(i)`.
    pub options: Vec<String>,
    /// Letter of the correct option. Must denote an existing position.
    pub correct_answer: char,
    /// Non-negative weight; fractional values allowed.
    pub points: f64,
}

impl Question {
    /// A fresh question in its editing default: four empty options,
    /// answer `A`, one point.
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            text: String::new(),
            image_url: None,
            options: vec![String::new(); DEFAULT_OPTION_COUNT],
            correct_answer: 'A',
            points: 1.0,
        }
    }

    /// 0-based position of the correct option.
    pub fn correct_index(&self) -> Option<usize> {
        letter_index(self.correct_answer).filter(|&i| i < self.options.len())
    }

    /// Append an empty option at the end.
    pub fn push_option(&mut self) {
        self.options.push(String::new());
    }

    /// Remove the option at `index`.
    ///
    /// If the stored answer letter no longer denotes an existing position
    /// afterwards, it is reset to `A`.
    pub fn remove_option(&mut self, index: usize) {
        if index >= self.options.len() {
            return;
        }
        self.options.remove(index);
        let valid = letter_index(self.correct_answer)
            .is_some_and(|i| i < self.options.len());
        if !valid {
            self.correct_answer = 'A';
        }
    }
}

impl Default for Question {
    fn default() -> Self {
        Self::new()
    }
}

/// Print metadata shown on the exam sheet header.
///
/// Display-only: none of these fields affect grading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamHeader {
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub subject: String,
    /// Grade/class label, e.g. "9º A".
    #[serde(default)]
    pub grade: String,
    /// ISO date string (YYYY-MM-DD).
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Aggregate root: an exam and its ordered questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// Unique identifier within the persisted collection.
    pub id: String,
    /// Internal label; the printed sheet shows header fields instead.
    pub title: String,
    /// Creation timestamp in epoch milliseconds. Set once, immutable.
    pub created_at: i64,
    #[serde(default)]
    pub header: ExamHeader,
    /// Order defines question numbering: display number = position + 1.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
            header: ExamHeader {
                date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
                ..ExamHeader::default()
            },
            questions: Vec::new(),
        }
    }

    /// Append a default question and return a reference to it.
    ///
    /// Existing questions are never touched.
    pub fn add_question(&mut self) -> &mut Question {
        self.questions.push(Question::new());
        self.questions.last_mut().unwrap()
    }

    /// Maximum attainable score: the sum of all question weights.
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// The letter alphabet in play, derived from the widest question.
    pub fn choice_letters(&self) -> Vec<char> {
        let widest = self
            .questions
            .iter()
            .map(|q| q.options.len())
            .max()
            .unwrap_or(0);
        (0..widest).map(option_letter).collect()
    }

    /// Check the preconditions for sending this exam to the oracle.
    pub fn ensure_gradeable(&self) -> Result<(), ExamValidationError> {
        if self.questions.is_empty() {
            return Err(ExamValidationError::NoQuestions);
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.is_empty() {
                return Err(ExamValidationError::EmptyOptions { question: i + 1 });
            }
            if q.options.len() > MAX_OPTION_COUNT {
                return Err(ExamValidationError::TooManyOptions {
                    question: i + 1,
                    count: q.options.len(),
                });
            }
            if q.correct_index().is_none() {
                return Err(ExamValidationError::DanglingAnswer {
                    question: i + 1,
                    letter: q.correct_answer,
                });
            }
        }
        Ok(())
    }
}

/// What the oracle read in one answer slot: a choice letter, or one of the
/// two sentinels the sheet reader reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mark {
    /// A single filled choice letter.
    Letter(char),
    /// No mark detected ("BRANCO").
    Blank,
    /// More than one mark detected ("ANULADA").
    Void,
}

impl Mark {
    /// Sentinels can never equal a real letter and always score as wrong.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Mark::Blank | Mark::Void)
    }

    /// Letter marks normalized to uppercase; sentinels unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Mark::Letter(c) => Mark::Letter(c.to_ascii_uppercase()),
            other => other,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Letter(c) => write!(f, "{c}"),
            Mark::Blank => write!(f, "BRANCO"),
            Mark::Void => write!(f, "ANULADA"),
        }
    }
}

impl FromStr for Mark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_uppercase().as_str() {
            "BRANCO" => Ok(Mark::Blank),
            "ANULADA" => Ok(Mark::Void),
            upper => {
                let mut chars = upper.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => Ok(Mark::Letter(c)),
                    _ => Err(format!("unrecognized mark: {trimmed}")),
                }
            }
        }
    }
}

impl TryFrom<String> for Mark {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mark> for String {
    fn from(mark: Mark) -> Self {
        mark.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_derive_from_position() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(letter_index('A'), Some(0));
        assert_eq!(letter_index('e'), Some(4));
        assert_eq!(letter_index('1'), None);
    }

    #[test]
    fn new_question_defaults() {
        let q = Question::new();
        assert_eq!(q.options.len(), DEFAULT_OPTION_COUNT);
        assert_eq!(q.correct_answer, 'A');
        assert_eq!(q.points, 1.0);
        assert!(q.text.is_empty());
        assert!(q.image_url.is_none());
    }

    #[test]
    fn remove_option_resets_dangling_answer() {
        let mut q = Question::new();
        q.correct_answer = 'D';
        q.remove_option(3);
        assert_eq!(q.options.len(), 3);
        assert_eq!(q.correct_answer, 'A');
    }

    #[test]
    fn remove_option_keeps_valid_answer() {
        let mut q = Question::new();
        q.correct_answer = 'B';
        q.remove_option(3);
        assert_eq!(q.correct_answer, 'B');
    }

    #[test]
    fn add_question_appends_without_touching_existing() {
        let mut exam = Exam::new("Prova");
        exam.add_question().text = "first".into();
        exam.add_question();
        assert_eq!(exam.questions.len(), 2);
        assert_eq!(exam.questions[0].text, "first");
        assert_ne!(exam.questions[0].id, exam.questions[1].id);
    }

    #[test]
    fn max_score_sums_points() {
        let mut exam = Exam::new("Prova");
        exam.add_question().points = 1.5;
        exam.add_question().points = 2.0;
        assert_eq!(exam.max_score(), 3.5);
    }

    #[test]
    fn choice_letters_follow_widest_question() {
        let mut exam = Exam::new("Prova");
        assert!(exam.choice_letters().is_empty());
        exam.add_question();
        exam.add_question().push_option();
        assert_eq!(exam.choice_letters(), vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[test]
    fn gradeable_preconditions() {
        let mut exam = Exam::new("Prova");
        assert!(matches!(
            exam.ensure_gradeable(),
            Err(ExamValidationError::NoQuestions)
        ));

        exam.add_question();
        assert!(exam.ensure_gradeable().is_ok());

        exam.questions[0].options.clear();
        assert!(matches!(
            exam.ensure_gradeable(),
            Err(ExamValidationError::EmptyOptions { question: 1 })
        ));

        exam.questions[0].options = vec!["sim".into(), "não".into()];
        exam.questions[0].correct_answer = 'E';
        assert!(matches!(
            exam.ensure_gradeable(),
            Err(ExamValidationError::DanglingAnswer { question: 1, letter: 'E' })
        ));
    }

    #[test]
    fn gradeable_rejects_more_options_than_letters() {
        let mut exam = Exam::new("Prova");
        let q = exam.add_question();
        q.options = vec![String::new(); MAX_OPTION_COUNT + 1];
        assert!(matches!(
            exam.ensure_gradeable(),
            Err(ExamValidationError::TooManyOptions { question: 1, count: 27 })
        ));

        exam.questions[0].options.pop();
        assert!(exam.ensure_gradeable().is_ok());
        assert_eq!(exam.choice_letters().last(), Some(&'Z'));
    }

    #[test]
    fn mark_display_and_parse() {
        assert_eq!(Mark::Letter('A').to_string(), "A");
        assert_eq!(Mark::Blank.to_string(), "BRANCO");
        assert_eq!(Mark::Void.to_string(), "ANULADA");
        assert_eq!("b".parse::<Mark>().unwrap(), Mark::Letter('B'));
        assert_eq!(" branco ".parse::<Mark>().unwrap(), Mark::Blank);
        assert_eq!("ANULADA".parse::<Mark>().unwrap(), Mark::Void);
        assert!("AB".parse::<Mark>().is_err());
        assert!("?".parse::<Mark>().is_err());
    }

    #[test]
    fn mark_serde_round_trip() {
        let json = serde_json::to_string(&Mark::Blank).unwrap();
        assert_eq!(json, "\"BRANCO\"");
        let mark: Mark = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(mark, Mark::Letter('C'));
        assert!(serde_json::from_str::<Mark>("\"XY\"").is_err());
    }

    #[test]
    fn exam_serde_round_trip() {
        let mut exam = Exam::new("Prova de Matemática");
        exam.header.school_name = "Escola Modelo".into();
        let q = exam.add_question();
        q.text = "Quanto é 2 + 2?".into();
        q.options = vec!["3".into(), "4".into(), "5".into(), "6".into()];
        q.correct_answer = 'B';

        let json = serde_json::to_string(&exam).unwrap();
        let back: Exam = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, exam.id);
        assert_eq!(back.created_at, exam.created_at);
        assert_eq!(back.questions[0].correct_answer, 'B');
        assert_eq!(back.header.school_name, "Escola Modelo");
    }
}
