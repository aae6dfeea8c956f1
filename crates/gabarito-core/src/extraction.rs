//! Strict decoding of oracle replies.
//!
//! The oracle is asked for a JSON payload, but replies frequently arrive
//! wrapped in incidental markdown code fences. This module strips that
//! wrapping and then validates the payload's shape before anything reaches
//! the scoring engine: question numbers must be in range and unique, and
//! every mark must be a choice letter or a known sentinel.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ExtractionError;
use crate::model::Mark;

/// The oracle's structured guess for one answer sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    /// Best-effort transcription of the student name; may be empty.
    pub student_name: String,
    /// One entry per detected answer slot, at most one per question.
    pub answers: Vec<ExtractedAnswer>,
}

/// One recognized answer slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    /// 1-based question number as printed on the grid.
    pub question_number: u32,
    pub mark: Mark,
}

/// Wire shape of the oracle reply, matching the response schema the
/// extraction policy requests.
#[derive(Debug, Deserialize)]
struct WireExtraction {
    #[serde(default, rename = "studentName")]
    student_name: String,
    #[serde(default)]
    answers: Vec<WireAnswer>,
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    #[serde(rename = "qNum")]
    number: i64,
    #[serde(default)]
    selected: String,
}

/// Peel incidental markdown fences off a reply.
///
/// Prefers a ```json block, falls back to a generic ``` block, and returns
/// the reply untouched when no fences are present. Unclosed blocks keep
/// their accumulated content.
pub fn strip_reply_fences(reply: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json = false;
    let mut is_generic = false;
    let mut current = String::new();

    for line in reply.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json = lang == "json";
            is_generic = lang.is_empty();
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json && json_block.is_none() {
                json_block = Some(current.clone());
            } else if is_generic && generic_block.is_none() {
                generic_block = Some(current.clone());
            }
            current.clear();
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if in_block && !current.is_empty() {
        if is_json && json_block.is_none() {
            json_block = Some(current);
        } else if is_generic && generic_block.is_none() {
            generic_block = Some(current);
        }
    }

    json_block
        .or(generic_block)
        .unwrap_or_else(|| reply.trim().to_string())
}

/// Decode an oracle reply into a validated `RawExtraction`.
///
/// `question_count` bounds the acceptable question numbers; duplicates are
/// rejected here rather than silently resolved downstream.
pub fn decode_extraction(
    reply: &str,
    question_count: usize,
) -> Result<RawExtraction, ExtractionError> {
    if reply.trim().is_empty() {
        return Err(ExtractionError::EmptyReply);
    }

    let payload = strip_reply_fences(reply);
    let wire: WireExtraction = serde_json::from_str(&payload)
        .map_err(|e| ExtractionError::MalformedReply(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut answers = Vec::with_capacity(wire.answers.len());
    for entry in wire.answers {
        if entry.number < 1 || entry.number > question_count as i64 {
            return Err(ExtractionError::QuestionOutOfRange {
                number: entry.number,
                count: question_count,
            });
        }
        let number = entry.number as u32;
        if !seen.insert(number) {
            return Err(ExtractionError::DuplicateQuestion(number));
        }
        let mark: Mark = entry
            .selected
            .parse()
            .map_err(|_| ExtractionError::InvalidMark(entry.selected.clone()))?;
        answers.push(ExtractedAnswer {
            question_number: number,
            mark: mark.normalized(),
        });
    }

    Ok(RawExtraction {
        student_name: wire.student_name.trim().to_string(),
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_REPLY: &str = r#"{
        "studentName": "Maria Souza",
        "answers": [
            {"qNum": 1, "selected": "A"},
            {"qNum": 2, "selected": "BRANCO"},
            {"qNum": 3, "selected": "anulada"}
        ]
    }"#;

    #[test]
    fn decode_plain_json() {
        let extraction = decode_extraction(PLAIN_REPLY, 3).unwrap();
        assert_eq!(extraction.student_name, "Maria Souza");
        assert_eq!(extraction.answers.len(), 3);
        assert_eq!(extraction.answers[0].mark, Mark::Letter('A'));
        assert_eq!(extraction.answers[1].mark, Mark::Blank);
        assert_eq!(extraction.answers[2].mark, Mark::Void);
    }

    #[test]
    fn decode_fence_wrapped_json() {
        let wrapped = format!("Aqui está o resultado:\n```json\n{PLAIN_REPLY}\n```\n");
        let extraction = decode_extraction(&wrapped, 3).unwrap();
        assert_eq!(extraction.answers.len(), 3);
    }

    #[test]
    fn decode_generic_fence() {
        let wrapped = format!("```\n{PLAIN_REPLY}\n```");
        assert!(decode_extraction(&wrapped, 3).is_ok());
    }

    #[test]
    fn decode_unclosed_fence() {
        let wrapped = format!("```json\n{PLAIN_REPLY}");
        assert!(decode_extraction(&wrapped, 3).is_ok());
    }

    #[test]
    fn empty_reply_rejected() {
        assert!(matches!(
            decode_extraction("   \n", 3),
            Err(ExtractionError::EmptyReply)
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            decode_extraction("not json at all", 3),
            Err(ExtractionError::MalformedReply(_))
        ));
    }

    #[test]
    fn out_of_range_question_rejected() {
        let reply = r#"{"studentName": "", "answers": [{"qNum": 4, "selected": "A"}]}"#;
        assert!(matches!(
            decode_extraction(reply, 3),
            Err(ExtractionError::QuestionOutOfRange { number: 4, count: 3 })
        ));
    }

    #[test]
    fn zero_question_number_rejected() {
        let reply = r#"{"answers": [{"qNum": 0, "selected": "A"}]}"#;
        assert!(matches!(
            decode_extraction(reply, 3),
            Err(ExtractionError::QuestionOutOfRange { number: 0, .. })
        ));
    }

    #[test]
    fn duplicate_question_rejected() {
        let reply = r#"{"answers": [
            {"qNum": 1, "selected": "A"},
            {"qNum": 1, "selected": "B"}
        ]}"#;
        assert!(matches!(
            decode_extraction(reply, 3),
            Err(ExtractionError::DuplicateQuestion(1))
        ));
    }

    #[test]
    fn invalid_mark_rejected() {
        let reply = r#"{"answers": [{"qNum": 1, "selected": "A e B"}]}"#;
        assert!(matches!(
            decode_extraction(reply, 3),
            Err(ExtractionError::InvalidMark(_))
        ));
    }

    #[test]
    fn missing_name_decodes_to_empty() {
        let reply = r#"{"answers": []}"#;
        let extraction = decode_extraction(reply, 3).unwrap();
        assert!(extraction.student_name.is_empty());
        assert!(extraction.answers.is_empty());
    }

    #[test]
    fn letters_are_normalized_to_uppercase() {
        let reply = r#"{"answers": [{"qNum": 1, "selected": "c"}]}"#;
        let extraction = decode_extraction(reply, 1).unwrap();
        assert_eq!(extraction.answers[0].mark, Mark::Letter('C'));
    }
}
