//! Error types for recognition and validation.
//!
//! `RecognitionError` is defined here rather than in `gabarito-providers` so
//! that callers can classify failures without string matching on provider
//! output.

use thiserror::Error;

/// Errors produced while decoding an oracle reply into a `RawExtraction`.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The oracle returned no usable text at all.
    #[error("oracle reply was empty")]
    EmptyReply,

    /// The reply payload is not valid JSON of the expected shape.
    #[error("oracle reply is not valid JSON: {0}")]
    MalformedReply(String),

    /// An answer entry referenced a question outside `1..=count`.
    #[error("question number {number} is outside 1..={count}")]
    QuestionOutOfRange { number: i64, count: usize },

    /// The oracle reported more than one entry for the same question.
    #[error("duplicate entry for question {0}")]
    DuplicateQuestion(u32),

    /// A reported mark is neither a choice letter nor a known sentinel.
    #[error("unrecognized mark {0:?}")]
    InvalidMark(String),
}

/// Errors that can occur when invoking a vision oracle.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// A network error occurred before a response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the client timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The oracle responded, but the reply could not be decoded.
    #[error(transparent)]
    Reply(#[from] ExtractionError),
}

impl RecognitionError {
    /// Actionable message shown to the person holding the camera. The
    /// recognition step fails loud and is retried manually, never
    /// automatically.
    pub fn user_message(&self) -> &'static str {
        "Falha ao processar a imagem. Certifique-se que a foto está nítida e focada no gabarito."
    }
}

/// Preconditions an exam must satisfy before it can be sent for grading.
///
/// These are rejected before any oracle call is made.
#[derive(Debug, Error)]
pub enum ExamValidationError {
    /// Grading an exam with no questions is meaningless.
    #[error("exam has no questions")]
    NoQuestions,

    /// A question with no options cannot appear on an answer grid.
    #[error("question {question} has no options")]
    EmptyOptions { question: usize },

    /// Letters only go up to Z, so the grid cannot label more options.
    #[error("question {question} has {count} options, more than the 26 letters A..Z")]
    TooManyOptions { question: usize, count: usize },

    /// The stored answer letter does not denote an existing option.
    #[error("question {question}: correct answer '{letter}' does not match any option")]
    DanglingAnswer { question: usize, letter: char },
}
