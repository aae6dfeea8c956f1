//! The vision oracle contract.
//!
//! A `VisionOracle` receives one photographed answer sheet plus the exam's
//! question count and letter alphabet, and returns a validated extraction.
//! Implementations live in the `gabarito-providers` crate.

use async_trait::async_trait;

use crate::error::RecognitionError;
use crate::extraction::RawExtraction;

/// An external image-understanding service constrained to the OMR
/// extraction contract.
#[async_trait]
pub trait VisionOracle: Send + Sync {
    /// Human-readable oracle name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Read one answer sheet. Exactly one service call per invocation;
    /// no retry and no streaming.
    async fn recognize(
        &self,
        request: &RecognizeRequest,
    ) -> Result<RawExtraction, RecognitionError>;
}

/// A still-image encoding of a single answer sheet.
#[derive(Debug, Clone)]
pub struct SheetImage {
    /// MIME type of the encoded bytes, e.g. "image/jpeg".
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub base64_data: String,
}

impl SheetImage {
    pub fn jpeg(base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            base64_data: base64_data.into(),
        }
    }
}

/// Request to read one answer sheet.
#[derive(Debug, Clone)]
pub struct RecognizeRequest {
    /// Model identifier (e.g. "gemini-3-pro-image-preview").
    pub model: String,
    /// Number of answer slots on the printed grid; bounds the oracle's
    /// search and the decode validation.
    pub question_count: usize,
    /// Choice letters in play, derived from the exam.
    pub choice_letters: Vec<char>,
    pub image: SheetImage,
}

/// Fixed extraction policy sent as the oracle's system instruction.
///
/// Wording tuned against hallucinated marks: the oracle must report
/// "ANULADA" for multiple marks and "BRANCO" for none, never guess.
pub fn extraction_policy(question_count: usize, choice_letters: &[char]) -> String {
    let letters: Vec<String> = choice_letters.iter().map(|c| c.to_string()).collect();
    let letters = letters.join(", ");
    format!(
        "Você é um scanner de gabaritos ópticos (OMR) de alta precisão.\n\
         Sua tarefa é extrair as respostas marcadas em uma folha de respostas.\n\
         \n\
         Parâmetros:\n\
         - Total de questões: {question_count}.\n\
         - Opções possíveis: {letters}.\n\
         \n\
         Regras de leitura:\n\
         1. Localize a grade de respostas numerada de 1 a {question_count}.\n\
         2. Identifique qual bolinha/letra está preenchida (pintada) ou marcada com um X forte.\n\
         3. Se houver mais de uma marcação na mesma linha, retorne \"ANULADA\".\n\
         4. Se não houver marcação, retorne \"BRANCO\".\n\
         5. Tente ler o nome do aluno escrito no cabeçalho. Se ilegível, retorne \"Aluno não identificado\".\n\
         \n\
         Responda somente com JSON no formato:\n\
         {{\"studentName\": string, \"answers\": [{{\"qNum\": int, \"selected\": string}}]}}"
    )
}

/// The user-facing part of the request, paired with the image.
pub fn extraction_request_text(question_count: usize) -> String {
    format!(
        "Analise a imagem. Extraia o nome do aluno e as respostas para as questões de 1 a {question_count}."
    )
}
