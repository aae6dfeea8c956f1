//! Google Gemini vision oracle.
//!
//! Sends the sheet photograph as inline JPEG data together with the fixed
//! extraction policy, requesting a JSON reply, and runs the reply through
//! the strict decoder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gabarito_core::error::RecognitionError;
use gabarito_core::extraction::{decode_extraction, RawExtraction};
use gabarito_core::traits::{
    extraction_policy, extraction_request_text, RecognizeRequest, VisionOracle,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini generateContent oracle.
pub struct GeminiOracle {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiOracle {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(api_key: &str, base_url: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client,
        }
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
enum GeminiPart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inline_data")]
    InlineData { mime_type: String, data: String },
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f64,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiReplyContent,
}

#[derive(Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Deserialize)]
struct GeminiReplyPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl VisionOracle for GeminiOracle {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model, questions = request.question_count))]
    async fn recognize(
        &self,
        request: &RecognizeRequest,
    ) -> Result<RawExtraction, RecognitionError> {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart::Text(extraction_policy(
                    request.question_count,
                    &request.choice_letters,
                ))],
            },
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::InlineData {
                        mime_type: request.image.mime_type.clone(),
                        data: request.image.base64_data.clone(),
                    },
                    GeminiPart::Text(extraction_request_text(request.question_count)),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.0,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecognitionError::Timeout(self.timeout_secs)
                } else {
                    RecognitionError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(RecognitionError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(RecognitionError::ModelNotFound(request.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RecognitionError::Api { status, message });
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| RecognitionError::Api {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let reply: String = api_response
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(decode_extraction(&reply, request.question_count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gabarito_core::error::ExtractionError;
    use gabarito_core::model::Mark;
    use gabarito_core::traits::SheetImage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sheet_request() -> RecognizeRequest {
        RecognizeRequest {
            model: "gemini-3-pro-image-preview".into(),
            question_count: 3,
            choice_letters: vec!['A', 'B', 'C', 'D'],
            image: SheetImage::jpeg("Zm90bw=="),
        }
    }

    fn reply_with_text(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    #[tokio::test]
    async fn successful_recognition() {
        let server = MockServer::start().await;
        let payload = r#"{"studentName": "Maria", "answers": [
            {"qNum": 1, "selected": "A"},
            {"qNum": 2, "selected": "BRANCO"}
        ]}"#;

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-3-pro-image-preview:generateContent",
            ))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text(payload)))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("test-key", Some(server.uri()));
        let extraction = oracle.recognize(&sheet_request()).await.unwrap();
        assert_eq!(extraction.student_name, "Maria");
        assert_eq!(extraction.answers.len(), 2);
        assert_eq!(extraction.answers[1].mark, Mark::Blank);
    }

    #[tokio::test]
    async fn fence_wrapped_reply_is_decoded() {
        let server = MockServer::start().await;
        let payload = "```json\n{\"studentName\": \"\", \"answers\": [{\"qNum\": 1, \"selected\": \"C\"}]}\n```";

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text(payload)))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("test-key", Some(server.uri()));
        let extraction = oracle.recognize(&sheet_request()).await.unwrap();
        assert_eq!(extraction.answers[0].mark, Mark::Letter('C'));
    }

    #[tokio::test]
    async fn empty_reply_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("test-key", Some(server.uri()));
        let err = oracle.recognize(&sheet_request()).await.unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::Reply(ExtractionError::EmptyReply)
        ));
    }

    #[tokio::test]
    async fn malformed_reply_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with_text("desculpe, não entendi a imagem")),
            )
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("test-key", Some(server.uri()));
        let err = oracle.recognize(&sheet_request()).await.unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::Reply(ExtractionError::MalformedReply(_))
        ));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("key invalid"))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("bad-key", Some(server.uri()));
        let err = oracle.recognize(&sheet_request()).await.unwrap_err();
        assert!(matches!(err, RecognitionError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::new("test-key", Some(server.uri()));
        let err = oracle.recognize(&sheet_request()).await.unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::RateLimited {
                retry_after_ms: 7000
            }
        ));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with_text("{}"))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_timeout("test-key", Some(server.uri()), 1);
        let err = oracle.recognize(&sheet_request()).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Timeout(1)));
    }

    #[tokio::test]
    async fn user_message_is_actionable() {
        let err = RecognitionError::Network("boom".into());
        assert!(err.user_message().contains("foto"));
    }
}
