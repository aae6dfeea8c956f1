//! Anthropic vision oracle.
//!
//! Alternative backend: same extraction contract, delivered through the
//! Messages API with a base64 image block.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gabarito_core::error::RecognitionError;
use gabarito_core::extraction::{decode_extraction, RawExtraction};
use gabarito_core::traits::{
    extraction_policy, extraction_request_text, RecognizeRequest, VisionOracle,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 2048;

/// Anthropic Messages API oracle.
pub struct AnthropicOracle {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl AnthropicOracle {
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
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicBlock {
    Image { source: AnthropicImageSource },
    Text { text: String },
}

#[derive(Serialize)]
struct AnthropicImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[async_trait]
impl VisionOracle for AnthropicOracle {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model, questions = request.question_count))]
    async fn recognize(
        &self,
        request: &RecognizeRequest,
    ) -> Result<RawExtraction, RecognitionError> {
        let body = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: MAX_TOKENS,
            system: extraction_policy(request.question_count, &request.choice_letters),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![
                    AnthropicBlock::Image {
                        source: AnthropicImageSource {
                            source_type: "base64".to_string(),
                            media_type: request.image.mime_type.clone(),
                            data: request.image.base64_data.clone(),
                        },
                    },
                    AnthropicBlock::Text {
                        text: extraction_request_text(request.question_count),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
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
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(RecognitionError::ModelNotFound(request.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RecognitionError::Api { status, message });
        }

        let api_response: AnthropicResponse =
            response.json().await.map_err(|e| RecognitionError::Api {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let reply = api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default();

        Ok(decode_extraction(&reply, request.question_count)?)
    }
}
