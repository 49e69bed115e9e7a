// Gemini API client
//
// One blocking generateContent call per prompt. Thinking budget is
// pinned to zero — the tool wants plain completions, not reasoning
// traces. This is a blocking client; the run loop is sequential by
// design.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use haengbal_config::GenSettings;

/// Production API base
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const USER_AGENT: &str = concat!("haengbal/", env!("CARGO_PKG_VERSION"));

/// Error from a generation call
#[derive(Debug)]
pub enum GenError {
    /// No API key available
    MissingKey,
    /// Transport-level failure
    Network(String),
    /// Non-2xx API response
    Api { status: u16, message: String },
    /// The API answered but produced no text
    EmptyResponse,
    /// Response body could not be decoded
    Parse(String),
}

impl std::fmt::Display for GenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenError::MissingKey => write!(f, "API key not configured"),
            GenError::Network(msg) => write!(f, "network error: {}", msg),
            GenError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            GenError::EmptyResponse => write!(f, "empty response from model"),
            GenError::Parse(msg) => write!(f, "failed to parse response: {}", msg),
        }
    }
}

impl std::error::Error for GenError {}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Deserialize)]
struct GoogleError {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: String, settings: &GenSettings) -> Result<Self, GenError> {
        Self::with_base_url(api_key, settings, GEMINI_API_BASE.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        settings: &GenSettings,
        base_url: String,
    ) -> Result<Self, GenError> {
        if api_key.is_empty() {
            return Err(GenError::MissingKey);
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GenError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.effective_model().to_string(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one generation call and return the tidied completion text
    /// (trimmed, period-terminated).
    pub fn generate(&self, prompt: &str) -> Result<String, GenError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GenError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            if let Ok(envelope) = serde_json::from_str::<GoogleError>(&body) {
                return Err(GenError::Api {
                    status: status.as_u16(),
                    message: envelope.error.message,
                });
            }
            return Err(GenError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GenerateResponse = response.json().map_err(|e| GenError::Parse(e.to_string()))?;
        extract_text(body)
    }
}

/// Pull the first candidate's text out of a response.
fn extract_text(response: GenerateResponse) -> Result<String, GenError> {
    let raw: String = response
        .candidates
        .into_iter()
        .next()
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    tidy_result(&raw)
}

/// Trim the completion and guarantee a sentence-terminating period.
pub(crate) fn tidy_result(raw: &str) -> Result<String, GenError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GenError::EmptyResponse);
    }
    let mut text = trimmed.to_string();
    if !text.ends_with('.') {
        text.push('.');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(base_url: String) -> GeminiClient {
        GeminiClient::with_base_url("test-key".to_string(), &GenSettings::default(), base_url)
            .unwrap()
    }

    #[test]
    fn test_tidy_appends_period() {
        assert_eq!(tidy_result("성실합니다").unwrap(), "성실합니다.");
        assert_eq!(tidy_result("  성실합니다.  ").unwrap(), "성실합니다.");
    }

    #[test]
    fn test_tidy_empty_is_error() {
        assert!(matches!(tidy_result("   "), Err(GenError::EmptyResponse)));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"앞부분 "},{"text":"뒷부분"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_text(response).unwrap(), "앞부분 뒷부분.");
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_text(response), Err(GenError::EmptyResponse)));
    }

    #[test]
    fn test_missing_key_rejected_up_front() {
        let err = GeminiClient::new(String::new(), &GenSettings::default()).unwrap_err();
        assert!(matches!(err, GenError::MissingKey));
    }

    #[test]
    fn test_generate_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .body_includes("thinkingBudget");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "candidates": [
                        {"content": {"parts": [{"text": "맡은 일에 최선을 다한다"}]}}
                    ]
                }));
        });

        let result = client(server.base_url()).generate("프롬프트").unwrap();
        assert_eq!(result, "맡은 일에 최선을 다한다.");
        mock.assert();
    }

    #[test]
    fn test_generate_api_error_message_extracted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(400).json_body(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            }));
        });

        let err = client(server.base_url()).generate("프롬프트").unwrap_err();
        match err {
            GenError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_empty_candidates_is_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(serde_json::json!({"candidates": []}));
        });

        let err = client(server.base_url()).generate("프롬프트").unwrap_err();
        assert!(matches!(err, GenError::EmptyResponse));
    }
}
