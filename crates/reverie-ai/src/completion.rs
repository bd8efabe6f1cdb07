//! Chat completion transport.
//!
//! Speaks the OpenAI-compatible `POST {base_url}/chat/completions` contract:
//! `{model, messages, temperature, response_format?}` in,
//! `{choices: [{message: {content}}]}` or `{error: {message, type?, code?}}` out.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::cancel::or_cancel;
use crate::error::{AiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".into(),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<serde_json::Value>,
}

/// Endpoint settings.
#[derive(Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

/// Thin HTTP client for the completion endpoint.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS, tests).
    pub fn with_client(http: reqwest::Client, config: CompletionConfig) -> Self {
        Self { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| AiError::InvalidRequest("API key is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send one request and return the first choice's text.
    ///
    /// Blank text is returned as is; only a missing choice, message or
    /// content is an [`AiError::EmptyResponse`].
    ///
    /// Cancelling `cancel` aborts the in-flight request and drops whatever
    /// was received.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let headers = self.headers()?;
        let endpoint = self.endpoint();

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            json_mode = request.response_format.is_some(),
            "sending completion request"
        );

        let round_trip = async move {
            let response = self
                .http
                .post(&endpoint)
                .headers(headers)
                .json(request)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, AiError>((status, body))
        };

        let (status, body) = or_cancel(cancel, round_trip).await??;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "completion response");

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &body));
        }

        extract_content(&body)
    }
}

fn http_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|response| {
            let detail = response.error;
            tracing::warn!(
                status,
                error_type = ?detail.error_type,
                code = ?detail.code,
                "completion endpoint returned an error"
            );
            detail.message.filter(|m| !m.trim().is_empty())
        })
        .unwrap_or_else(|| format!("unknown API error (status {status})"));

    AiError::Http { status, message }
}

fn extract_content(body: &str) -> Result<String> {
    let response: CompletionResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "completion body is not a completion response");
            return Err(AiError::EmptyResponse);
        }
    };

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(AiError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CompletionClient {
        CompletionClient::new(CompletionConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".into()),
            model: "test-model".into(),
        })
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.5,
            response_format: Some(ResponseFormat::json_object()),
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn extracts_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            AiError::Http { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_error_body_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            AiError::Http { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "unknown API error (status 502)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn blank_content_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": ""}}]
            })))
            .mount(&server)
            .await;

        let text = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn null_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let client = CompletionClient::new(CompletionConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key: None,
            model: "m".into(),
        });
        let err = client
            .complete(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Network(_)));
    }

    #[tokio::test]
    async fn cancellation_aborts_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(std::time::Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client(&server).complete(&request(), &token).await.unwrap_err();
        assert!(matches!(err, AiError::Cancelled));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = CompletionConfig {
            api_key: Some("sk-secret".into()),
            ..CompletionConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
