//! Dream interpretation requests.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use reverie_shared::normalize::normalize_json;
use reverie_shared::{DreamDraft, DreamInterpretation};

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest, ResponseFormat};
use crate::error::{AiError, Result};
use crate::language::{resolve_language, LanguageDetector, ScriptDetector};
use crate::prompts::{interpretation_user_prompt, INTERPRETATION_SYSTEM_PROMPT};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct InterpretationClient {
    completion: CompletionClient,
    detector: Arc<dyn LanguageDetector>,
    temperature: f32,
}

impl InterpretationClient {
    /// Client using the built-in [`ScriptDetector`].
    pub fn new(completion: CompletionClient) -> Self {
        Self::with_detector(completion, Arc::new(ScriptDetector))
    }

    pub fn with_detector(completion: CompletionClient, detector: Arc<dyn LanguageDetector>) -> Self {
        Self {
            completion,
            detector,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Interpret one dream.
    ///
    /// Fails rather than inventing content: a response that does not decode
    /// into a [`DreamInterpretation`] is an [`AiError::InterpretationParse`].
    pub async fn interpret(
        &self,
        draft: &DreamDraft,
        cancel: &CancellationToken,
    ) -> Result<DreamInterpretation> {
        draft
            .validate()
            .map_err(|e| AiError::InvalidRequest(e.to_string()))?;

        let language = resolve_language(self.detector.as_ref(), &draft.description);
        tracing::info!(%language, intensity = draft.intensity_level, "requesting interpretation");

        let request = CompletionRequest {
            model: self.completion.model().to_string(),
            messages: vec![
                ChatMessage::system(INTERPRETATION_SYSTEM_PROMPT),
                ChatMessage::user(interpretation_user_prompt(draft, &language)),
            ],
            temperature: self.temperature,
            response_format: Some(ResponseFormat::json_object()),
        };

        let raw = self.completion.complete(&request, cancel).await?;
        if cancel.is_cancelled() {
            return Err(AiError::Cancelled);
        }
        if raw.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        parse_interpretation(&raw)
    }
}

/// Decode completion text into an interpretation.
///
/// A `recommendations` array of strings is joined with newlines first.
pub fn parse_interpretation(raw: &str) -> Result<DreamInterpretation> {
    let cleaned = normalize_json(raw);
    let fail = |cause: String| {
        tracing::warn!(%cause, "interpretation did not decode");
        AiError::InterpretationParse {
            cleaned_text: cleaned.clone(),
            cause,
        }
    };

    let mut value: Value = serde_json::from_str(&cleaned).map_err(|e| fail(e.to_string()))?;
    repair_recommendations(&mut value);
    serde_json::from_value(value).map_err(|e| fail(e.to_string()))
}

fn repair_recommendations(value: &mut Value) {
    let Some(field) = value.get_mut("recommendations") else {
        return;
    };
    let Some(items) = field.as_array() else {
        return;
    };
    let Some(lines) = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
    else {
        return;
    };
    *field = Value::String(lines.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FULL: &str = r#"{"dreamName": "N", "quickOverview": "O", "inDepthInterpretation": "I",
        "dailyLifeConnection": "D", "recommendations": "R", "refinedDescription": "F"}"#;

    struct Fixed(&'static str);

    impl LanguageDetector for Fixed {
        fn detect_dominant_language(&self, _text: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn completion_reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    fn client(server: &MockServer, detector: Arc<dyn LanguageDetector>) -> InterpretationClient {
        let completion = CompletionClient::new(CompletionConfig {
            base_url: server.uri(),
            api_key: Some("k".into()),
            model: "m".into(),
        });
        InterpretationClient::with_detector(completion, detector)
    }

    #[test]
    fn array_recommendations_are_joined() {
        let raw = r#"{"recommendations": ["Do X", "Do Y"], "dreamName": "N", "quickOverview": "O",
            "inDepthInterpretation": "I", "dailyLifeConnection": "D"}"#;
        let interp = parse_interpretation(raw).unwrap();
        assert_eq!(interp.recommendations, "Do X\nDo Y");
        assert_eq!(interp.dream_name, "N");
        assert_eq!(interp.quick_overview, "O");
        assert_eq!(interp.in_depth_interpretation, "I");
        assert_eq!(interp.daily_life_connection, "D");
        assert_eq!(interp.refined_description, None);
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let raw = r#"{"quickOverview": "O", "inDepthInterpretation": "I",
            "dailyLifeConnection": "D", "recommendations": "R"}"#;
        match parse_interpretation(raw).unwrap_err() {
            AiError::InterpretationParse { cleaned_text, cause } => {
                assert!(cause.contains("dreamName"), "{cause}");
                assert!(cleaned_text.starts_with('{'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fenced_multiline_json_decodes() {
        let raw = format!("```json\n{FULL}\n```");
        let interp = parse_interpretation(&raw).unwrap();
        assert_eq!(interp.refined_description.as_deref(), Some("F"));
    }

    #[test]
    fn non_json_is_a_parse_error() {
        assert!(matches!(
            parse_interpretation("I'm sorry, I can't help with that."),
            Err(AiError::InterpretationParse { .. })
        ));
    }

    #[tokio::test]
    async fn request_demands_detected_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("MUST be written entirely in German"))
            .and(body_string_contains("json_object"))
            .respond_with(completion_reply(FULL))
            .expect(1)
            .mount(&server)
            .await;

        let draft = DreamDraft::new("Ich war in einem dunklen Wald", Some(true), Some(true), 6);
        let interp = client(&server, Arc::new(Fixed("de")))
            .interpret(&draft, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(interp.dream_name, "N");
    }

    #[tokio::test]
    async fn blank_answer_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion_reply("  \n "))
            .mount(&server)
            .await;

        let draft = DreamDraft::new("A dream about the sea", None, None, 3);
        let err = client(&server, Arc::new(ScriptDetector))
            .interpret(&draft, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion_reply(FULL))
            .expect(0)
            .mount(&server)
            .await;

        let draft = DreamDraft::new("A dream about the sea", None, None, 11);
        let err = client(&server, Arc::new(ScriptDetector))
            .interpret(&draft, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn cancelled_token_discards_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion_reply(FULL))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let draft = DreamDraft::new("A dream about the sea", None, None, 3);
        let err = client(&server, Arc::new(ScriptDetector))
            .interpret(&draft, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Cancelled));
    }
}
