//! Daily educational content requests.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use reverie_shared::normalize::normalize_text;
use reverie_shared::{Clock, ContentSection, ContentType, DailyContent, SystemClock};

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest, ResponseFormat};
use crate::error::{AiError, Result};
use crate::freeform::{self, default_sections};
use crate::prompts::{freeform_content_prompt, strict_content_prompt, CONTENT_SYSTEM_PROMPT};

pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// How the answer is requested and decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// JSON mode, strictly decoded.  Fails on schema mismatch.
    #[default]
    Strict,
    /// Prose, recovered by the freeform parser.  Never fails to parse.
    Freeform,
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Freeform => "freeform",
        })
    }
}

impl FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "json" => Ok(Self::Strict),
            "freeform" | "prose" => Ok(Self::Freeform),
            other => Err(format!("unknown content mode: {other}")),
        }
    }
}

/// Decoded shape of a strict answer.  Bookkeeping fields are optional.
#[derive(Deserialize)]
struct ContentPayload {
    id: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    title: String,
    introduction: String,
    sections: Vec<ContentSection>,
    conclusion: String,
}

pub struct ContentClient {
    completion: CompletionClient,
    clock: Arc<dyn Clock>,
    temperature: f32,
}

impl ContentClient {
    pub fn new(completion: CompletionClient) -> Self {
        Self::with_clock(completion, Arc::new(SystemClock))
    }

    pub fn with_clock(completion: CompletionClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            completion,
            clock,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fetch a fresh piece of content.  Always hits the network.
    pub async fn fetch_content(
        &self,
        content_type: ContentType,
        mode: ContentMode,
        cancel: &CancellationToken,
    ) -> Result<DailyContent> {
        let (prompt, response_format) = match mode {
            ContentMode::Strict => (
                strict_content_prompt(content_type),
                Some(ResponseFormat::json_object()),
            ),
            ContentMode::Freeform => (freeform_content_prompt(content_type), None),
        };

        tracing::info!(%content_type, %mode, "requesting daily content");

        let request = CompletionRequest {
            model: self.completion.model().to_string(),
            messages: vec![
                ChatMessage::system(CONTENT_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
            temperature: self.temperature,
            response_format,
        };

        let raw = self.completion.complete(&request, cancel).await?;
        if cancel.is_cancelled() {
            return Err(AiError::Cancelled);
        }

        let now = self.clock.now();
        match mode {
            ContentMode::Strict if raw.trim().is_empty() => Err(AiError::EmptyResponse),
            ContentMode::Strict => parse_strict_content(&raw, content_type, now),
            ContentMode::Freeform => Ok(freeform::parse_content_at(&raw, content_type, now)),
        }
    }

    pub async fn fetch_strict(
        &self,
        content_type: ContentType,
        cancel: &CancellationToken,
    ) -> Result<DailyContent> {
        self.fetch_content(content_type, ContentMode::Strict, cancel).await
    }

    pub async fn fetch_freeform(
        &self,
        content_type: ContentType,
        cancel: &CancellationToken,
    ) -> Result<DailyContent> {
        self.fetch_content(content_type, ContentMode::Freeform, cancel).await
    }
}

/// Strictly decode a JSON answer.
///
/// A missing `id` gets a fresh one, a missing or unknown `type` becomes
/// `requested`, and the timestamp is always `now`.
pub fn parse_strict_content(
    raw: &str,
    requested: ContentType,
    now: DateTime<Utc>,
) -> Result<DailyContent> {
    let cleaned = normalize_text(raw);
    let payload: ContentPayload = serde_json::from_str(&cleaned).map_err(|e| {
        tracing::warn!(error = %e, "daily content did not decode");
        AiError::ContentParse {
            cleaned_text: cleaned.clone(),
            cause: e.to_string(),
        }
    })?;

    let content_type = payload
        .content_type
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or(requested);

    let sections = if payload.sections.is_empty() {
        default_sections(content_type)
    } else {
        payload.sections
    };

    let mut content = DailyContent::new(
        content_type,
        payload.title,
        payload.introduction,
        sections,
        payload.conclusion,
        now,
    );
    if let Some(id) = payload.id.filter(|id| !id.trim().is_empty()) {
        content.id = id;
    }
    Ok(content)
}
