use thiserror::Error;

/// Failures of a completion round trip.
#[derive(Error, Debug)]
pub enum AiError {
    /// No response was received (DNS, TLS, connection reset, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    /// A 2xx answer without usable completion text.
    #[error("Empty response from completion endpoint")]
    EmptyResponse,

    /// The interpretation JSON did not match the schema.
    #[error("Could not parse dream interpretation: {cause}")]
    InterpretationParse { cleaned_text: String, cause: String },

    /// The daily content JSON did not match the schema.
    #[error("Could not parse daily content: {cause}")]
    ContentParse { cleaned_text: String, cause: String },

    /// The caller cancelled before the response was handled.
    #[error("Request cancelled")]
    Cancelled,

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    /// Whether showing a "try again" affordance makes sense.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_) | Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, AiError>;
