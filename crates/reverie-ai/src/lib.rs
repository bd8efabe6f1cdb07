//! Language-model integration for Reverie.
//!
//! Both clients make a single, non-retrying round trip to an OpenAI-style
//! chat completion endpoint and turn the answer into domain types:
//! [`InterpretationClient`] produces a strictly decoded
//! [`DreamInterpretation`](reverie_shared::DreamInterpretation), while
//! [`ContentClient`] produces [`DailyContent`](reverie_shared::DailyContent)
//! either strictly or through the never-failing [`freeform`] parser.

pub mod cancel;
pub mod completion;
pub mod content;
pub mod error;
pub mod freeform;
pub mod interpret;
pub mod language;
pub mod prompts;

pub use cancel::or_cancel;
pub use completion::{CompletionClient, CompletionConfig};
pub use content::{ContentClient, ContentMode};
pub use error::{AiError, Result};
pub use interpret::InterpretationClient;
pub use language::{LanguageDetector, ScriptDetector};
pub use tokio_util::sync::CancellationToken;
