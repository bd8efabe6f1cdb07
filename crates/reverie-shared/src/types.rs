//! Domain model: journaled dreams, interpretations and daily learning content.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be stored in
//! the local database and handed to the presentation layer unchanged.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_FEELING_RATING, MAX_INTENSITY, MAX_STAR_RATING, MIN_INTENSITY};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Dream draft (user input before interpretation)
// ---------------------------------------------------------------------------

/// What the user typed in before asking for an interpretation.
///
/// The two tri-state answers are `None` when the user skipped the question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DreamDraft {
    pub description: String,
    pub did_wake_up: Option<bool>,
    pub had_negative_emotions: Option<bool>,
    pub intensity_level: u8,
}

impl DreamDraft {
    pub fn new(
        description: impl Into<String>,
        did_wake_up: Option<bool>,
        had_negative_emotions: Option<bool>,
        intensity_level: u8,
    ) -> Self {
        Self {
            description: description.into(),
            did_wake_up,
            had_negative_emotions,
            intensity_level,
        }
    }

    /// Reject drafts that cannot be sent for interpretation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.intensity_level) {
            return Err(ValidationError::Intensity {
                value: self.intensity_level,
                min: MIN_INTENSITY,
                max: MAX_INTENSITY,
            });
        }
        Ok(())
    }
}

/// Render a tri-state answer the way prompts and exports show it.
pub fn tri_state_label(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Not specified",
    }
}

// ---------------------------------------------------------------------------
// Dream interpretation
// ---------------------------------------------------------------------------

/// Normalized result of one interpretation request.
///
/// The five text fields are required when decoding; a payload missing any of
/// them is rejected rather than padded with defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DreamInterpretation {
    pub dream_name: String,
    pub quick_overview: String,
    pub in_depth_interpretation: String,
    pub daily_life_connection: String,
    pub recommendations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_description: Option<String>,
}

// ---------------------------------------------------------------------------
// Dream entry
// ---------------------------------------------------------------------------

/// One journaled dream.
///
/// Equality and hashing use `id` only: two values with the same id are the
/// same entry even if other fields have drifted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamEntry {
    pub id: Uuid,
    pub description: String,
    #[serde(default)]
    pub refined_description: Option<String>,
    pub did_wake_up: Option<bool>,
    pub had_negative_emotions: Option<bool>,
    pub intensity_level: u8,
    pub created_at: DateTime<Utc>,
    pub dream_name: String,
    pub quick_overview: String,
    pub in_depth_interpretation: String,
    pub daily_life_connection: String,
    pub recommendations: String,
    pub feeling_rating: Option<u8>,
    pub star_rating: Option<u8>,
}

impl DreamEntry {
    /// Fold an accepted interpretation into a new journal entry.
    pub fn new(draft: DreamDraft, interpretation: DreamInterpretation, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: draft.description,
            refined_description: interpretation.refined_description,
            did_wake_up: draft.did_wake_up,
            had_negative_emotions: draft.had_negative_emotions,
            intensity_level: draft.intensity_level,
            created_at: now,
            dream_name: interpretation.dream_name,
            quick_overview: interpretation.quick_overview,
            in_depth_interpretation: interpretation.in_depth_interpretation,
            daily_life_connection: interpretation.daily_life_connection,
            recommendations: interpretation.recommendations,
            feeling_rating: None,
            star_rating: None,
        }
    }

    /// Attach the user's post-reading ratings.
    pub fn with_ratings(
        mut self,
        feeling_rating: Option<u8>,
        star_rating: Option<u8>,
    ) -> Result<Self, ValidationError> {
        if let Some(value) = feeling_rating {
            if !(1..=MAX_FEELING_RATING).contains(&value) {
                return Err(ValidationError::FeelingRating {
                    value,
                    max: MAX_FEELING_RATING,
                });
            }
        }
        if let Some(value) = star_rating {
            if value > MAX_STAR_RATING {
                return Err(ValidationError::StarRating {
                    value,
                    max: MAX_STAR_RATING,
                });
            }
        }
        self.feeling_rating = feeling_rating;
        self.star_rating = star_rating;
        Ok(self)
    }

    /// Text shown in the journal: the refined variant when one was returned.
    pub fn display_description(&self) -> &str {
        match self.refined_description.as_deref() {
            Some(refined) if !refined.trim().is_empty() => refined,
            _ => &self.description,
        }
    }
}

impl PartialEq for DreamEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DreamEntry {}

impl Hash for DreamEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Daily content
// ---------------------------------------------------------------------------

/// The three kinds of generated learning content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    #[default]
    DailyRitual,
    LucidDreaming,
    DreamingFact,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [
        ContentType::DailyRitual,
        ContentType::LucidDreaming,
        ContentType::DreamingFact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyRitual => "dailyRitual",
            Self::LucidDreaming => "lucidDreaming",
            Self::DreamingFact => "dreamingFact",
        }
    }

    /// Human-readable topic used in prompts and canned fallbacks.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DailyRitual => "Daily Dream Ritual",
            Self::LucidDreaming => "Lucid Dreaming Lesson",
            Self::DreamingFact => "Dream Fact",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown content type: {s}"))
    }
}

/// One heading/body pair of a [`DailyContent`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentSection {
    pub heading: String,
    pub content: String,
}

impl ContentSection {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }
}

/// A generated educational item.
///
/// `sections` keeps display order and is never empty once produced by the
/// content pipeline.  `timestamp` is the generation time; cache freshness is
/// decided by the calendar day it falls on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyContent {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub introduction: String,
    pub sections: Vec<ContentSection>,
    pub conclusion: String,
    pub timestamp: DateTime<Utc>,
}

impl DailyContent {
    pub fn new(
        content_type: ContentType,
        title: impl Into<String>,
        introduction: impl Into<String>,
        sections: Vec<ContentSection>,
        conclusion: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content_type,
            title: title.into(),
            introduction: introduction.into(),
            sections,
            conclusion: conclusion.into(),
            timestamp,
        }
    }
}
