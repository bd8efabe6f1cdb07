use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use reverie_shared::{DreamDraft, DreamEntry};
use reverie_store::StoreEvent;

use super::with_timeout;
use crate::error::{ClientError, Result};
use crate::state::AppState;

/// Result of journaling one dream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedDream {
    pub entry: DreamEntry,
    /// Milestone reached by this log, if any.
    pub milestone: Option<u32>,
}

/// Interpret a dream, save it and count today toward the streak.
///
/// Nothing is saved when interpretation fails or is cancelled.
pub async fn log_dream(
    state: &AppState,
    draft: DreamDraft,
    cancel: &CancellationToken,
) -> Result<LoggedDream> {
    let interpretation = with_timeout(
        state.config.request_timeout,
        state.interpreter.interpret(&draft, cancel),
    )
    .await?;

    let entry = DreamEntry::new(draft, interpretation, state.clock.now());
    state.dreams.save_or_update(&entry)?;

    let milestone = state.streak.log_today()?.milestone();
    if let Some(m) = milestone {
        state.notifier.publish(StoreEvent::MilestoneUnlocked(m));
    }

    info!(dream_id = %entry.id, name = %entry.dream_name, ?milestone, "dream logged");
    Ok(LoggedDream { entry, milestone })
}

/// Attach post-reading ratings to a saved dream.
pub fn rate_dream(
    state: &AppState,
    id: Uuid,
    feeling_rating: Option<u8>,
    star_rating: Option<u8>,
) -> Result<DreamEntry> {
    let entry = state
        .dreams
        .get(id)?
        .ok_or(ClientError::DreamNotFound(id))?
        .with_ratings(feeling_rating, star_rating)?;
    state.dreams.save_or_update(&entry)?;
    Ok(entry)
}

pub fn list_dreams(state: &AppState) -> Result<Vec<DreamEntry>> {
    Ok(state.dreams.get_all()?)
}

pub fn latest_dreams(state: &AppState, limit: usize) -> Result<Vec<DreamEntry>> {
    Ok(state.dreams.get_latest(limit)?)
}

pub fn get_dream(state: &AppState, id: Uuid) -> Result<DreamEntry> {
    state.dreams.get(id)?.ok_or(ClientError::DreamNotFound(id))
}

pub fn dreams_for_day(state: &AppState, day: NaiveDate) -> Result<Vec<DreamEntry>> {
    Ok(state.dreams.get_for_day(day)?)
}

/// Dreams keyed by the first day of their local month.
pub fn dreams_by_month(state: &AppState) -> Result<BTreeMap<NaiveDate, Vec<DreamEntry>>> {
    Ok(state.dreams.get_grouped_by_month()?)
}

pub fn delete_dream(state: &AppState, id: Uuid) -> Result<bool> {
    Ok(state.dreams.delete(id)?)
}

pub fn delete_all_dreams(state: &AppState) -> Result<usize> {
    let removed = state.dreams.delete_all()?;
    info!(removed, "journal cleared");
    Ok(removed)
}
