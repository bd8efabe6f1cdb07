//! The dream journal.
//!
//! Raw SQL helpers live on [`Database`]; [`DreamRepository`] wraps them with
//! the journal's ordering contract and publishes [`StoreEvent::DreamsChanged`]
//! after every write.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use uuid::Uuid;

use reverie_shared::calendar::{local_day, month_start};
use reverie_shared::DreamEntry;

use crate::database::{lock, Database, SharedDatabase};
use crate::error::{Result, StoreError};
use crate::events::{ChangeNotifier, StoreEvent};

const SELECT_COLUMNS: &str = "SELECT id, description, refined_description, did_wake_up,
        had_negative_emotions, intensity_level, created_at, dream_name, quick_overview,
        in_depth_interpretation, daily_life_connection, recommendations,
        feeling_rating, star_rating
 FROM dreams";

impl Database {
    pub fn upsert_dream(&self, entry: &DreamEntry) -> Result<()> {
        self.conn().execute(
            "INSERT INTO dreams (id, description, refined_description, did_wake_up,
                 had_negative_emotions, intensity_level, created_at, dream_name, quick_overview,
                 in_depth_interpretation, daily_life_connection, recommendations,
                 feeling_rating, star_rating)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                 description = excluded.description,
                 refined_description = excluded.refined_description,
                 did_wake_up = excluded.did_wake_up,
                 had_negative_emotions = excluded.had_negative_emotions,
                 intensity_level = excluded.intensity_level,
                 created_at = excluded.created_at,
                 dream_name = excluded.dream_name,
                 quick_overview = excluded.quick_overview,
                 in_depth_interpretation = excluded.in_depth_interpretation,
                 daily_life_connection = excluded.daily_life_connection,
                 recommendations = excluded.recommendations,
                 feeling_rating = excluded.feeling_rating,
                 star_rating = excluded.star_rating",
            params![
                entry.id.to_string(),
                entry.description,
                entry.refined_description,
                entry.did_wake_up,
                entry.had_negative_emotions,
                entry.intensity_level,
                entry.created_at.to_rfc3339(),
                entry.dream_name,
                entry.quick_overview,
                entry.in_depth_interpretation,
                entry.daily_life_connection,
                entry.recommendations,
                entry.feeling_rating,
                entry.star_rating,
            ],
        )?;
        Ok(())
    }

    /// All dreams, newest first.
    pub fn list_dreams(&self) -> Result<Vec<DreamEntry>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id ASC"))?;
        let rows = stmt.query_map([], row_to_dream)?;

        let mut dreams = Vec::new();
        for row in rows {
            dreams.push(row?);
        }
        // RFC-3339 strings with differing offsets do not sort lexically.
        dreams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(dreams)
    }

    pub fn get_dream_by_id(&self, id: Uuid) -> Result<DreamEntry> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                row_to_dream,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    pub fn delete_dream(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM dreams WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    pub fn delete_all_dreams(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM dreams", [])?)
    }
}

fn row_to_dream(row: &rusqlite::Row<'_>) -> rusqlite::Result<DreamEntry> {
    let id_str: String = row.get(0)?;
    let ts_str: String = row.get(6)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(DreamEntry {
        id,
        description: row.get(1)?,
        refined_description: row.get(2)?,
        did_wake_up: row.get(3)?,
        had_negative_emotions: row.get(4)?,
        intensity_level: row.get(5)?,
        created_at,
        dream_name: row.get(7)?,
        quick_overview: row.get(8)?,
        in_depth_interpretation: row.get(9)?,
        daily_life_connection: row.get(10)?,
        recommendations: row.get(11)?,
        feeling_rating: row.get(12)?,
        star_rating: row.get(13)?,
    })
}

/// Ordered, id-keyed collection of saved dreams.
#[derive(Clone)]
pub struct DreamRepository {
    db: SharedDatabase,
    notifier: ChangeNotifier,
}

impl DreamRepository {
    pub fn new(db: SharedDatabase, notifier: ChangeNotifier) -> Self {
        Self { db, notifier }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Insert, or replace the entry with the same id.
    pub fn save_or_update(&self, entry: &DreamEntry) -> Result<()> {
        lock(&self.db)?.upsert_dream(entry)?;
        tracing::info!(dream_id = %entry.id, "saved dream");
        self.notifier.publish(StoreEvent::DreamsChanged);
        Ok(())
    }

    /// Every entry, most recent `created_at` first.
    pub fn get_all(&self) -> Result<Vec<DreamEntry>> {
        lock(&self.db)?.list_dreams()
    }

    pub fn get_latest(&self, limit: usize) -> Result<Vec<DreamEntry>> {
        let mut dreams = self.get_all()?;
        dreams.truncate(limit);
        Ok(dreams)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<DreamEntry>> {
        match lock(&self.db)?.get_dream_by_id(id) {
            Ok(entry) => Ok(Some(entry)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Entries created on the given local calendar day.
    pub fn get_for_day(&self, day: NaiveDate) -> Result<Vec<DreamEntry>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|entry| local_day(entry.created_at) == day)
            .collect())
    }

    /// Entries bucketed by the first day of their local month, newest first
    /// within each bucket.
    pub fn get_grouped_by_month(&self) -> Result<BTreeMap<NaiveDate, Vec<DreamEntry>>> {
        let mut groups: BTreeMap<NaiveDate, Vec<DreamEntry>> = BTreeMap::new();
        for entry in self.get_all()? {
            groups
                .entry(month_start(local_day(entry.created_at)))
                .or_default()
                .push(entry);
        }
        Ok(groups)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = lock(&self.db)?.delete_dream(id)?;
        tracing::info!(dream_id = %id, removed, "deleted dream");
        self.notifier.publish(StoreEvent::DreamsChanged);
        Ok(removed)
    }

    pub fn delete_all(&self) -> Result<usize> {
        let removed = lock(&self.db)?.delete_all_dreams()?;
        tracing::info!(removed, "cleared dream journal");
        self.notifier.publish(StoreEvent::DreamsChanged);
        Ok(removed)
    }
}
