//! One persisted slot of daily content per content type.
//!
//! A slot is only served on the local calendar day its content was generated
//! on.  Stale or undecodable slots read as a miss so the caller re-fetches.

use std::sync::Arc;

use reverie_shared::calendar::local_day;
use reverie_shared::{Clock, ContentType, DailyContent};

use crate::database::{lock, SharedDatabase};
use crate::error::Result;

const KEY_PREFIX: &str = "content_cache.";

fn slot_key(content_type: ContentType) -> String {
    format!("{KEY_PREFIX}{}", content_type.as_str())
}

#[derive(Clone)]
pub struct ContentCache {
    db: SharedDatabase,
    clock: Arc<dyn Clock>,
}

impl ContentCache {
    pub fn new(db: SharedDatabase, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Today's content for `content_type`, if it has been fetched today.
    pub fn get(&self, content_type: ContentType) -> Result<Option<DailyContent>> {
        let key = slot_key(content_type);
        let Some(json) = lock(&self.db)?.kv_get_raw(&key)? else {
            return Ok(None);
        };

        let content: DailyContent = match serde_json::from_str(&json) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(%content_type, error = %e, "discarding unreadable cached content");
                return Ok(None);
            }
        };

        let today = self.clock.today();
        if local_day(content.timestamp) != today {
            tracing::debug!(%content_type, generated = %content.timestamp, "cached content is stale");
            return Ok(None);
        }

        Ok(Some(content))
    }

    /// Overwrite the slot for `content_type`.
    pub fn put(&self, content_type: ContentType, content: &DailyContent) -> Result<()> {
        lock(&self.db)?.kv_put(&slot_key(content_type), content)?;
        tracing::debug!(%content_type, content_id = %content.id, "cached daily content");
        Ok(())
    }

    pub fn clear(&self, content_type: ContentType) -> Result<()> {
        lock(&self.db)?.kv_delete(&slot_key(content_type))?;
        Ok(())
    }
}
