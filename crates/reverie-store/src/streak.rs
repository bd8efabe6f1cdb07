//! Persisted streak engine.
//!
//! [`StreakStore`] loads the counters and milestone flags once, reconciles
//! breakage immediately, and writes back after every mutation.

use std::sync::{Arc, Mutex, MutexGuard};

use reverie_shared::{Clock, LogOutcome, MilestoneFlags, StreakEngine, StreakState, StreakStatus};

use crate::database::{lock, Database, SharedDatabase};
use crate::error::{Result, StoreError};

const STATE_KEY: &str = "streak.state";
const MILESTONES_KEY: &str = "streak.milestones";

impl Database {
    /// Read the stored engine.  Unreadable values fall back to a fresh state.
    pub fn load_streak(&self) -> Result<StreakEngine> {
        let state: StreakState = self.kv_decode_or_default(STATE_KEY)?;
        let milestones: MilestoneFlags = self.kv_decode_or_default(MILESTONES_KEY)?;
        Ok(StreakEngine::new(state, milestones))
    }

    fn kv_decode_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.kv_get(key) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(StoreError::Json(e)) => {
                tracing::warn!(key, error = %e, "unreadable stored value, starting over");
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save_streak(&self, engine: &StreakEngine) -> Result<()> {
        self.kv_put(STATE_KEY, engine.state())?;
        self.kv_put(MILESTONES_KEY, engine.milestones())?;
        Ok(())
    }
}

pub struct StreakStore {
    db: SharedDatabase,
    clock: Arc<dyn Clock>,
    engine: Mutex<StreakEngine>,
}

impl StreakStore {
    /// Load persisted state and run breakage reconciliation.
    pub fn load(db: SharedDatabase, clock: Arc<dyn Clock>) -> Result<Self> {
        let engine = lock(&db)?.load_streak()?;
        let store = Self {
            db,
            clock,
            engine: Mutex::new(engine),
        };
        store.check_and_reconcile()?;
        Ok(store)
    }

    fn engine(&self) -> Result<MutexGuard<'_, StreakEngine>> {
        self.engine.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn persist(&self, engine: &StreakEngine) -> Result<()> {
        lock(&self.db)?.save_streak(engine)
    }

    /// Apply `change` to a copy of the engine and keep it only once stored.
    ///
    /// A failed write leaves the in-memory engine untouched, so the same
    /// operation can be retried.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut StreakEngine) -> T,
        dirty: impl FnOnce(&T) -> bool,
    ) -> Result<T> {
        let mut engine = self.engine()?;
        let mut next = engine.clone();
        let out = change(&mut next);
        if dirty(&out) {
            self.persist(&next)?;
            *engine = next;
        }
        Ok(out)
    }

    /// Break the streak if the last log is older than yesterday.
    pub fn check_and_reconcile(&self) -> Result<bool> {
        let today = self.clock.today();
        let broken = self.commit(|engine| engine.check_and_reconcile(today), |broken| *broken)?;
        if broken {
            tracing::info!(best = self.best_streak()?, "streak broken");
        }
        Ok(broken)
    }

    /// Count today's journaling.  Idempotent within a calendar day.
    pub fn log_today(&self) -> Result<LogOutcome> {
        let today = self.clock.today();
        let outcome = self.commit(
            |engine| engine.log_today(today),
            |outcome| matches!(outcome, LogOutcome::Logged { .. }),
        )?;

        if let LogOutcome::Logged {
            current_streak,
            milestone,
        } = outcome
        {
            tracing::info!(current_streak, ?milestone, "logged today");
        }
        Ok(outcome)
    }

    pub fn current_streak(&self) -> Result<u32> {
        Ok(self.engine()?.current_streak())
    }

    pub fn best_streak(&self) -> Result<u32> {
        Ok(self.engine()?.best_streak())
    }

    pub fn next_milestone(&self) -> Result<Option<u32>> {
        Ok(self.engine()?.next_milestone())
    }

    pub fn previous_milestone(&self) -> Result<Option<u32>> {
        Ok(self.engine()?.previous_milestone())
    }

    pub fn progress_fraction(&self) -> Result<f64> {
        Ok(self.engine()?.progress_fraction())
    }

    pub fn will_break_if_not_logged_today(&self) -> Result<bool> {
        Ok(self
            .engine()?
            .will_break_if_not_logged_today(self.clock.today()))
    }

    pub fn days_until_next_milestone(&self) -> Result<Option<u32>> {
        Ok(self.engine()?.days_until_next_milestone())
    }

    pub fn mark_shown(&self, milestone: u32) -> Result<()> {
        self.commit(|engine| engine.mark_shown(milestone), |_| true)
    }

    pub fn is_shown(&self, milestone: u32) -> Result<bool> {
        Ok(self.engine()?.is_shown(milestone))
    }

    pub fn pending_celebrations(&self) -> Result<Vec<u32>> {
        Ok(self.engine()?.pending_celebrations())
    }

    pub fn status(&self) -> Result<StreakStatus> {
        Ok(self.engine()?.status(self.clock.today()))
    }
}
