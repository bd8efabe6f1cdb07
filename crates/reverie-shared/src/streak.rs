//! Day-granular journaling streak.
//!
//! [`StreakEngine`] is a pure state machine: every operation takes the
//! current calendar day as an argument and never reads a clock itself.
//! Persistence lives in `reverie-store`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::previous_day;
use crate::constants::MILESTONES;

/// Persisted counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub best_streak: u32,
    pub last_log_date: Option<NaiveDate>,
}

/// Milestones reached so far and which of them the user has acknowledged.
///
/// Flags are never cleared, even when the streak later breaks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MilestoneFlags {
    #[serde(default)]
    pub unlocked: BTreeSet<u32>,
    #[serde(default)]
    pub shown: BTreeSet<u32>,
}

/// Result of [`StreakEngine::log_today`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// Today was already counted.
    AlreadyLogged,
    /// The streak grew.  `milestone` is set when this log hit one exactly.
    Logged {
        current_streak: u32,
        milestone: Option<u32>,
    },
}

impl LogOutcome {
    pub fn milestone(&self) -> Option<u32> {
        match self {
            Self::Logged { milestone, .. } => *milestone,
            Self::AlreadyLogged => None,
        }
    }
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStatus {
    pub current: u32,
    pub best: u32,
    pub next_milestone: Option<u32>,
    pub previous_milestone: Option<u32>,
    pub progress: f64,
    pub days_until_next: Option<u32>,
    pub at_risk: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakEngine {
    state: StreakState,
    milestones: MilestoneFlags,
}

impl StreakEngine {
    pub fn new(state: StreakState, milestones: MilestoneFlags) -> Self {
        let mut engine = Self { state, milestones };
        // A hand-edited or corrupted store must not violate best >= current.
        engine.state.best_streak = engine.state.best_streak.max(engine.state.current_streak);
        engine
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn milestones(&self) -> &MilestoneFlags {
        &self.milestones
    }

    pub fn current_streak(&self) -> u32 {
        self.state.current_streak
    }

    pub fn best_streak(&self) -> u32 {
        self.state.best_streak
    }

    /// Reset the current streak if the last log is older than yesterday.
    ///
    /// Returns `true` when the streak was broken by this call.
    pub fn check_and_reconcile(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.state.last_log_date else {
            return false;
        };

        if last < previous_day(today) && self.state.current_streak > 0 {
            self.state.current_streak = 0;
            return true;
        }
        false
    }

    /// Count today.  At most one increment per calendar day.
    ///
    /// A stale streak is reconciled first so that a long-lived process which
    /// never reloaded still restarts from one after a gap.
    pub fn log_today(&mut self, today: NaiveDate) -> LogOutcome {
        if self.state.last_log_date == Some(today) {
            return LogOutcome::AlreadyLogged;
        }

        self.check_and_reconcile(today);

        let before = self.state.current_streak;
        let target = next_milestone_after(before);

        self.state.last_log_date = Some(today);
        self.state.current_streak = before + 1;
        self.state.best_streak = self.state.best_streak.max(self.state.current_streak);

        let milestone = target.filter(|m| *m == self.state.current_streak);
        if let Some(m) = milestone {
            self.milestones.unlocked.insert(m);
        }

        LogOutcome::Logged {
            current_streak: self.state.current_streak,
            milestone,
        }
    }

    /// Smallest milestone strictly above the current streak.
    pub fn next_milestone(&self) -> Option<u32> {
        next_milestone_after(self.state.current_streak)
    }

    /// Largest milestone at or below the current streak.
    pub fn previous_milestone(&self) -> Option<u32> {
        MILESTONES
            .iter()
            .rev()
            .copied()
            .find(|m| *m <= self.state.current_streak)
    }

    /// Progress from the previous milestone (or zero) to the next one.
    pub fn progress_fraction(&self) -> f64 {
        let Some(next) = self.next_milestone() else {
            return 1.0;
        };
        let previous = self.previous_milestone().unwrap_or(0);
        let span = f64::from(next - previous);
        let done = f64::from(self.state.current_streak.saturating_sub(previous));
        (done / span).clamp(0.0, 1.0)
    }

    /// True iff the last log was exactly yesterday and a streak is running.
    pub fn will_break_if_not_logged_today(&self, today: NaiveDate) -> bool {
        self.state.current_streak > 0 && self.state.last_log_date == Some(previous_day(today))
    }

    pub fn at_risk(&self, today: NaiveDate) -> bool {
        self.will_break_if_not_logged_today(today)
    }

    pub fn days_until_next_milestone(&self) -> Option<u32> {
        self.next_milestone()
            .map(|next| next - self.state.current_streak)
    }

    pub fn mark_shown(&mut self, milestone: u32) {
        self.milestones.shown.insert(milestone);
    }

    pub fn is_shown(&self, milestone: u32) -> bool {
        self.milestones.shown.contains(&milestone)
    }

    pub fn is_unlocked(&self, milestone: u32) -> bool {
        self.milestones.unlocked.contains(&milestone)
    }

    /// Unlocked milestones whose celebration has not been acknowledged.
    pub fn pending_celebrations(&self) -> Vec<u32> {
        self.milestones
            .unlocked
            .difference(&self.milestones.shown)
            .copied()
            .collect()
    }

    pub fn status(&self, today: NaiveDate) -> StreakStatus {
        StreakStatus {
            current: self.state.current_streak,
            best: self.state.best_streak,
            next_milestone: self.next_milestone(),
            previous_milestone: self.previous_milestone(),
            progress: self.progress_fraction(),
            days_until_next: self.days_until_next_milestone(),
            at_risk: self.will_break_if_not_logged_today(today),
        }
    }
}

fn next_milestone_after(streak: u32) -> Option<u32> {
    MILESTONES.iter().copied().find(|m| *m > streak)
}
