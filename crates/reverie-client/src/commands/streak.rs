use reverie_shared::StreakStatus;

use crate::error::Result;
use crate::state::AppState;

/// Reconcile breakage, then snapshot the tracker.
///
/// Hosts call this when the app returns to the foreground so a streak that
/// lapsed overnight shows as broken.
pub fn streak_status(state: &AppState) -> Result<StreakStatus> {
    state.streak.check_and_reconcile()?;
    Ok(state.streak.status()?)
}

/// Milestones reached but not yet celebrated, in ascending order.
pub fn pending_celebrations(state: &AppState) -> Result<Vec<u32>> {
    Ok(state.streak.pending_celebrations()?)
}

/// Record that the celebration for `milestone` was shown.
pub fn acknowledge_milestone(state: &AppState, milestone: u32) -> Result<()> {
    state.streak.mark_shown(milestone)?;
    Ok(())
}
