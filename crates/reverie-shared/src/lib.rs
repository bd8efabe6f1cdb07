//! # reverie-shared
//!
//! Domain types and pure logic shared by every Reverie crate: the dream and
//! daily-content data model, the LLM output normalizer, calendar helpers and
//! the streak state machine.  Nothing in here performs I/O.

pub mod calendar;
pub mod constants;
pub mod error;
pub mod normalize;
pub mod streak;
pub mod types;

pub use calendar::{Clock, FixedClock, SystemClock};
pub use error::ValidationError;
pub use streak::{LogOutcome, MilestoneFlags, StreakEngine, StreakState, StreakStatus};
pub use types::*;
