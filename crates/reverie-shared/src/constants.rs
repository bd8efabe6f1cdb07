/// Streak lengths (in consecutive calendar days) that unlock a celebration.
pub const MILESTONES: [u32; 4] = [10, 21, 60, 90];

/// Lowest accepted dream intensity.
pub const MIN_INTENSITY: u8 = 1;

/// Highest accepted dream intensity.
pub const MAX_INTENSITY: u8 = 10;

/// Highest feeling rating (ratings start at 1).
pub const MAX_FEELING_RATING: u8 = 5;

/// Highest star rating (ratings start at 0).
pub const MAX_STAR_RATING: u8 = 5;

/// Descriptions shorter than this are assumed to be English.
pub const MIN_DETECTABLE_CHARS: usize = 10;

/// Prefix length used for the second language detection attempt.
pub const DETECTION_RETRY_CHARS: usize = 100;

/// Language assumed when detection is skipped or yields nothing.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Title used when freeform content never names one.
pub const DEFAULT_CONTENT_TITLE: &str = "Dream Insight";
