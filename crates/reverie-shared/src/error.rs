use thiserror::Error;

/// Rejected values when building domain objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Intensity must be between {min} and {max}, got {value}")]
    Intensity { value: u8, min: u8, max: u8 },

    #[error("Feeling rating must be between 1 and {max}, got {value}")]
    FeelingRating { value: u8, max: u8 },

    #[error("Star rating must be between 0 and {max}, got {value}")]
    StarRating { value: u8, max: u8 },

    #[error("Dream description is empty")]
    EmptyDescription,
}
