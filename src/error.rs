//! Error types for leaderboard loading and ranking.

use thiserror::Error;

/// Errors that can occur while loading inputs or ranking a board.
///
/// Missing attributes, empty confidence samples and unknown prices are not
/// errors: they degrade to documented defaults. Only inputs that would poison
/// the ordering (a rating that is not a number) or that cannot be read at all
/// surface here.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A rating could not be coerced to a finite number.
    #[error("invalid rating for {id:?}: {value:?}")]
    InvalidRating { id: String, value: String },

    /// The requested leaderboard category does not exist in the snapshot.
    #[error("unknown category {name:?} (available: {available})")]
    UnknownCategory { name: String, available: String },

    /// A view config or CLI option failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create an invalid rating error.
    pub fn invalid_rating(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidRating {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRating { .. } => "invalid_rating",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}
