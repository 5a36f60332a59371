//! Error types for srs-engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using ScheduleError.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors that can occur while scheduling or configuring the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid rating: {0}")]
    InvalidRating(String),

    #[error("corrupt schedule state for item {id}: {reason}")]
    CorruptScheduleState { id: i64, reason: &'static str },

    #[error("clock skew for item {id}: now {now} is before last review {last_review_at}")]
    ClockSkew {
        id: i64,
        last_review_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("due date for item {id} is out of range: {interval_days} days after {now}")]
    DueDateOutOfRange {
        id: i64,
        interval_days: f64,
        now: DateTime<Utc>,
    },
}
