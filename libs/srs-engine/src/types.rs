//! Core types for the scheduling engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Item learning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for LearningState {
    fn default() -> Self {
        Self::New
    }
}

impl LearningState {
    /// Whether the item sits on the learning or relearning ladder.
    pub fn is_mid_ladder(self) -> bool {
        matches!(self, Self::Learning | Self::Relearning)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
        }
    }
}

impl fmt::Display for LearningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// All ratings, hardest first.
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map 2-point rating to 4-point.
    /// Wrong -> Again, Correct -> Good
    pub fn from_2point(correct: bool) -> Self {
        if correct { Self::Good } else { Self::Again }
    }

    pub fn is_success(self) -> bool {
        self != Self::Again
    }

    /// Signed distance from Good, used by the memory model.
    pub(crate) fn offset_from_good(self) -> f64 {
        f64::from(self.to_value()) - 3.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_value(value).ok_or_else(|| ScheduleError::InvalidRating(value.to_string()))
    }
}

impl FromStr for Rating {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Self::Again),
            "hard" | "2" => Ok(Self::Hard),
            "good" | "3" => Ok(Self::Good),
            "easy" | "4" => Ok(Self::Easy),
            _ => Err(ScheduleError::InvalidRating(s.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(name)
    }
}

/// Schedule snapshot of one learning item.
///
/// This is the at-rest record: the storage layer persists it as-is and hands
/// it back on the next review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewableItem {
    pub id: i64,
    pub learning_state: LearningState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// Interval chosen at the most recent scheduling, in (possibly fractional) days.
    pub scheduled_days: f64,
    /// Current ladder step while learning or relearning.
    #[serde(default)]
    pub step: u32,
    pub reps: u32,
    pub lapses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_at: Option<DateTime<Utc>>,
    pub due_at: DateTime<Utc>,
}

impl ReviewableItem {
    /// Create a never-reviewed item, due immediately.
    pub fn new(id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            learning_state: LearningState::New,
            stability: None,
            difficulty: None,
            scheduled_days: 0.0,
            step: 0,
            reps: 0,
            lapses: 0,
            last_review_at: None,
            due_at: now,
        }
    }

    /// Days since the last review, or `ClockSkew` if `now` precedes it.
    pub fn checked_elapsed_days(&self, now: DateTime<Utc>) -> Result<f64> {
        let Some(last) = self.last_review_at else {
            return Ok(0.0);
        };
        if now < last {
            return Err(ScheduleError::ClockSkew {
                id: self.id,
                last_review_at: last,
                now,
            });
        }
        Ok(duration_to_days(now - last))
    }

    /// Days since the last review, clamped to zero.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
        self.checked_elapsed_days(now).unwrap_or(0.0)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.learning_state.is_mid_ladder() || self.due_at <= now
    }
}

/// Record of one scheduling event, for review history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub item_id: i64,
    pub rating: Rating,
    pub state_before: LearningState,
    pub state_after: LearningState,
    pub reviewed_at: DateTime<Utc>,
    pub elapsed_days: f64,
    pub interval_before: f64,
    pub interval_after: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability_before: Option<f64>,
    pub stability_after: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_before: Option<f64>,
    pub difficulty_after: f64,
}

pub(crate) fn duration_to_days(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

pub(crate) fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * SECONDS_PER_DAY * 1000.0).round() as i64)
}
