//! Spaced repetition scheduling engine.
//!
//! Provides:
//! - Memory model (stability, difficulty, retrievability)
//! - Scheduler for the New/Learning/Review/Relearning state machine
//! - Due-set selection and study queues
//! - Corpus statistics and due forecasts
//! - Per-rating interval previews
//!
//! Every operation takes `now` explicitly and works on caller-owned
//! snapshots. Persisting the returned [`ReviewableItem`] is up to the caller.

pub mod algorithm;
pub mod config;
pub mod due;
pub mod error;
pub mod preview;
pub mod stats;
pub mod types;

use chrono::{DateTime, Utc};

pub use algorithm::memory::retrievability;
pub use algorithm::{MemoryModel, Scheduler, SchedulingResult};
pub use config::{ConfigOverrides, SchedulerConfig};
pub use due::{build_queue, get_due, get_due_filtered, QueueLimits, StudyQueue};
pub use error::{Result, ScheduleError};
pub use preview::SchedulePreview;
pub use stats::{calculate_stats, next_day_start, StateCounts, StatsAggregator, StatsSummary};
pub use types::{LearningState, Rating, ReviewLog, ReviewableItem};

/// Schedule `item` with the default configuration.
pub fn schedule(
    item: &ReviewableItem,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<SchedulingResult> {
    Scheduler::default().schedule(item, rating, now)
}

/// Preview intervals for `item` with the default configuration.
pub fn preview_schedule(item: &ReviewableItem, now: DateTime<Utc>) -> Result<SchedulePreview> {
    Scheduler::default().preview(item, now)
}
