//! Spaced repetition scheduling: memory model and the learning-state machine.

pub mod memory;
pub mod scheduler;

use crate::types::{ReviewLog, ReviewableItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::MemoryModel;
pub use scheduler::Scheduler;

/// Result of scheduling an item after review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingResult {
    /// New snapshot for the caller to persist.
    pub item: ReviewableItem,
    pub interval_days: f64,
    pub due_at: DateTime<Utc>,
    pub log: ReviewLog,
}
