//! Per-rating interval preview for labelling rating buttons.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::algorithm::Scheduler;
use crate::error::Result;
use crate::types::{Rating, ReviewableItem};

/// Interval in days for each rating.
pub type SchedulePreview = BTreeMap<Rating, f64>;

impl Scheduler {
    /// Interval `schedule` would choose for each rating, without keeping the
    /// resulting snapshots.
    pub fn preview(&self, item: &ReviewableItem, now: DateTime<Utc>) -> Result<SchedulePreview> {
        Rating::ALL
            .into_iter()
            .map(|rating| {
                self.schedule(item, rating, now)
                    .map(|result| (rating, result.interval_days))
            })
            .collect()
    }
}
