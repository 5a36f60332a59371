//! Corpus statistics and due-load forecasts.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::memory::retrievability;
use crate::error::{Result, ScheduleError};
use crate::types::{LearningState, ReviewableItem};

/// Number of items in each learning state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub relearning: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.new + self.learning + self.review + self.relearning
    }
}

/// Corpus-level summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub counts: StateCounts,
    pub total_reps: u64,
    pub total_lapses: u64,
    pub due_today: usize,
    pub due_in_7_days: usize,
    pub due_in_30_days: usize,
    /// Mean retrievability at `now` over reviewed items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_retrievability: Option<f64>,
}

/// Start of the next study day after `now`.
///
/// A study day begins at `daily_reset_hour` (UTC), so reviewing late at night
/// still counts toward the previous day. Hours above 23 are treated as 23.
pub fn next_day_start(now: DateTime<Utc>, daily_reset_hour: u32) -> DateTime<Utc> {
    let reset = NaiveTime::from_hms_opt(daily_reset_hour.min(23), 0, 0).unwrap_or_default();
    let today_reset = now.date_naive().and_time(reset).and_utc();
    if now >= today_reset {
        today_reset + Duration::days(1)
    } else {
        today_reset
    }
}

/// Aggregates statistics over a corpus without mutating it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsAggregator {
    /// Hour of day (0-23, UTC) when a new study day begins. Larger values
    /// set directly are treated as 23.
    pub daily_reset_hour: u32,
}

impl StatsAggregator {
    pub fn new(daily_reset_hour: u32) -> Result<Self> {
        if daily_reset_hour > 23 {
            return Err(ScheduleError::InvalidConfig(format!(
                "daily_reset_hour must be in 0-23, got {}",
                daily_reset_hour
            )));
        }
        Ok(Self { daily_reset_hour })
    }

    pub fn calculate(&self, items: &[ReviewableItem], now: DateTime<Utc>) -> StatsSummary {
        let today_end = next_day_start(now, self.daily_reset_hour);
        let week_end = today_end + Duration::days(6);
        let month_end = today_end + Duration::days(29);

        let mut summary = StatsSummary::default();
        let mut retrievability_sum = 0.0;
        let mut reviewed = 0usize;

        for item in items {
            match item.learning_state {
                LearningState::New => summary.counts.new += 1,
                LearningState::Learning => summary.counts.learning += 1,
                LearningState::Review => summary.counts.review += 1,
                LearningState::Relearning => summary.counts.relearning += 1,
            }
            summary.total_reps += u64::from(item.reps);
            summary.total_lapses += u64::from(item.lapses);

            if item.due_at < today_end {
                summary.due_today += 1;
            }
            if item.due_at < week_end {
                summary.due_in_7_days += 1;
            }
            if item.due_at < month_end {
                summary.due_in_30_days += 1;
            }

            if let (Some(stability), Some(_)) = (item.stability, item.last_review_at) {
                if item.learning_state != LearningState::New {
                    retrievability_sum += retrievability(stability, item.elapsed_days(now));
                    reviewed += 1;
                }
            }
        }

        if reviewed > 0 {
            summary.average_retrievability = Some(retrievability_sum / reviewed as f64);
        }
        summary
    }

    /// Due counts per study day for the next `days` days, starting today.
    /// Overdue items count toward today.
    pub fn forecast(
        &self,
        items: &[ReviewableItem],
        now: DateTime<Utc>,
        days: usize,
    ) -> Vec<usize> {
        let mut buckets = vec![0; days];
        if days == 0 {
            return buckets;
        }
        let today_end = next_day_start(now, self.daily_reset_hour);

        for item in items {
            let index = if item.due_at < today_end {
                0
            } else {
                let ahead = (item.due_at - today_end).num_days() + 1;
                usize::try_from(ahead).unwrap_or(usize::MAX)
            };
            if let Some(bucket) = buckets.get_mut(index) {
                *bucket += 1;
            }
        }
        buckets
    }
}

/// Statistics with the default study-day boundary (midnight UTC).
pub fn calculate_stats(items: &[ReviewableItem], now: DateTime<Utc>) -> StatsSummary {
    StatsAggregator::default().calculate(items, now)
}
