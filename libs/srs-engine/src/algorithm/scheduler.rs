//! Learning-state machine that turns one rating into a new item snapshot.
//!
//! New and lapsed items climb a short ladder of fixed steps (minutes) before
//! the memory model takes over. Review items are spaced by stability.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::memory::{retrievability, MemoryModel};
use super::SchedulingResult;
use crate::config::SchedulerConfig;
use crate::error::{Result, ScheduleError};
use crate::types::{days_to_duration, LearningState, Rating, ReviewLog, ReviewableItem};

const MINUTES_PER_DAY: f64 = 1440.0;

/// Scheduler with a validated configuration.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    model: MemoryModel,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from_valid(SchedulerConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct Memory {
    stability: f64,
    difficulty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ladder {
    Learning,
    Relearning,
}

impl Ladder {
    fn state(self) -> LearningState {
        match self {
            Self::Learning => LearningState::Learning,
            Self::Relearning => LearningState::Relearning,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    state: LearningState,
    stability: f64,
    difficulty: f64,
    step: u32,
    interval_days: f64,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: SchedulerConfig) -> Self {
        let model = MemoryModel::new(config.weights);
        Self { config, model }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    /// Schedule with a numeric 1-4 rating, as received from a client.
    pub fn schedule_raw(
        &self,
        item: &ReviewableItem,
        rating: u8,
        now: DateTime<Utc>,
    ) -> Result<SchedulingResult> {
        let rating = Rating::try_from(rating)?;
        self.schedule(item, rating, now)
    }

    /// Calculate the next snapshot of `item` after it was rated `rating` at `now`.
    pub fn schedule(
        &self,
        item: &ReviewableItem,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<SchedulingResult> {
        let memory = memory_state(item)?;

        let elapsed_days = match item.checked_elapsed_days(now) {
            Ok(days) => days,
            Err(err) => {
                tracing::warn!(item_id = item.id, error = %err, "treating elapsed time as zero");
                0.0
            }
        };

        let transition = match (item.learning_state, memory) {
            (LearningState::New, _) => self.from_new(rating),
            (LearningState::Learning, Some(m)) => {
                self.from_ladder(item, m, rating, elapsed_days, Ladder::Learning)
            }
            (LearningState::Relearning, Some(m)) => {
                self.from_ladder(item, m, rating, elapsed_days, Ladder::Relearning)
            }
            (LearningState::Review, Some(m)) => self.from_review(item, m, rating, elapsed_days),
            (_, None) => return Err(corrupt(item, "missing memory state")),
        };

        let lapsed = item.learning_state == LearningState::Review && rating == Rating::Again;
        let due_at = now
            .checked_add_signed(days_to_duration(transition.interval_days))
            .ok_or(ScheduleError::DueDateOutOfRange {
                id: item.id,
                interval_days: transition.interval_days,
                now,
            })?;

        let next = ReviewableItem {
            id: item.id,
            learning_state: transition.state,
            stability: Some(transition.stability),
            difficulty: Some(transition.difficulty),
            scheduled_days: transition.interval_days,
            step: transition.step,
            reps: item.reps.saturating_add(u32::from(rating.is_success())),
            lapses: item.lapses.saturating_add(u32::from(lapsed)),
            last_review_at: Some(now),
            due_at,
        };

        tracing::debug!(
            item_id = item.id,
            %rating,
            from = %item.learning_state,
            to = %next.learning_state,
            stability = transition.stability,
            difficulty = transition.difficulty,
            interval_days = transition.interval_days,
            "scheduled item"
        );

        let log = ReviewLog {
            item_id: item.id,
            rating,
            state_before: item.learning_state,
            state_after: next.learning_state,
            reviewed_at: now,
            elapsed_days,
            interval_before: item.scheduled_days,
            interval_after: transition.interval_days,
            stability_before: memory.map(|m| m.stability),
            stability_after: transition.stability,
            difficulty_before: memory.map(|m| m.difficulty),
            difficulty_after: transition.difficulty,
        };

        Ok(SchedulingResult {
            item: next,
            interval_days: transition.interval_days,
            due_at,
            log,
        })
    }

    /// First rating: seed memory state and place the item on the learning ladder.
    fn from_new(&self, rating: Rating) -> Transition {
        let steps = &self.config.learning_steps;
        let last = steps.len().saturating_sub(1);
        let step = match rating {
            Rating::Again | Rating::Hard => 0,
            Rating::Good => last.min(1),
            Rating::Easy => last,
        };
        let interval_days = if rating == Rating::Hard {
            hard_delay(steps, 0)
        } else {
            step_days(steps, step)
        };

        Transition {
            state: LearningState::Learning,
            stability: self.model.initial_stability(rating),
            difficulty: self.model.initial_difficulty(rating),
            step: step as u32,
            interval_days,
        }
    }

    /// Rating while on the learning or relearning ladder.
    fn from_ladder(
        &self,
        item: &ReviewableItem,
        memory: Memory,
        rating: Rating,
        elapsed_days: f64,
        ladder: Ladder,
    ) -> Transition {
        let steps = match ladder {
            Ladder::Learning => &self.config.learning_steps,
            Ladder::Relearning => &self.config.relearning_steps,
        };
        let last = steps.len().saturating_sub(1);
        // A ladder shortened by a config change leaves items past its end.
        let step = (item.step as usize).min(last);
        let difficulty = self.model.next_difficulty(memory.difficulty, rating);
        let stay = |stability: f64, step: usize, interval_days: f64| Transition {
            state: ladder.state(),
            stability,
            difficulty,
            step: step as u32,
            interval_days,
        };

        match rating {
            Rating::Again => stay(
                self.model.short_term_stability(memory.stability, rating),
                0,
                step_days(steps, 0),
            ),
            Rating::Hard if step < last => stay(
                self.model.short_term_stability(memory.stability, rating),
                step,
                hard_delay(steps, step),
            ),
            Rating::Good if step < last => stay(
                self.model.short_term_stability(memory.stability, rating),
                step + 1,
                step_days(steps, step + 1),
            ),
            _ => {
                let stability = match ladder {
                    Ladder::Learning => self.model.short_term_stability(memory.stability, rating),
                    Ladder::Relearning => self.model.next_stability(
                        memory.stability,
                        memory.difficulty,
                        retrievability(memory.stability, elapsed_days),
                        rating,
                    ),
                };
                Transition {
                    state: LearningState::Review,
                    stability,
                    difficulty,
                    step: 0,
                    interval_days: self.graduating_interval(stability),
                }
            }
        }
    }

    fn from_review(
        &self,
        item: &ReviewableItem,
        memory: Memory,
        rating: Rating,
        elapsed_days: f64,
    ) -> Transition {
        let r = retrievability(memory.stability, elapsed_days);
        let stability = self
            .model
            .next_stability(memory.stability, memory.difficulty, r, rating);
        let difficulty = self.model.next_difficulty(memory.difficulty, rating);

        if rating == Rating::Again {
            Transition {
                state: LearningState::Relearning,
                stability,
                difficulty,
                step: 0,
                interval_days: step_days(&self.config.relearning_steps, 0),
            }
        } else {
            Transition {
                state: LearningState::Review,
                stability,
                difficulty,
                step: 0,
                interval_days: self.review_interval(item, stability),
            }
        }
    }

    fn graduating_interval(&self, stability: f64) -> f64 {
        let ideal = self
            .model
            .interval_for(stability, self.config.desired_retention);
        self.clamp_interval(ideal.round())
    }

    fn review_interval(&self, item: &ReviewableItem, stability: f64) -> f64 {
        let ideal = self
            .model
            .interval_for(stability, self.config.desired_retention);
        self.clamp_interval(self.fuzz(item, ideal).round())
    }

    fn clamp_interval(&self, days: f64) -> f64 {
        let min = f64::from(self.config.minimum_interval.max(1));
        let max = f64::from(self.config.maximum_interval).max(min);
        days.clamp(min, max)
    }

    /// Spread due dates by up to `fuzz_factor` in either direction.
    ///
    /// The offset depends only on the input snapshot, so every rating of the
    /// same snapshot shares it and intervals keep their order.
    fn fuzz(&self, item: &ReviewableItem, days: f64) -> f64 {
        let factor = self.config.fuzz_factor;
        if !self.config.enable_fuzz || factor <= 0.0 {
            return days;
        }
        let mut rng = StdRng::seed_from_u64(fuzz_seed(item));
        days * (1.0 + rng.gen_range(-factor..=factor))
    }
}

fn fuzz_seed(item: &ReviewableItem) -> u64 {
    let reviewed = item
        .last_review_at
        .map(|t| t.timestamp_millis())
        .unwrap_or_default();
    (item.id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ u64::from(item.reps).rotate_left(32)
        ^ reviewed as u64
}

fn step_days(steps: &[u32], index: usize) -> f64 {
    let minutes = steps
        .get(index)
        .or_else(|| steps.last())
        .copied()
        .unwrap_or(1);
    f64::from(minutes) / MINUTES_PER_DAY
}

/// Delay for Hard on a ladder step: midway to the next step, or the step
/// itself when there is no next one.
fn hard_delay(steps: &[u32], index: usize) -> f64 {
    let current = step_days(steps, index);
    match steps.get(index + 1) {
        Some(&next) => (current + f64::from(next) / MINUTES_PER_DAY) / 2.0,
        None => current,
    }
}

/// Stored memory state, or `CorruptScheduleState` when the fields contradict
/// the declared learning state. New items carry none.
fn memory_state(item: &ReviewableItem) -> Result<Option<Memory>> {
    if item.learning_state == LearningState::New {
        if item.reps != 0 || item.lapses != 0 {
            return Err(corrupt(item, "new item has review counts"));
        }
        if item.last_review_at.is_some() {
            return Err(corrupt(item, "new item has a review timestamp"));
        }
        return Ok(None);
    }

    let stability = item
        .stability
        .ok_or_else(|| corrupt(item, "missing stability"))?;
    let difficulty = item
        .difficulty
        .ok_or_else(|| corrupt(item, "missing difficulty"))?;
    if !stability.is_finite() || stability <= 0.0 {
        return Err(corrupt(item, "stability must be positive"));
    }
    if !(1.0..=10.0).contains(&difficulty) {
        return Err(corrupt(item, "difficulty outside 1-10"));
    }
    if item.last_review_at.is_none() {
        return Err(corrupt(item, "missing last review timestamp"));
    }
    Ok(Some(Memory {
        stability,
        difficulty,
    }))
}

fn corrupt(item: &ReviewableItem, reason: &'static str) -> ScheduleError {
    ScheduleError::CorruptScheduleState {
        id: item.id,
        reason,
    }
}
