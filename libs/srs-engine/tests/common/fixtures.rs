//! Factory functions for creating test items.

use chrono::{DateTime, Duration, Utc};

use srs_engine::{LearningState, ReviewableItem};

use super::t0;

/// A never-reviewed item created at `t0`.
pub fn new_item(id: i64) -> ReviewableItem {
    ReviewableItem::new(id, t0())
}

/// A review item last seen `elapsed_days` before `now`.
pub fn review_item(
    id: i64,
    stability: f64,
    difficulty: f64,
    elapsed_days: i64,
    now: DateTime<Utc>,
) -> ReviewableItem {
    let last = now - Duration::days(elapsed_days);
    ReviewableItem {
        id,
        learning_state: LearningState::Review,
        stability: Some(stability),
        difficulty: Some(difficulty),
        scheduled_days: stability.round(),
        step: 0,
        reps: 4,
        lapses: 0,
        last_review_at: Some(last),
        due_at: last + Duration::days(stability.round() as i64),
    }
}

/// A mixed corpus covering every learning state.
pub fn sample_corpus(now: DateTime<Utc>) -> Vec<ReviewableItem> {
    let mut items = vec![new_item(1), new_item(2)];
    items.push(review_item(3, 10.0, 5.0, 12, now));
    items.push(review_item(4, 30.0, 4.0, 3, now));
    items.push(review_item(5, 2.0, 8.0, 2, now));

    let mut learning = review_item(6, 2.4, 4.9, 0, now);
    learning.learning_state = LearningState::Learning;
    learning.step = 1;
    learning.due_at = now + Duration::minutes(8);
    items.push(learning);

    let mut relearning = review_item(7, 1.5, 7.0, 0, now);
    relearning.learning_state = LearningState::Relearning;
    relearning.lapses = 1;
    relearning.due_at = now + Duration::minutes(4);
    items.push(relearning);

    items
}
