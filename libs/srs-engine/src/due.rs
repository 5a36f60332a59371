//! Due-set selection and study queue assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LearningState, ReviewableItem};

/// Items due at `now`, earliest first.
///
/// An item is due when `due_at <= now` or when it is mid-ladder (learning or
/// relearning). Items with equal `due_at` keep their input order.
pub fn get_due(items: &[ReviewableItem], now: DateTime<Utc>) -> Vec<&ReviewableItem> {
    get_due_filtered(items, now, |_| true)
}

/// Like [`get_due`], restricted to items accepted by `predicate`.
pub fn get_due_filtered<'a, F>(
    items: &'a [ReviewableItem],
    now: DateTime<Utc>,
    predicate: F,
) -> Vec<&'a ReviewableItem>
where
    F: Fn(&ReviewableItem) -> bool,
{
    let mut due: Vec<&ReviewableItem> = items
        .iter()
        .filter(|item| item.is_due(now) && predicate(item))
        .collect();
    // sort_by_key is stable
    due.sort_by_key(|item| item.due_at);
    due
}

/// Daily limits for the study queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueLimits {
    pub new_per_day: usize,
    pub reviews_per_day: usize,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            new_per_day: 20,
            reviews_per_day: 200,
        }
    }
}

/// Study queue containing items to study now.
#[derive(Debug, Clone, Serialize)]
pub struct StudyQueue<'a> {
    /// Learning and relearning items; never capped.
    pub learning: Vec<&'a ReviewableItem>,
    pub review: Vec<&'a ReviewableItem>,
    pub new: Vec<&'a ReviewableItem>,
    pub new_remaining: usize,
    pub review_remaining: usize,
}

impl StudyQueue<'_> {
    pub fn len(&self) -> usize {
        self.learning.len() + self.review.len() + self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split the due set into learning, review and new lanes under `limits`.
pub fn build_queue(
    items: &[ReviewableItem],
    now: DateTime<Utc>,
    limits: QueueLimits,
) -> StudyQueue<'_> {
    let mut learning = Vec::new();
    let mut review = Vec::new();
    let mut new = Vec::new();

    for item in get_due(items, now) {
        match item.learning_state {
            LearningState::Learning | LearningState::Relearning => learning.push(item),
            LearningState::Review if review.len() < limits.reviews_per_day => review.push(item),
            LearningState::New if new.len() < limits.new_per_day => new.push(item),
            LearningState::Review | LearningState::New => {}
        }
    }

    tracing::debug!(
        learning = learning.len(),
        review = review.len(),
        new = new.len(),
        "built study queue"
    );

    StudyQueue {
        new_remaining: limits.new_per_day.saturating_sub(new.len()),
        review_remaining: limits.reviews_per_day.saturating_sub(review.len()),
        learning,
        review,
        new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 2, 12, 0, 0).unwrap()
    }

    fn item(id: i64, state: LearningState, due_in_hours: i64) -> ReviewableItem {
        let due_at = now() + Duration::hours(due_in_hours);
        let mut item = ReviewableItem::new(id, due_at);
        item.learning_state = state;
        if state != LearningState::New {
            item.stability = Some(3.0);
            item.difficulty = Some(5.0);
            item.last_review_at = Some(due_at - Duration::days(3));
        }
        item
    }

    fn ids(items: &[&ReviewableItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn selects_overdue_and_mid_ladder_items() {
        let items = vec![
            item(1, LearningState::Review, -5),
            item(2, LearningState::Review, 5),
            item(3, LearningState::Learning, 2),
            item(4, LearningState::Relearning, 48),
            item(5, LearningState::New, 0),
        ];
        let due = get_due(&items, now());
        assert_eq!(ids(&due), vec![1, 5, 3, 4]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![
            item(9, LearningState::Review, -1),
            item(3, LearningState::Review, -1),
            item(6, LearningState::Review, -1),
        ];
        assert_eq!(ids(&get_due(&items, now())), vec![9, 3, 6]);
    }

    #[test]
    fn get_due_is_idempotent() {
        let items: Vec<ReviewableItem> = (0..20)
            .map(|i| item(i, LearningState::Review, (i % 7) - 4))
            .collect();
        assert_eq!(ids(&get_due(&items, now())), ids(&get_due(&items, now())));
    }

    #[test]
    fn predicate_restricts_the_set() {
        let items = vec![
            item(1, LearningState::Review, -1),
            item(2, LearningState::Review, -2),
            item(3, LearningState::Learning, 1),
        ];
        let due = get_due_filtered(&items, now(), |i| i.id % 2 == 1);
        assert_eq!(ids(&due), vec![1, 3]);
    }

    #[test]
    fn empty_corpus_has_nothing_due() {
        assert!(get_due(&[], now()).is_empty());
    }

    #[test]
    fn queue_applies_daily_limits() {
        let mut items = Vec::new();
        for i in 0..5 {
            items.push(item(i, LearningState::Review, -1 - i));
        }
        for i in 5..10 {
            items.push(item(i, LearningState::New, -1));
        }
        items.push(item(10, LearningState::Learning, 3));

        let limits = QueueLimits {
            new_per_day: 2,
            reviews_per_day: 3,
        };
        let queue = build_queue(&items, now(), limits);

        assert_eq!(ids(&queue.learning), vec![10]);
        assert_eq!(ids(&queue.review), vec![4, 3, 2]);
        assert_eq!(ids(&queue.new), vec![5, 6]);
        assert_eq!(queue.new_remaining, 0);
        assert_eq!(queue.review_remaining, 0);
        assert_eq!(queue.len(), 6);
    }

    #[test]
    fn queue_reports_remaining_capacity() {
        let items = vec![item(1, LearningState::Review, -1)];
        let queue = build_queue(&items, now(), QueueLimits::default());
        assert_eq!(queue.review_remaining, 199);
        assert_eq!(queue.new_remaining, 20);
        assert!(!queue.is_empty());
    }
}
