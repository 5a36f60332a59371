//! End-to-end scheduling scenarios.

mod common;

use anyhow::Result;
use chrono::Duration;
use pretty_assertions::assert_eq;

use common::{fixtures, init_tracing, t0};
use srs_engine::{
    build_queue, calculate_stats, get_due, preview_schedule, schedule, ConfigOverrides,
    LearningState, QueueLimits, Rating, ReviewableItem, ScheduleError, Scheduler,
    SchedulerConfig,
};

#[test]
fn new_item_climbs_the_ladder_into_review() -> Result<()> {
    init_tracing();
    let item = fixtures::new_item(1);

    let first = schedule(&item, Rating::Good, t0())?;
    assert_eq!(first.item.learning_state, LearningState::Learning);
    assert!(first.interval_days < 1.0);

    let later = first.due_at;
    let second = schedule(&first.item, Rating::Good, later)?;
    assert_eq!(second.item.learning_state, LearningState::Review);
    assert!(second.interval_days >= 1.0);
    assert!(second.interval_days < 10.0);
    assert_eq!(second.item.reps, 2);
    assert_eq!(second.item.lapses, 0);
    assert_eq!(second.due_at, later + Duration::days(second.interval_days as i64));
    Ok(())
}

#[test]
fn again_on_new_item_needs_more_learning_steps() -> Result<()> {
    let mut item = fixtures::new_item(2);
    let mut now = t0();

    item = schedule(&item, Rating::Again, now)?.item;
    assert_eq!(item.learning_state, LearningState::Learning);

    now += Duration::minutes(1);
    item = schedule(&item, Rating::Good, now)?.item;
    assert_eq!(item.learning_state, LearningState::Learning);

    now += Duration::minutes(10);
    item = schedule(&item, Rating::Good, now)?.item;
    assert_eq!(item.learning_state, LearningState::Review);
    Ok(())
}

#[test]
fn lapse_and_recovery() -> Result<()> {
    init_tracing();
    let now = t0();
    let item = fixtures::review_item(3, 10.0, 5.0, 10, now);

    let lapsed = schedule(&item, Rating::Again, now)?;
    assert_eq!(lapsed.item.learning_state, LearningState::Relearning);
    assert_eq!(lapsed.item.lapses, 1);
    assert_eq!(lapsed.item.reps, item.reps);
    let failed_stability = lapsed.item.stability.unwrap();
    assert!(failed_stability < 10.0);

    let recovered = schedule(&lapsed.item, Rating::Good, lapsed.due_at)?;
    assert_eq!(recovered.item.learning_state, LearningState::Review);
    assert!(recovered.item.stability.unwrap() >= failed_stability);
    assert_eq!(recovered.item.lapses, 1);
    assert_eq!(recovered.item.reps, item.reps + 1);
    Ok(())
}

#[test]
fn a_month_of_good_reviews_spreads_out() -> Result<()> {
    let scheduler = Scheduler::new(SchedulerConfig {
        enable_fuzz: false,
        ..Default::default()
    })?;
    let mut item = fixtures::new_item(4);
    let mut now = t0();
    let mut intervals = Vec::new();

    for _ in 0..8 {
        let result = scheduler.schedule(&item, Rating::Good, now)?;
        intervals.push(result.interval_days);
        now = result.due_at;
        item = result.item;
    }

    assert_eq!(item.learning_state, LearningState::Review);
    let review_intervals = &intervals[1..];
    assert!(review_intervals.windows(2).all(|w| w[1] >= w[0]));
    assert!(intervals.last().copied().unwrap_or_default() > 30.0);
    Ok(())
}

#[test]
fn snapshot_survives_storage_round_trip() -> Result<()> {
    let item = fixtures::review_item(5, 6.0, 5.5, 6, t0());
    let result = schedule(&item, Rating::Hard, t0())?;

    let stored = serde_json::to_string(&result.item)?;
    let loaded: ReviewableItem = serde_json::from_str(&stored)?;
    assert_eq!(loaded, result.item);

    let again = schedule(&loaded, Rating::Good, result.due_at)?;
    assert_eq!(again.item.learning_state, LearningState::Review);
    Ok(())
}

#[test]
fn deck_overrides_change_the_ladder() -> Result<()> {
    let global = SchedulerConfig::default();
    let overrides = ConfigOverrides {
        learning_steps: Some(vec![5, 30, 120]),
        ..Default::default()
    };
    let scheduler = Scheduler::new(global.merge(Some(&overrides)))?;

    let mut item = fixtures::new_item(6);
    let mut now = t0();
    let mut states = Vec::new();
    for _ in 0..3 {
        let result = scheduler.schedule(&item, Rating::Good, now)?;
        states.push(result.item.learning_state);
        now = result.due_at;
        item = result.item;
    }

    assert_eq!(
        states,
        vec![
            LearningState::Learning,
            LearningState::Learning,
            LearningState::Review
        ]
    );
    Ok(())
}

#[test]
fn corrupt_items_are_rejected_not_repaired() {
    let mut item = fixtures::review_item(7, 5.0, 5.0, 5, t0());
    item.difficulty = None;

    let err = schedule(&item, Rating::Good, t0()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::CorruptScheduleState {
            id: 7,
            reason: "missing difficulty"
        }
    );
    assert!(preview_schedule(&item, t0()).is_err());
}

#[test]
fn numeric_ratings_are_validated_at_the_boundary() {
    let scheduler = Scheduler::default();
    let item = fixtures::new_item(8);
    for bad in [0u8, 5, 255] {
        assert!(matches!(
            scheduler.schedule_raw(&item, bad, t0()),
            Err(ScheduleError::InvalidRating(_))
        ));
    }
}

#[test]
fn skewed_clock_does_not_block_a_review() -> Result<()> {
    init_tracing();
    let now = t0();
    let mut item = fixtures::review_item(9, 10.0, 5.0, 0, now);
    item.last_review_at = Some(now + Duration::days(2));

    let result = schedule(&item, Rating::Good, now)?;
    assert_eq!(result.log.elapsed_days, 0.0);
    assert_eq!(result.item.last_review_at, Some(now));
    Ok(())
}

#[test]
fn session_drains_the_due_set() -> Result<()> {
    let now = t0();
    let mut corpus = fixtures::sample_corpus(now);
    let due_ids: Vec<i64> = get_due(&corpus, now).iter().map(|i| i.id).collect();
    assert_eq!(due_ids, vec![3, 1, 2, 5, 7, 6]);

    // New items need a second pass to leave the learning ladder.
    let mut session = now;
    for _ in 0..2 {
        for item in corpus.iter_mut() {
            if item.is_due(session) {
                *item = schedule(item, Rating::Easy, session)?.item;
            }
        }
        session += Duration::minutes(15);
    }

    let later = session + Duration::hours(1);
    assert!(get_due(&corpus, later).is_empty());

    let stats = calculate_stats(&corpus, later);
    assert_eq!(stats.counts.review, corpus.len());
    assert_eq!(stats.due_today, 0);
    Ok(())
}

#[test]
fn queue_limits_new_and_review_lanes() {
    let now = t0();
    let corpus = fixtures::sample_corpus(now);
    let queue = build_queue(
        &corpus,
        now,
        QueueLimits {
            new_per_day: 1,
            reviews_per_day: 1,
        },
    );

    let ids = |items: &[&ReviewableItem]| items.iter().map(|i| i.id).collect::<Vec<_>>();
    assert_eq!(ids(&queue.learning), vec![7, 6]);
    assert_eq!(ids(&queue.review), vec![3]);
    assert_eq!(ids(&queue.new), vec![1]);
}
