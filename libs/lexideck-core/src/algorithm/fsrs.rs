//! Simplified FSRS scheduler.
//!
//! Each verdict maps to a performance score `p` in [0, 1]:
//! - Difficulty (D): nudged by `(0.5 - p) * 2`, kept in 1-10
//! - Stability (S): scaled by `0.9 + 0.5p`, kept between a small floor and
//!   [`MAXIMUM_INTERVAL_DAYS`]
//! - Interval: one day while (re)learning, `round(S)` days in review

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{CardState, CardStatus, ReviewDifficulty};
use chrono::{DateTime, TimeDelta, Utc};

const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 10.0;
const NEW_CARD_MIN_STABILITY: f64 = 0.5;
const MIN_STABILITY: f64 = 0.1;
const REVIEW_MIN_STEP: i32 = 3;

/// Longest interval a card can be scheduled out, about a century.
pub const MAXIMUM_INTERVAL_DAYS: i64 = 36500;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFsrs;

impl SimpleFsrs {
    /// Performance score for a verdict.
    pub fn performance(difficulty: ReviewDifficulty) -> f64 {
        match difficulty {
            ReviewDifficulty::Again => 0.0,
            ReviewDifficulty::Hard => 0.3,
            ReviewDifficulty::Good => 0.7,
            ReviewDifficulty::Easy => 1.0,
        }
    }

    fn next_difficulty(current: f64, p: f64) -> f64 {
        (current + (0.5 - p) * 2.0).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    fn next_stability(current: f64, p: f64, status: CardStatus) -> f64 {
        let floor = if status == CardStatus::New {
            NEW_CARD_MIN_STABILITY
        } else {
            MIN_STABILITY
        };
        (current * (0.9 + 0.5 * p))
            .max(floor)
            .min(MAXIMUM_INTERVAL_DAYS as f64)
    }

    fn next_status(status: CardStatus, p: f64) -> CardStatus {
        if p < 0.5 {
            return CardStatus::Relearning;
        }
        match status {
            CardStatus::New | CardStatus::Relearning => CardStatus::Learning,
            CardStatus::Learning if p > 0.7 => CardStatus::Review,
            CardStatus::Learning => CardStatus::Learning,
            CardStatus::Review => CardStatus::Review,
        }
    }

    /// `now` plus `days`, saturating at the latest representable instant.
    fn due_after(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        TimeDelta::try_days(days)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn interval_days(status: CardStatus, stability: f64) -> i64 {
        match status {
            CardStatus::Review => (stability.round() as i64).clamp(1, MAXIMUM_INTERVAL_DAYS),
            _ => 1,
        }
    }
}

impl SpacedRepetitionAlgorithm for SimpleFsrs {
    fn name(&self) -> &'static str {
        "simple_fsrs"
    }

    fn schedule(
        &self,
        state: &CardState,
        difficulty: ReviewDifficulty,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let p = Self::performance(difficulty);

        let new_difficulty = Self::next_difficulty(state.difficulty, p);
        let new_stability = Self::next_stability(state.stability, p, state.status);
        let new_status = Self::next_status(state.status, p);

        let new_step = match new_status {
            CardStatus::Learning | CardStatus::Relearning => 0,
            CardStatus::Review => state.step.max(REVIEW_MIN_STEP),
            CardStatus::New => state.step,
        };

        let scheduled_days = Self::interval_days(new_status, new_stability);

        SchedulingResult {
            new_state: CardState {
                status: new_status,
                stability: new_stability,
                difficulty: new_difficulty,
                step: new_step,
                due: Self::due_after(now, scheduled_days),
                last_review: Some(now),
            },
            scheduled_days,
        }
    }
}
