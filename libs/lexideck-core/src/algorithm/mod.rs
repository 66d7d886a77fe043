//! Spaced repetition scheduling.

pub mod fsrs;

use crate::types::{CardState, ReviewDifficulty};
use chrono::{DateTime, Utc};

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: CardState,
    pub scheduled_days: i64,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate next review state after a review.
    fn schedule(
        &self,
        state: &CardState,
        difficulty: ReviewDifficulty,
        now: DateTime<Utc>,
    ) -> SchedulingResult;
}

/// Name of the algorithm used when none is configured.
pub const DEFAULT_ALGORITHM: &str = "simple_fsrs";

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SpacedRepetitionAlgorithm>> {
    match name {
        "simple_fsrs" | "fsrs" => Some(Box::new(fsrs::SimpleFsrs)),
        _ => None,
    }
}
