//! Reward-driven refinement of the initial quality label.
//!
//! With a rating, the refined label is the rating-derived reward label: the
//! step `current + (reward - current)` lands on the reward in one move.
//! Without a rating, the label takes one uniform step from `{-1, 0, +1}`,
//! clamped to the valid range.

use tracing::debug;

use crate::app::ports::{Nudge, PerturbationSource};
use crate::domain::{QualityLabel, Record};
use crate::error::{OptimizerError, Result};
use crate::pipeline::processing::quality::map_rating_to_quality;

/// Which transition a record took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementPath {
    Reward,
    Perturbation(Nudge),
}

impl RefinementPath {
    pub fn as_str(self) -> &'static str {
        match self {
            RefinementPath::Reward => "reward",
            RefinementPath::Perturbation(_) => "perturbation",
        }
    }
}

/// Reward-collapse transition for a rated record
pub fn refine_with_reward(current: QualityLabel, rating: f64) -> QualityLabel {
    let reward = map_rating_to_quality(rating).numeric() as i64;
    let current = current.numeric() as i64;
    QualityLabel::from_clamped(current + (reward - current))
}

/// Single clamped random step for an unrated record
pub fn refine_with_nudge(current: QualityLabel, nudge: Nudge) -> QualityLabel {
    QualityLabel::from_clamped(current.numeric() as i64 + nudge.delta())
}

/// One transition for one record; draws from `perturbation` only when unrated.
pub fn refine_record(
    record: &mut Record,
    perturbation: &dyn PerturbationSource,
) -> Result<RefinementPath> {
    let current = record.initial_output.ok_or_else(|| {
        OptimizerError::Classification("record has no initial label to refine".to_string())
    })?;

    let (next, path) = match record.rating {
        Some(rating) => (refine_with_reward(current, rating), RefinementPath::Reward),
        None => {
            let nudge = perturbation.draw();
            (refine_with_nudge(current, nudge), RefinementPath::Perturbation(nudge))
        }
    };

    debug!(from = %current, to = %next, path = path.as_str(), "refined label");
    record.refined_output = Some(next);
    Ok(path)
}

/// Refine every record of the batch in order.
pub fn refine_batch(
    records: &mut [Record],
    perturbation: &dyn PerturbationSource,
) -> Result<Vec<RefinementPath>> {
    records
        .iter_mut()
        .map(|record| refine_record(record, perturbation))
        .collect()
}
