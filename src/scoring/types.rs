//! Data types produced by the scoring pass.

use serde::Serialize;

use crate::scoring::lion_score::LionScore;
use crate::stats::ScoreStats;

/// One held-out prediction. Also the row shape of the predictions CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldPrediction {
    pub key: String,
    pub fold: usize,
    pub actual_price: f64,
    pub predicted_price: f64,
    pub residual_pct: f64,
    pub lion_score: LionScore,
}

/// Everything a scoring pass produced besides the labels written onto the
/// listings themselves.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub predictions: Vec<FoldPrediction>,
    pub stats: ScoreStats,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("fold count must be at least 2, got {0}")]
    InvalidFolds(usize),
    #[error("{folds}-fold scoring needs at least {folds} scorable listings, found {rows}")]
    TooFewRows { rows: usize, folds: usize },
}
