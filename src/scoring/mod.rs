//! LionScore: cross-validated price-anomaly labels.
//!
//! A linear model is fitted on nine tenths of the listings and used to
//! predict the held-out tenth, ten times over. Each listing's residual
//! against its out-of-fold prediction is bucketed into a [`LionScore`].

pub mod features;
pub mod kfold;
pub mod lion_score;
pub mod regression;
pub mod types;
pub mod utility;

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::listing::Listing;
use crate::stats::ScoreStats;
use features::{FeatureSet, SizeDefaults, build_features, row_key};
use kfold::{complement, kfold_indices};
use lion_score::{LionScore, residual_pct};
use regression::LinearModel;
use types::{FoldPrediction, ScoreError, ScoreOutcome};
use utility::{mean, stddev};

#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub features: FeatureSet,
    pub folds: usize,
    pub seed: u64,
    pub sizes: SizeDefaults,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            features: FeatureSet::default(),
            folds: 10,
            seed: 42,
            sizes: SizeDefaults::default(),
        }
    }
}

/// Fits the per-fold models and writes `LionScore` onto every listing whose
/// key received a prediction. When several listings share a key the last
/// prediction for that key wins.
#[tracing::instrument(skip_all, fields(features = ?config.features, folds = config.folds))]
pub fn score_listings(
    listings: &mut [Listing],
    config: &ScoreConfig,
) -> Result<ScoreOutcome, ScoreError> {
    if config.folds < 2 {
        return Err(ScoreError::InvalidFolds(config.folds));
    }

    let matrix = build_features(listings, config.features, &config.sizes);
    if matrix.len() < config.folds {
        return Err(ScoreError::TooFewRows {
            rows: matrix.len(),
            folds: config.folds,
        });
    }
    info!(
        rows = matrix.len(),
        features = matrix.columns.len(),
        "Feature matrix built"
    );

    let mut predictions = Vec::with_capacity(matrix.len());
    for (fold, test_idx) in kfold_indices(matrix.len(), config.folds, config.seed)
        .into_iter()
        .enumerate()
    {
        let train_idx = complement(matrix.len(), &test_idx);
        let (x_train, y_train) = matrix.select(&train_idx);
        let model = LinearModel::fit(&x_train, &y_train);
        debug!(fold, train = train_idx.len(), test = test_idx.len(), intercept = model.intercept, "Fold fitted");

        for i in test_idx {
            let actual = matrix.targets[i];
            let predicted = model.predict(&matrix.rows[i]);
            let residual = residual_pct(actual, predicted);
            predictions.push(FoldPrediction {
                key: matrix.keys[i].clone(),
                fold,
                actual_price: actual,
                predicted_price: predicted,
                residual_pct: residual,
                lion_score: LionScore::from_residual(residual),
            });
        }
    }

    let lion_map: HashMap<&str, LionScore> = predictions
        .iter()
        .map(|p| (p.key.as_str(), p.lion_score))
        .collect();

    let mut stats = ScoreStats {
        timestamp: Utc::now(),
        rows_trained: matrix.len(),
        features: matrix.columns.len(),
        ..Default::default()
    };
    for listing in listings.iter_mut() {
        let score = row_key(listing, config.features).and_then(|k| lion_map.get(k).copied());
        if let Some(score) = score {
            listing.lion_score = Some(score);
            stats.listings_labeled += 1;
            stats.count(score);
        }
    }

    let residuals: Vec<f64> = predictions
        .iter()
        .map(|p| p.residual_pct)
        .filter(|r| r.is_finite())
        .collect();
    stats.mean_residual_pct = mean(&residuals);
    stats.stddev_residual_pct = stddev(&residuals, stats.mean_residual_pct);

    info!(
        labeled = stats.listings_labeled,
        flagged = stats.flagged(),
        mean_residual_pct = stats.mean_residual_pct,
        "LionScores assigned"
    );

    Ok(ScoreOutcome { predictions, stats })
}
