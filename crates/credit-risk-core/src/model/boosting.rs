//! Gradient-boosted regression stumps for the continuous score targets.
//!
//! Each boosting round fits one depth-1 tree (a single feature/threshold
//! split with constant leaf values) to the current residuals, scanning
//! quantile threshold candidates per feature for the largest squared-error
//! reduction, then shrinks its contribution into the ensemble. Fitting is
//! fully deterministic: no subsampling, fixed round count, ties broken by
//! the lowest feature index.

use serde::{Deserialize, Serialize};

const ROUNDS: usize = 100;
const SHRINKAGE: f64 = 0.1;
const THRESHOLD_CANDIDATES: usize = 10;

/// One depth-1 split: `left` when the feature is below the threshold,
/// `right` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionStump {
    feature: usize,
    threshold: f64,
    left: f64,
    right: f64,
}

impl RegressionStump {
    fn predict(&self, row: &[f64]) -> f64 {
        if row[self.feature] < self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

/// A fitted boosted-stump ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedStumpRegressor {
    init: f64,
    stumps: Vec<RegressionStump>,
}

impl BoostedStumpRegressor {
    /// Fit on scaled features and continuous targets.
    pub fn fit(matrix: &[Vec<f64>], targets: &[f64]) -> BoostedStumpRegressor {
        let rows = matrix.len();
        if rows == 0 {
            return BoostedStumpRegressor {
                init: 0.0,
                stumps: Vec::new(),
            };
        }
        let width = matrix[0].len();

        let init = targets.iter().sum::<f64>() / rows as f64;
        let mut predictions = vec![init; rows];
        let mut stumps = Vec::with_capacity(ROUNDS);

        for _ in 0..ROUNDS {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(target, prediction)| target - prediction)
                .collect();

            let Some(stump) = best_stump(matrix, &residuals, width) else {
                break;
            };

            for (prediction, row) in predictions.iter_mut().zip(matrix) {
                *prediction += SHRINKAGE * stump.predict(row);
            }
            stumps.push(stump);
        }

        BoostedStumpRegressor { init, stumps }
    }

    /// Ensemble prediction for one scaled row.
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.init
            + SHRINKAGE
                * self
                    .stumps
                    .iter()
                    .map(|stump| stump.predict(row))
                    .sum::<f64>()
    }

    /// Highest feature index any stump splits on, for load-time checks.
    pub fn max_feature_index(&self) -> Option<usize> {
        self.stumps.iter().map(|stump| stump.feature).max()
    }
}

/// Scan every feature's quantile thresholds for the split with the lowest
/// residual squared error. Returns `None` when no split improves on the
/// zero prediction (all residuals equal).
fn best_stump(matrix: &[Vec<f64>], residuals: &[f64], width: usize) -> Option<RegressionStump> {
    let rows = matrix.len();
    let mut best: Option<(f64, RegressionStump)> = None;

    for feature in 0..width {
        let mut column: Vec<f64> = matrix.iter().map(|row| row[feature]).collect();
        column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for candidate in 1..THRESHOLD_CANDIDATES {
            let position = candidate * (rows - 1) / THRESHOLD_CANDIDATES;
            let threshold = column[position];

            let mut left_sum = 0.0;
            let mut left_count = 0usize;
            let mut right_sum = 0.0;
            let mut right_count = 0usize;
            for (row, residual) in matrix.iter().zip(residuals) {
                if row[feature] < threshold {
                    left_sum += residual;
                    left_count += 1;
                } else {
                    right_sum += residual;
                    right_count += 1;
                }
            }
            if left_count == 0 || right_count == 0 {
                continue;
            }

            let left = left_sum / left_count as f64;
            let right = right_sum / right_count as f64;

            let error: f64 = matrix
                .iter()
                .zip(residuals)
                .map(|(row, residual)| {
                    let fitted = if row[feature] < threshold { left } else { right };
                    let delta = residual - fitted;
                    delta * delta
                })
                .sum();

            let improves = match &best {
                None => true,
                Some((best_error, _)) => error < *best_error,
            };
            if improves {
                best = Some((
                    error,
                    RegressionStump {
                        feature,
                        threshold,
                        left,
                        right,
                    },
                ));
            }
        }
    }

    best.map(|(_, stump)| stump)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Step function of the first feature, ignoring the second.
    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let matrix: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![f64::from(i), f64::from(i % 3)])
            .collect();
        let targets: Vec<f64> = (0..20)
            .map(|i| if i < 10 { 30.0 } else { 80.0 })
            .collect();
        (matrix, targets)
    }

    #[test]
    fn test_fit_learns_step_function() {
        let (matrix, targets) = step_data();
        let model = BoostedStumpRegressor::fit(&matrix, &targets);
        assert!((model.predict(&[2.0, 0.0]) - 30.0).abs() < 5.0);
        assert!((model.predict(&[17.0, 0.0]) - 80.0).abs() < 5.0);
    }

    #[test]
    fn test_constant_target_predicts_mean() {
        let matrix = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![55.0, 55.0, 55.0];
        let model = BoostedStumpRegressor::fit(&matrix, &targets);
        assert!((model.predict(&[2.0]) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (matrix, targets) = step_data();
        let a = BoostedStumpRegressor::fit(&matrix, &targets);
        let b = BoostedStumpRegressor::fit(&matrix, &targets);
        assert_eq!(a.predict(&[5.0, 1.0]), b.predict(&[5.0, 1.0]));
        assert_eq!(a.stumps.len(), b.stumps.len());
    }

    #[test]
    fn test_empty_training_set_predicts_zero() {
        let model = BoostedStumpRegressor::fit(&[], &[]);
        assert_eq!(model.predict(&[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_max_feature_index_within_width() {
        let (matrix, targets) = step_data();
        let model = BoostedStumpRegressor::fit(&matrix, &targets);
        assert!(model.max_feature_index().unwrap() < 2);
    }
}
