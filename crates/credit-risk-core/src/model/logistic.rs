//! Binary logistic regression for default classification.
//!
//! Fitted by batch gradient descent with a fixed epoch count, zero-valued
//! initial weights, and no stochastic element, so identical training data
//! always produces identical coefficients. Class weights follow the
//! balanced scheme `n / (2 * n_class)`: the minority high-risk class pulls
//! on the gradient as hard as the majority class, which keeps the fitted
//! model from collapsing to the all-low-risk answer.

use serde::{Deserialize, Serialize};

const EPOCHS: usize = 300;
const LEARNING_RATE: f64 = 0.1;

/// Fitted coefficients of the default classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticClassifier {
    /// Fit on scaled features and binary labels.
    pub fn fit(matrix: &[Vec<f64>], labels: &[bool]) -> LogisticClassifier {
        let rows = matrix.len();
        let width = matrix.first().map_or(0, Vec::len);
        let n = rows.max(1) as f64;

        let positives = labels.iter().filter(|&&label| label).count().max(1) as f64;
        let negatives = (rows - labels.iter().filter(|&&label| label).count()).max(1) as f64;
        let positive_weight = n / (2.0 * positives);
        let negative_weight = n / (2.0 * negatives);

        let mut weights = vec![0.0; width];
        let mut bias = 0.0;

        for _ in 0..EPOCHS {
            let mut weight_grad = vec![0.0; width];
            let mut bias_grad = 0.0;

            for (row, &label) in matrix.iter().zip(labels) {
                let target = if label { 1.0 } else { 0.0 };
                let class_weight = if label { positive_weight } else { negative_weight };
                let error = class_weight * (sigmoid(dot(&weights, row) + bias) - target);
                for (grad, value) in weight_grad.iter_mut().zip(row) {
                    *grad += error * value;
                }
                bias_grad += error;
            }

            for (weight, grad) in weights.iter_mut().zip(&weight_grad) {
                *weight -= LEARNING_RATE * grad / n;
            }
            bias -= LEARNING_RATE * bias_grad / n;
        }

        LogisticClassifier { weights, bias }
    }

    /// Positive-class (default) probability for one scaled row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, row) + self.bias)
    }

    /// Hard classification at the 0.5 probability point.
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    /// Number of fitted coefficients.
    pub fn width(&self) -> usize {
        self.weights.len()
    }
}

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}

fn sigmoid(z: f64) -> f64 {
    // Saturate far tails before exponentiating.
    if z > 40.0 {
        1.0
    } else if z < -40.0 {
        0.0
    } else {
        1.0 / (1.0 + (-z).exp())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Linearly separable toy set: positive iff first feature is high.
    fn separable_data() -> (Vec<Vec<f64>>, Vec<bool>) {
        let matrix = vec![
            vec![-2.0, 0.3],
            vec![-1.5, -0.4],
            vec![-1.0, 0.1],
            vec![1.0, -0.2],
            vec![1.5, 0.4],
            vec![2.0, -0.1],
        ];
        let labels = vec![false, false, false, true, true, true];
        (matrix, labels)
    }

    #[test]
    fn test_fit_separates_separable_data() {
        let (matrix, labels) = separable_data();
        let model = LogisticClassifier::fit(&matrix, &labels);
        for (row, &label) in matrix.iter().zip(&labels) {
            assert_eq!(model.predict(row), label);
        }
    }

    #[test]
    fn test_probability_is_monotone_in_signal_feature() {
        let (matrix, labels) = separable_data();
        let model = LogisticClassifier::fit(&matrix, &labels);
        let low = model.predict_proba(&[-3.0, 0.0]);
        let mid = model.predict_proba(&[0.0, 0.0]);
        let high = model.predict_proba(&[3.0, 0.0]);
        assert!(low < mid && mid < high);
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let (matrix, labels) = separable_data();
        let model = LogisticClassifier::fit(&matrix, &labels);
        for row in &matrix {
            let p = model.predict_proba(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let (matrix, labels) = separable_data();
        let a = LogisticClassifier::fit(&matrix, &labels);
        let b = LogisticClassifier::fit(&matrix, &labels);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.bias, b.bias);
    }

    #[test]
    fn test_imbalanced_classes_still_learn_minority() {
        // One positive among nine negatives; balanced weights must keep the
        // positive region above 0.5.
        let mut matrix: Vec<Vec<f64>> = (0..9).map(|i| vec![-1.0 - f64::from(i) * 0.1]).collect();
        let mut labels = vec![false; 9];
        matrix.push(vec![2.0]);
        labels.push(true);
        let model = LogisticClassifier::fit(&matrix, &labels);
        assert!(model.predict(&[2.0]));
        assert!(!model.predict(&[-1.5]));
    }

    #[test]
    fn test_sigmoid_saturates_cleanly() {
        assert_eq!(sigmoid(100.0), 1.0);
        assert_eq!(sigmoid(-100.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
