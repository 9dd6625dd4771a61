//! Per-column feature normalization (zero mean, unit variance).

use serde::{Deserialize, Serialize};

/// Floor applied to a column's standard deviation so constant columns
/// normalize to zero instead of dividing by zero.
const STD_FLOOR: f64 = 1e-9;

/// A fitted mean/std scaler. Fitted once on the training matrix, frozen,
/// and persisted with the model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureNormalizer {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl FeatureNormalizer {
    /// Fit column means and population standard deviations.
    pub fn fit(matrix: &[Vec<f64>]) -> FeatureNormalizer {
        let rows = matrix.len();
        let width = matrix.first().map_or(0, Vec::len);
        let n = rows.max(1) as f64;

        let mut means = vec![0.0; width];
        for row in matrix {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut variances = vec![0.0; width];
        for row in matrix {
            for ((variance, mean), value) in variances.iter_mut().zip(&means).zip(row) {
                let delta = value - mean;
                *variance += delta * delta;
            }
        }
        let std_devs = variances
            .iter()
            .map(|variance| (variance / n).sqrt().max(STD_FLOOR))
            .collect();

        FeatureNormalizer { means, std_devs }
    }

    /// Scale one row against the fitted statistics.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .zip(&self.std_devs)
            .map(|((value, mean), std_dev)| (value - mean) / std_dev)
            .collect()
    }

    /// Scale a whole matrix.
    pub fn transform(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
        matrix.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.means.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_fit_centers_and_scales() {
        let matrix = vec![vec![1.0, 10.0], vec![3.0, 30.0], vec![5.0, 50.0]];
        let scaler = FeatureNormalizer::fit(&matrix);
        let scaled = scaler.transform(&matrix);

        for column in 0..2 {
            let mean: f64 = scaled.iter().map(|row| row[column]).sum::<f64>() / 3.0;
            assert!(approx_eq(mean, 0.0), "column {column} mean {mean}");
        }
        // Middle row sits exactly on the mean.
        assert!(approx_eq(scaled[1][0], 0.0));
        assert!(scaled[0][0] < 0.0 && scaled[2][0] > 0.0);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let matrix = vec![vec![7.0], vec![7.0], vec![7.0]];
        let scaler = FeatureNormalizer::fit(&matrix);
        let scaled = scaler.transform(&matrix);
        assert!(scaled.iter().all(|row| approx_eq(row[0], 0.0)));
    }

    #[test]
    fn test_transform_row_matches_matrix_path() {
        let matrix = vec![vec![2.0, 4.0], vec![6.0, 8.0]];
        let scaler = FeatureNormalizer::fit(&matrix);
        assert_eq!(scaler.transform(&matrix)[0], scaler.transform_row(&matrix[0]));
    }

    #[test]
    fn test_width_reports_fitted_columns() {
        let scaler = FeatureNormalizer::fit(&[vec![1.0, 2.0, 3.0]]);
        assert_eq!(scaler.width(), 3);
    }
}
