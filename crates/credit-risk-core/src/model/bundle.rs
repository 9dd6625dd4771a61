//! The trained model trio as one persistable unit.
//!
//! Covers:
//! 1. **Training** -- fit encoders, normalizer, the default classifier, and
//!    both score regressors from one labelled table, with a seeded 80/20
//!    hold-out for the reported classifier accuracy.
//! 2. **Inference** -- frozen-state prediction of default probability and
//!    the two continuous scores, clamped to [25, 95].
//! 3. **Persistence** -- whole-bundle save/load as a single JSON document.
//!
//! A [`RiskModelBundle`] can only be obtained from [`RiskModelBundle::train`]
//! or [`RiskModelBundle::load`] and exposes no mutating methods, so every
//! bundle in existence is fully fitted and internally consistent: encoders,
//! normalizer, and models are fit jointly and travel together. Partial
//! reloads are not supported and not meaningful.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::CreditRiskError;
use crate::features::builder::{build_matrix, feature_row, FEATURE_NAMES, FEATURE_WIDTH};
use crate::features::encoder::EncoderSet;
use crate::labels::label_table;
use crate::model::boosting::BoostedStumpRegressor;
use crate::model::logistic::LogisticClassifier;
use crate::model::normalizer::FeatureNormalizer;
use crate::types::ApplicantRecord;
use crate::CreditRiskResult;

/// Hold-out share of the training table.
const TEST_FRACTION: f64 = 0.2;

/// Seed for the train/test shuffle. Fixed so a retrain on the same table
/// reproduces the same split, accuracy, and fitted models bit for bit.
const SPLIT_SEED: u64 = 42;

/// Bounds on the two regression scores.
const SCORE_FLOOR: f64 = 25.0;
const SCORE_CEILING: f64 = 95.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Raw model outputs for one applicant, before decision mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScores {
    /// Classifier positive-class probability, in [0, 1].
    pub default_probability: f64,
    /// Payment timeliness estimate, clamped to [25, 95].
    pub timeliness_score: f64,
    /// Repayment ability estimate, clamped to [25, 95].
    pub repayment_ability_score: f64,
}

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Rows in the training table.
    pub samples: usize,
    /// Rows held out for the accuracy estimate.
    pub test_samples: usize,
    /// Classifier accuracy on the held-out rows.
    pub default_model_accuracy: f64,
    /// Synthetic-label class balance over the full table.
    pub high_risk_count: usize,
    pub low_risk_count: usize,
    /// Wall-clock training time.
    pub elapsed_us: u64,
    /// Crate version that produced the bundle.
    pub version: String,
}

/// The frozen, persistable unit of fitted models and fitted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModelBundle {
    feature_names: Vec<String>,
    encoders: EncoderSet,
    normalizer: FeatureNormalizer,
    default_model: LogisticClassifier,
    timeliness_model: BoostedStumpRegressor,
    repayment_model: BoostedStumpRegressor,
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

impl RiskModelBundle {
    /// Fit the full bundle from a labelled training table.
    pub fn train(
        records: &[ApplicantRecord],
    ) -> CreditRiskResult<(RiskModelBundle, TrainingReport)> {
        let started = Instant::now();

        if records.is_empty() {
            return Err(CreditRiskError::EmptyDataset(
                "no applicant rows to train on".to_string(),
            ));
        }

        let timeliness_targets = regression_targets(records, "timeliness_score", |record| {
            record.timeliness_score
        })?;
        let repayment_targets = regression_targets(records, "repayment_ability_score", |record| {
            record.repayment_ability_score
        })?;

        let encoders = EncoderSet::fit(records);
        let matrix = build_matrix(records, &encoders);
        let normalizer = FeatureNormalizer::fit(&matrix);
        let scaled = normalizer.transform(&matrix);

        let labels: Vec<bool> = label_table(records)
            .into_iter()
            .map(|(_, high_risk)| high_risk)
            .collect();
        let high_risk_count = labels.iter().filter(|&&label| label).count();

        let (train_indices, test_indices) = split_indices(records.len());

        let train_rows: Vec<Vec<f64>> = train_indices.iter().map(|&i| scaled[i].clone()).collect();
        let train_labels: Vec<bool> = train_indices.iter().map(|&i| labels[i]).collect();
        let train_timeliness: Vec<f64> =
            train_indices.iter().map(|&i| timeliness_targets[i]).collect();
        let train_repayment: Vec<f64> =
            train_indices.iter().map(|&i| repayment_targets[i]).collect();

        let default_model = LogisticClassifier::fit(&train_rows, &train_labels);
        let timeliness_model = BoostedStumpRegressor::fit(&train_rows, &train_timeliness);
        let repayment_model = BoostedStumpRegressor::fit(&train_rows, &train_repayment);

        let (accuracy_indices, test_samples) = if test_indices.is_empty() {
            (&train_indices, 0)
        } else {
            (&test_indices, test_indices.len())
        };
        let correct = accuracy_indices
            .iter()
            .filter(|&&i| default_model.predict(&scaled[i]) == labels[i])
            .count();
        let default_model_accuracy = correct as f64 / accuracy_indices.len().max(1) as f64;

        let bundle = RiskModelBundle {
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            encoders,
            normalizer,
            default_model,
            timeliness_model,
            repayment_model,
        };
        let report = TrainingReport {
            samples: records.len(),
            test_samples,
            default_model_accuracy,
            high_risk_count,
            low_risk_count: records.len() - high_risk_count,
            elapsed_us: started.elapsed().as_micros() as u64,
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        Ok((bundle, report))
    }

    /// Score one applicant against the frozen bundle.
    pub fn predict(&self, record: &ApplicantRecord) -> ModelScores {
        let row = feature_row(record, &self.encoders);
        let scaled = self.normalizer.transform_row(&row);
        ModelScores {
            default_probability: self.default_model.predict_proba(&scaled),
            timeliness_score: self
                .timeliness_model
                .predict(&scaled)
                .clamp(SCORE_FLOOR, SCORE_CEILING),
            repayment_ability_score: self
                .repayment_model
                .predict(&scaled)
                .clamp(SCORE_FLOOR, SCORE_CEILING),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the whole bundle to `path` as one JSON document. The write goes
    /// through a sibling temp file and a rename, so a crash mid-write leaves
    /// either the old bundle or none, never a torn one.
    pub fn save(&self, path: &Path) -> CreditRiskResult<()> {
        let json = serde_json::to_string(self)?;
        let temp_path = path.with_file_name(format!(
            "{}.tmp",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bundle".to_string())
        ));
        fs::write(&temp_path, json).map_err(|e| io_to_save_error(path, e))?;
        fs::rename(&temp_path, path).map_err(|e| io_to_save_error(path, e))
    }

    /// Load a bundle previously written by [`RiskModelBundle::save`]. The
    /// parsed state is cross-checked for internal consistency before it is
    /// handed out; anything torn, truncated, or dimensionally wrong fails as
    /// `BundleCorrupt`.
    pub fn load(path: &Path) -> CreditRiskResult<RiskModelBundle> {
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CreditRiskError::BundleNotFound {
                path: path.display().to_string(),
            },
            _ => CreditRiskError::BundleCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        let bundle: RiskModelBundle =
            serde_json::from_str(&json).map_err(|e| CreditRiskError::BundleCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        bundle.validate(path)?;
        Ok(bundle)
    }

    fn validate(&self, path: &Path) -> CreditRiskResult<()> {
        let corrupt = |reason: String| CreditRiskError::BundleCorrupt {
            path: path.display().to_string(),
            reason,
        };
        if self.feature_names != FEATURE_NAMES {
            return Err(corrupt("feature name list does not match this version".to_string()));
        }
        if self.normalizer.width() != FEATURE_WIDTH {
            return Err(corrupt(format!(
                "normalizer fitted on {} columns, expected {FEATURE_WIDTH}",
                self.normalizer.width()
            )));
        }
        if self.default_model.width() != FEATURE_WIDTH {
            return Err(corrupt(format!(
                "classifier fitted on {} columns, expected {FEATURE_WIDTH}",
                self.default_model.width()
            )));
        }
        for (name, model) in [
            ("timeliness", &self.timeliness_model),
            ("repayment", &self.repayment_model),
        ] {
            if let Some(index) = model.max_feature_index() {
                if index >= FEATURE_WIDTH {
                    return Err(corrupt(format!(
                        "{name} model splits on feature {index}, expected < {FEATURE_WIDTH}"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deterministic shuffled 80/20 split. With fewer than two rows everything
/// trains and nothing is held out.
fn split_indices(rows: usize) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    indices.shuffle(&mut rng);

    if rows < 2 {
        return (indices, Vec::new());
    }
    let test_len = ((rows as f64 * TEST_FRACTION).round() as usize).clamp(1, rows - 1);
    let test = indices.split_off(rows - test_len);
    (indices, test)
}

/// Pull one regression target column, imputing missing values with the
/// column mean. A column with no values at all is a missing required input.
fn regression_targets(
    records: &[ApplicantRecord],
    column: &str,
    value: impl Fn(&ApplicantRecord) -> Option<rust_decimal::Decimal>,
) -> CreditRiskResult<Vec<f64>> {
    let present: Vec<f64> = records
        .iter()
        .filter_map(|record| value(record).and_then(|score| score.to_f64()))
        .collect();
    if present.is_empty() {
        return Err(CreditRiskError::MissingInput {
            column: column.to_string(),
            row: None,
        });
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    Ok(records
        .iter()
        .map(|record| {
            value(record)
                .and_then(|score| score.to_f64())
                .unwrap_or(mean)
        })
        .collect())
}

fn io_to_save_error(path: &Path, e: io::Error) -> CreditRiskError {
    match e.kind() {
        io::ErrorKind::NotFound => CreditRiskError::BundleNotFound {
            path: path.display().to_string(),
        },
        _ => CreditRiskError::SerializationError(format!(
            "failed to write bundle at '{}': {e}",
            path.display()
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// A spread of applicants wide enough to give both label classes.
    fn training_table() -> Vec<ApplicantRecord> {
        let mut records = Vec::new();
        for i in 0..30u32 {
            let prosperous = i % 2 == 0;
            records.push(ApplicantRecord {
                age: 22 + i,
                gender: if i % 3 == 0 { "Female" } else { "Male" }.to_string(),
                education_level: if prosperous { "Post Graduate" } else { "High School" }
                    .to_string(),
                employment_type: "Salaried".to_string(),
                marital_status: "Married".to_string(),
                location_type: "Urban".to_string(),
                family_size: 3,
                number_of_dependents: 1,
                monthly_income_inr: if prosperous {
                    dec!(80000) + rust_decimal::Decimal::from(i * 1000)
                } else {
                    dec!(15000) + rust_decimal::Decimal::from(i * 200)
                },
                monthly_expenses_inr: dec!(12000),
                monthly_savings_inr: if prosperous { dec!(20000) } else { dec!(200) },
                outstanding_loan_amount_inr: if prosperous {
                    dec!(0)
                } else {
                    dec!(900000)
                },
                years_current_employment: if prosperous { dec!(9) } else { dec!(0.5) },
                banking_relationship_years: dec!(4),
                timeliness_score: Some(if prosperous { dec!(85) } else { dec!(40) }),
                repayment_ability_score: Some(if prosperous { dec!(88) } else { dec!(35) }),
                ..ApplicantRecord::default()
            });
        }
        records
    }

    #[test]
    fn test_train_reports_both_classes() {
        let (_, report) = RiskModelBundle::train(&training_table()).unwrap();
        assert_eq!(report.samples, 30);
        assert_eq!(report.test_samples, 6);
        assert!(report.high_risk_count > 0);
        assert!(report.low_risk_count > 0);
        assert_eq!(report.high_risk_count + report.low_risk_count, 30);
    }

    #[test]
    fn test_train_rejects_empty_table() {
        let err = RiskModelBundle::train(&[]).unwrap_err();
        assert!(matches!(err, CreditRiskError::EmptyDataset(_)));
    }

    #[test]
    fn test_train_requires_a_target_column() {
        let mut records = training_table();
        for record in &mut records {
            record.timeliness_score = None;
        }
        let err = RiskModelBundle::train(&records).unwrap_err();
        match err {
            CreditRiskError::MissingInput { column, row } => {
                assert_eq!(column, "timeliness_score");
                assert_eq!(row, None);
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_targets_are_mean_imputed() {
        let mut records = training_table();
        records[3].timeliness_score = None;
        records[7].repayment_ability_score = None;
        // Training must succeed; imputation is internal.
        assert!(RiskModelBundle::train(&records).is_ok());
    }

    #[test]
    fn test_predict_scores_within_bounds() {
        let (bundle, _) = RiskModelBundle::train(&training_table()).unwrap();
        for record in &training_table() {
            let scores = bundle.predict(record);
            assert!((0.0..=1.0).contains(&scores.default_probability));
            assert!((25.0..=95.0).contains(&scores.timeliness_score));
            assert!((25.0..=95.0).contains(&scores.repayment_ability_score));
        }
    }

    #[test]
    fn test_predict_separates_the_classes() {
        let records = training_table();
        let (bundle, _) = RiskModelBundle::train(&records).unwrap();
        // Record 0 is prosperous, record 1 is strained.
        let strong = bundle.predict(&records[0]);
        let weak = bundle.predict(&records[1]);
        assert!(strong.default_probability < weak.default_probability);
        assert!(strong.repayment_ability_score > weak.repayment_ability_score);
    }

    #[test]
    fn test_training_is_reproducible() {
        let records = training_table();
        let (bundle_a, report_a) = RiskModelBundle::train(&records).unwrap();
        let (bundle_b, report_b) = RiskModelBundle::train(&records).unwrap();
        assert_eq!(report_a.default_model_accuracy, report_b.default_model_accuracy);
        let probe = &records[5];
        let a = bundle_a.predict(probe);
        let b = bundle_b.predict(probe);
        assert_eq!(a.default_probability, b.default_probability);
        assert_eq!(a.timeliness_score, b.timeliness_score);
    }

    #[test]
    fn test_unseen_category_at_inference_is_tolerated() {
        let records = training_table();
        let (bundle, _) = RiskModelBundle::train(&records).unwrap();
        let stranger = ApplicantRecord {
            location_type: "Offshore Platform".to_string(),
            ..records[0].clone()
        };
        let scores = bundle.predict(&stranger);
        assert!((0.0..=1.0).contains(&scores.default_probability));
    }

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let (train_a, test_a) = split_indices(50);
        let (train_b, test_b) = split_indices(50);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 40);
        assert_eq!(test_a.len(), 10);
        for index in &test_a {
            assert!(!train_a.contains(index));
        }
    }

    #[test]
    fn test_single_row_trains_without_holdout() {
        let records = vec![training_table().remove(0)];
        let (_, report) = RiskModelBundle::train(&records).unwrap();
        assert_eq!(report.test_samples, 0);
    }

    #[test]
    fn test_load_missing_path_is_not_found() {
        let err =
            RiskModelBundle::load(Path::new("/nonexistent/risk_models.json")).unwrap_err();
        assert!(matches!(err, CreditRiskError::BundleNotFound { .. }));
    }

    #[test]
    fn test_load_torn_file_is_corrupt() {
        let path = std::env::temp_dir().join(format!(
            "credit-risk-torn-{}.json",
            std::process::id()
        ));
        fs::write(&path, "{\"feature_names\": [\"age\"").unwrap();
        let err = RiskModelBundle::load(&path).unwrap_err();
        assert!(matches!(err, CreditRiskError::BundleCorrupt { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_load_roundtrip_preserves_scores() {
        let records = training_table();
        let (bundle, _) = RiskModelBundle::train(&records).unwrap();
        let path = std::env::temp_dir().join(format!(
            "credit-risk-roundtrip-{}.json",
            std::process::id()
        ));
        bundle.save(&path).unwrap();
        let reloaded = RiskModelBundle::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        for record in &records {
            let before = bundle.predict(record);
            let after = reloaded.predict(record);
            assert!((before.default_probability - after.default_probability).abs() < 1e-9);
            assert!((before.timeliness_score - after.timeliness_score).abs() < 1e-9);
            assert!((before.repayment_ability_score - after.repayment_ability_score).abs() < 1e-9);
        }
    }
}
