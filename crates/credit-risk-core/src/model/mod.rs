//! The model trio: a binary default classifier and two continuous score
//! regressors over a shared, normalized feature representation. Fitting is
//! floating-point and fully deterministic; fitted state lives in
//! [`bundle::RiskModelBundle`] and is immutable once constructed.

pub mod boosting;
pub mod bundle;
pub mod logistic;
pub mod normalizer;

pub use boosting::BoostedStumpRegressor;
pub use bundle::{ModelScores, RiskModelBundle, TrainingReport};
pub use logistic::LogisticClassifier;
pub use normalizer::FeatureNormalizer;
