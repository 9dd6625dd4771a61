//! Credit default risk scoring and loan decisioning.
//!
//! The crate is a pure function surface over typed applicant records:
//! deterministic ratio derivation and feature assembly, synthetic
//! label generation for classifier training, a trained model trio
//! (default classifier plus two score regressors) persisted as one
//! immutable bundle, and deterministic mapping of model output to risk
//! tiers, loan terms, and portfolio aggregates. Upload handling, HTTP
//! routing, and relational persistence live outside this crate.

pub mod decision;
pub mod error;
pub mod features;
pub mod labels;
pub mod model;
pub mod portfolio;
pub mod types;

pub use decision::{score, ApprovalRecommendation, RiskCategory, RiskDecision};
pub use error::CreditRiskError;
pub use model::bundle::{ModelScores, RiskModelBundle, TrainingReport};
pub use portfolio::{score_batch, score_batch_rows, PortfolioSummary};
pub use types::ApplicantRecord;

/// Standard result type for all credit-risk operations
pub type CreditRiskResult<T> = Result<T, CreditRiskError>;
