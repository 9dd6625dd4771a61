//! Batch scoring and portfolio-level aggregation.
//!
//! Folds per-applicant decisions into summary counts, averages, and
//! chart-ready structures. Accumulation is sums and counts only, so the
//! aggregate result is identical for any processing order of the same rows.
//! An empty batch yields zeroed averages, not an error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decision::{score, ApprovalRecommendation, RiskCategory, RiskDecision};
use crate::model::bundle::RiskModelBundle;
use crate::types::{ApplicantRecord, Money, Rate, Score};
use crate::CreditRiskResult;

/// Score above which a reported decision metric reads "Good".
const GOOD_METRIC_THRESHOLD: Decimal = dec!(70);

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Applicant counts by risk tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

/// Applicant counts by recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub approve: u32,
    pub review: u32,
    pub reject: u32,
}

/// Batch-wide arithmetic means. All zero over an empty batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub default_probability: Rate,
    pub timeliness_score: Score,
    pub repayment_score: Score,
    pub monthly_income: Money,
}

/// One stage of the approval funnel chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStage {
    pub name: String,
    pub value: u32,
    pub color: String,
}

/// Funnel from received applications to approvals and rejections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalFunnel {
    pub title: String,
    pub stages: Vec<FunnelStage>,
}

/// Donut chart of the portfolio risk mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDistributionChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    pub colors: Vec<String>,
}

/// Chart-ready structures for the result bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visualizations {
    pub approval_funnel: ApprovalFunnel,
    pub risk_distribution_chart: RiskDistributionChart,
}

/// Provenance of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub timestamp: DateTime<Utc>,
    pub total_applicants: usize,
    pub model_version: String,
    pub analysis_type: String,
}

/// Demographics block of an applicant profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    pub gender: String,
    pub education: String,
    pub employment: String,
    pub monthly_income: Money,
}

/// One display-ready headline metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMetric {
    pub name: String,
    pub value: String,
    pub status: String,
}

/// Loan range and terms as presented per applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetails {
    pub eligible: bool,
    pub minimum: Money,
    pub maximum: Money,
    pub tenure_months: u32,
    pub monthly_emi: Money,
    pub interest_rate_min: Rate,
    pub interest_rate_max: Rate,
}

/// Per-applicant entry of the result bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub applicant_id: String,
    pub sequence_number: usize,
    pub demographics: Demographics,
    pub top_decision_metrics: Vec<DecisionMetric>,
    pub risk_assessment: RiskDecision,
    pub loan_details: LoanDetails,
}

/// The aggregate result bundle for one scored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub analysis_metadata: AnalysisMetadata,
    pub risk_distribution: RiskDistribution,
    pub approval_summary: ApprovalSummary,
    pub total_loan_potential: Money,
    pub average_metrics: AverageMetrics,
    pub individual_applicants: Vec<ApplicantProfile>,
    pub visualizations: Visualizations,
}

// ---------------------------------------------------------------------------
// Batch scoring
// ---------------------------------------------------------------------------

/// Score a typed table and aggregate the portfolio view.
pub fn score_batch(
    bundle: &RiskModelBundle,
    records: &[ApplicantRecord],
) -> (Vec<RiskDecision>, PortfolioSummary) {
    let decisions: Vec<RiskDecision> = records.iter().map(|record| score(bundle, record)).collect();
    let summary = aggregate(records, &decisions);
    (decisions, summary)
}

/// Score a table of raw row mappings, as handed over by an upload boundary.
/// The first malformed row fails the whole batch with its row index; there
/// is no partial-batch success.
pub fn score_batch_rows(
    bundle: &RiskModelBundle,
    rows: &[serde_json::Map<String, Value>],
) -> CreditRiskResult<(Vec<RiskDecision>, PortfolioSummary)> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| ApplicantRecord::from_row(index, row))
        .collect::<CreditRiskResult<Vec<ApplicantRecord>>>()?;
    Ok(score_batch(bundle, &records))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Fold decisions into the portfolio summary. `records` and `decisions` are
/// parallel slices.
pub fn aggregate(records: &[ApplicantRecord], decisions: &[RiskDecision]) -> PortfolioSummary {
    let mut risk_distribution = RiskDistribution::default();
    let mut approval_summary = ApprovalSummary::default();
    let mut total_loan_potential = Decimal::ZERO;
    let mut probability_sum = Decimal::ZERO;
    let mut timeliness_sum = Decimal::ZERO;
    let mut repayment_sum = Decimal::ZERO;
    let mut income_sum = Decimal::ZERO;

    for (record, decision) in records.iter().zip(decisions) {
        match decision.risk_category {
            RiskCategory::Low => risk_distribution.low += 1,
            RiskCategory::Medium => risk_distribution.medium += 1,
            RiskCategory::High => risk_distribution.high += 1,
        }
        match decision.approval_recommendation {
            ApprovalRecommendation::Approve => approval_summary.approve += 1,
            ApprovalRecommendation::Review => approval_summary.review += 1,
            ApprovalRecommendation::Reject => approval_summary.reject += 1,
        }
        total_loan_potential += decision.loan_recommendations.max_amount;
        probability_sum += decision.default_probability;
        timeliness_sum += decision.timeliness_score;
        repayment_sum += decision.repayment_ability_score;
        income_sum += record.monthly_income_inr;
    }

    let count = decisions.len();
    let average_metrics = if count == 0 {
        AverageMetrics {
            default_probability: Decimal::ZERO,
            timeliness_score: Decimal::ZERO,
            repayment_score: Decimal::ZERO,
            monthly_income: Decimal::ZERO,
        }
    } else {
        let divisor = Decimal::from(count as u64);
        AverageMetrics {
            default_probability: (probability_sum / divisor).round_dp(4),
            timeliness_score: (timeliness_sum / divisor).round_dp(1),
            repayment_score: (repayment_sum / divisor).round_dp(1),
            monthly_income: (income_sum / divisor).trunc(),
        }
    };

    let individual_applicants = records
        .iter()
        .zip(decisions)
        .enumerate()
        .map(|(index, (record, decision))| applicant_profile(index, record, decision))
        .collect();

    PortfolioSummary {
        analysis_metadata: AnalysisMetadata {
            timestamp: Utc::now(),
            total_applicants: count,
            model_version: env!("CARGO_PKG_VERSION").to_string(),
            analysis_type: "credit_risk_assessment".to_string(),
        },
        visualizations: visualizations(count, &risk_distribution, &approval_summary),
        risk_distribution,
        approval_summary,
        total_loan_potential,
        average_metrics,
        individual_applicants,
    }
}

fn applicant_profile(
    index: usize,
    record: &ApplicantRecord,
    decision: &RiskDecision,
) -> ApplicantProfile {
    let applicant_id = record
        .applicant_id
        .clone()
        .unwrap_or_else(|| format!("APP_{:03}", index + 1));

    let metric_status = |value: Decimal| {
        if value > GOOD_METRIC_THRESHOLD {
            "Good".to_string()
        } else {
            "Average".to_string()
        }
    };

    let top_decision_metrics = vec![
        DecisionMetric {
            name: "Default Risk".to_string(),
            value: format!(
                "{}%",
                (decision.default_probability * dec!(100)).round_dp(1)
            ),
            status: decision.risk_category.to_string(),
        },
        DecisionMetric {
            name: "Repayment Ability".to_string(),
            value: decision.repayment_ability_score.to_string(),
            status: metric_status(decision.repayment_ability_score),
        },
        DecisionMetric {
            name: "Payment Timeliness".to_string(),
            value: decision.timeliness_score.to_string(),
            status: metric_status(decision.timeliness_score),
        },
    ];

    ApplicantProfile {
        applicant_id,
        sequence_number: index + 1,
        demographics: Demographics {
            age: record.age,
            gender: record.gender.clone(),
            education: record.education_level.clone(),
            employment: record.employment_type.clone(),
            monthly_income: record.monthly_income_inr.trunc(),
        },
        top_decision_metrics,
        loan_details: LoanDetails {
            eligible: decision.approval_recommendation != ApprovalRecommendation::Reject,
            minimum: decision.loan_recommendations.min_amount,
            maximum: decision.loan_recommendations.max_amount,
            tenure_months: decision.loan_recommendations.suggested_term_months,
            monthly_emi: decision.loan_recommendations.estimated_emi,
            interest_rate_min: decision.loan_recommendations.interest_rate_range.min,
            interest_rate_max: decision.loan_recommendations.interest_rate_range.max,
        },
        risk_assessment: decision.clone(),
    }
}

fn visualizations(
    total: usize,
    risk_distribution: &RiskDistribution,
    approval_summary: &ApprovalSummary,
) -> Visualizations {
    Visualizations {
        approval_funnel: ApprovalFunnel {
            title: "Loan Approval Funnel".to_string(),
            stages: vec![
                FunnelStage {
                    name: "Total Applications".to_string(),
                    value: total as u32,
                    color: "#6c757d".to_string(),
                },
                FunnelStage {
                    name: "Approved".to_string(),
                    value: approval_summary.approve,
                    color: "#28a745".to_string(),
                },
                FunnelStage {
                    name: "Under Review".to_string(),
                    value: approval_summary.review,
                    color: "#ffc107".to_string(),
                },
                FunnelStage {
                    name: "Rejected".to_string(),
                    value: approval_summary.reject,
                    color: "#dc3545".to_string(),
                },
            ],
        },
        risk_distribution_chart: RiskDistributionChart {
            title: "Portfolio Risk Distribution".to_string(),
            labels: vec![
                "Low Risk".to_string(),
                "Medium Risk".to_string(),
                "High Risk".to_string(),
            ],
            values: vec![
                risk_distribution.low,
                risk_distribution.medium,
                risk_distribution.high,
            ],
            colors: vec![
                "#28a745".to_string(),
                "#ffc107".to_string(),
                "#dc3545".to_string(),
            ],
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
