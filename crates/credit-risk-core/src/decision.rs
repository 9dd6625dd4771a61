//! Mapping model output and raw applicant fields to a loan decision.
//!
//! Covers:
//! 1. **Risk tiers** -- fixed probability thresholds to Low/Medium/High.
//! 2. **Loan sizing** -- affordability from disposable income, an EMI
//!    approximation of existing obligations, and per-tier multipliers.
//! 3. **Terms** -- per-tier tenure and interest-rate bands.
//! 4. **Approval** -- a pure function of the risk tier.
//!
//! Tier thresholds here (0.07 / 0.18) are lending policy applied to the
//! model's output and are intentionally not the 0.12 used to derive
//! training labels in `labels`: the two numbers govern different stages and
//! are tuned independently. All money arithmetic uses
//! `rust_decimal::Decimal`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::features::ratios::calculate_ratios;
use crate::model::bundle::{ModelScores, RiskModelBundle};
use crate::types::{ApplicantRecord, Money, Rate, Score};

/// Default probability above which an applicant is High risk.
const HIGH_RISK_THRESHOLD: f64 = 0.18;

/// Default probability above which an applicant is Medium risk.
const MEDIUM_RISK_THRESHOLD: f64 = 0.07;

/// Existing debt is approximated as one EMI over this many months.
const EXISTING_DEBT_TENOR_MONTHS: Decimal = dec!(60);

/// Affordable-EMI level above which the loan range scales with income.
const EMI_SCALING_FLOOR: Decimal = dec!(800);

/// Absolute floors on the offered range.
const MIN_LOAN_FLOOR: Decimal = dec!(50000);
const MAX_LOAN_FLOOR: Decimal = dec!(100000);

// ---------------------------------------------------------------------------
// Tiers and recommendations
// ---------------------------------------------------------------------------

/// Risk tier derived from default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Tier from the classifier's default probability.
    pub fn from_probability(default_probability: f64) -> RiskCategory {
        if default_probability > HIGH_RISK_THRESHOLD {
            RiskCategory::High
        } else if default_probability > MEDIUM_RISK_THRESHOLD {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    /// Numeric severity, 1 (Low) to 3 (High).
    pub fn level(self) -> u8 {
        match self {
            RiskCategory::Low => 1,
            RiskCategory::Medium => 2,
            RiskCategory::High => 3,
        }
    }

    /// Display colour for dashboards.
    pub fn color(self) -> &'static str {
        match self {
            RiskCategory::Low => "#28a745",
            RiskCategory::Medium => "#ffc107",
            RiskCategory::High => "#dc3545",
        }
    }

    /// Share of available income a new EMI may consume.
    fn emi_multiplier(self) -> Decimal {
        match self {
            RiskCategory::Low => dec!(0.45),
            RiskCategory::Medium => dec!(0.35),
            RiskCategory::High => dec!(0.25),
        }
    }

    /// Suggested tenure in months.
    fn term_months(self) -> u32 {
        match self {
            RiskCategory::Low => 60,
            RiskCategory::Medium => 48,
            RiskCategory::High => 36,
        }
    }

    /// Annual interest-rate band in percent.
    fn rate_band(self) -> InterestRateBand {
        match self {
            RiskCategory::Low => InterestRateBand {
                min: dec!(8.5),
                max: dec!(12.0),
            },
            RiskCategory::Medium => InterestRateBand {
                min: dec!(11.0),
                max: dec!(15.0),
            },
            RiskCategory::High => InterestRateBand {
                min: dec!(14.0),
                max: dec!(20.0),
            },
        }
    }

    fn approval(self) -> ApprovalRecommendation {
        match self {
            RiskCategory::Low => ApprovalRecommendation::Approve,
            RiskCategory::Medium => ApprovalRecommendation::Review,
            RiskCategory::High => ApprovalRecommendation::Reject,
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::Low => write!(f, "Low"),
            RiskCategory::Medium => write!(f, "Medium"),
            RiskCategory::High => write!(f, "High"),
        }
    }
}

/// Per-applicant recommendation, a pure function of the risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalRecommendation {
    Approve,
    Review,
    Reject,
}

impl std::fmt::Display for ApprovalRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalRecommendation::Approve => write!(f, "Approve"),
            ApprovalRecommendation::Review => write!(f, "Review"),
            ApprovalRecommendation::Reject => write!(f, "Reject"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision payload
// ---------------------------------------------------------------------------

/// Annual interest-rate band in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRateBand {
    pub min: Rate,
    pub max: Rate,
}

/// The three headline ratios reported with every decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRatios {
    pub debt_to_income_ratio: Rate,
    pub savings_rate: Rate,
    pub expense_ratio: Rate,
}

/// Offered loan range and terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecommendation {
    pub min_amount: Money,
    pub max_amount: Money,
    pub suggested_term_months: u32,
    pub estimated_emi: Money,
    pub interest_rate_range: InterestRateBand,
}

/// Complete per-applicant risk decision. Computed fresh per scoring call and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDecision {
    pub default_probability: Rate,
    pub risk_category: RiskCategory,
    pub risk_level: u8,
    pub risk_color: String,
    pub timeliness_score: Score,
    pub repayment_ability_score: Score,
    pub financial_ratios: DecisionRatios,
    pub loan_recommendations: LoanRecommendation,
    pub approval_recommendation: ApprovalRecommendation,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Score one applicant: model inference plus decision mapping.
pub fn score(bundle: &RiskModelBundle, record: &ApplicantRecord) -> RiskDecision {
    map_decision(bundle.predict(record), record)
}

/// Map raw model output and applicant fields to the decision payload.
pub fn map_decision(scores: ModelScores, record: &ApplicantRecord) -> RiskDecision {
    let category = RiskCategory::from_probability(scores.default_probability);
    let ratios = calculate_ratios(record);

    RiskDecision {
        default_probability: decimal_from_f64(scores.default_probability).round_dp(4),
        risk_category: category,
        risk_level: category.level(),
        risk_color: category.color().to_string(),
        timeliness_score: decimal_from_f64(scores.timeliness_score).round_dp(1),
        repayment_ability_score: decimal_from_f64(scores.repayment_ability_score).round_dp(1),
        financial_ratios: DecisionRatios {
            debt_to_income_ratio: ratios.debt_to_income_ratio.round_dp(3),
            savings_rate: ratios.savings_rate.round_dp(3),
            expense_ratio: ratios.expense_ratio.round_dp(3),
        },
        loan_recommendations: recommend_loan(category, record),
        approval_recommendation: category.approval(),
    }
}

/// Size the offered loan range from affordability.
fn recommend_loan(category: RiskCategory, record: &ApplicantRecord) -> LoanRecommendation {
    let disposable_income = record.monthly_income_inr - record.monthly_expenses_inr;
    let existing_emi = if record.outstanding_loan_amount_inr > Decimal::ZERO {
        record.outstanding_loan_amount_inr / EXISTING_DEBT_TENOR_MONTHS
    } else {
        Decimal::ZERO
    };
    let available_income = disposable_income - existing_emi;
    let max_emi = available_income * category.emi_multiplier();

    let (min_loan, max_loan) = if max_emi > EMI_SCALING_FLOOR {
        (MIN_LOAN_FLOOR.max(max_emi * dec!(30)), max_emi * dec!(60))
    } else {
        (MIN_LOAN_FLOOR, MAX_LOAN_FLOOR)
    };

    let term_months = category.term_months();
    let estimated_emi = if max_loan > Decimal::ZERO {
        (max_loan / Decimal::from(term_months)).trunc()
    } else {
        Decimal::ZERO
    };

    LoanRecommendation {
        min_amount: MIN_LOAN_FLOOR.max(min_loan.trunc()),
        max_amount: MAX_LOAN_FLOOR.max(max_loan.trunc()),
        suggested_term_months: term_months,
        estimated_emi,
        interest_rate_range: category.rate_band(),
    }
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
