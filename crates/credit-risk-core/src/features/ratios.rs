//! Derived financial ratios for one applicant.
//!
//! Covers:
//! 1. **Leverage** -- debt-to-income against annualised income.
//! 2. **Cash flow** -- savings rate and expense ratio.
//! 3. **Assets** -- total asset cover against annualised income.
//! 4. **Stability** -- employment, banking, and digital engagement indices.
//! 5. **Household** -- dependency ratio and income diversification.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`. Every income-like
//! denominator is floored at 1 before it is annualised or divided by, so no
//! division can fail and no ratio can come back undefined: a zero-income
//! applicant reports debt over 12, not an error. The same row function
//! serves both the bulk training path and single-record inference, which
//! makes the two paths identical by construction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{ApplicantRecord, Rate};

/// Months per year, used to annualise monthly income.
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Tenure horizon over which employment counts as fully stable.
const FULL_EMPLOYMENT_STABILITY_YEARS: Decimal = dec!(10);

/// Relationship horizon over which banking history counts as fully stable.
const FULL_BANKING_STABILITY_YEARS: Decimal = dec!(15);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The nine derived ratios, in the order they enter the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Outstanding debt over annualised income.
    pub debt_to_income_ratio: Rate,
    /// Monthly savings over monthly income.
    pub savings_rate: Rate,
    /// Monthly expenses over monthly income.
    pub expense_ratio: Rate,
    /// Property + vehicle + investments over annualised income.
    pub asset_to_income_ratio: Rate,
    /// Employment tenure scaled to [0, 1].
    pub employment_stability: Rate,
    /// Banking relationship length scaled to [0, 1].
    pub banking_stability: Rate,
    /// Blend of transaction volume and digital payment adoption, in [0, 1].
    pub digital_engagement: Rate,
    /// Dependents over family size.
    pub dependency_ratio: Rate,
    /// Spouse share of household income, in [0, 1].
    pub income_diversification: Rate,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Compute the nine derived ratios for a single applicant.
pub fn calculate_ratios(record: &ApplicantRecord) -> FinancialRatios {
    let monthly_income = floored(record.monthly_income_inr);
    let annual_income = monthly_income * MONTHS_PER_YEAR;

    let total_assets =
        record.property_value_inr + record.vehicle_value_inr + record.total_investments_inr;

    let employment_stability =
        (record.years_current_employment / FULL_EMPLOYMENT_STABILITY_YEARS).min(Decimal::ONE);
    let banking_stability =
        (record.banking_relationship_years / FULL_BANKING_STABILITY_YEARS).min(Decimal::ONE);

    // 60/40 blend of transaction volume and adoption score, both on a
    // 0-100 basis. Capped so heavy transactors cannot push it past 1.
    let transaction_component =
        (Decimal::from(record.monthly_digital_transactions) / dec!(100)).min(Decimal::ONE);
    let adoption_component = (record.digital_payment_adoption_score / dec!(100)).min(Decimal::ONE);
    let digital_engagement =
        transaction_component * dec!(0.6) + adoption_component * dec!(0.4);

    let spouse_income = record.spouse_income_inr.unwrap_or(Decimal::ZERO);
    let household_income = floored(record.monthly_income_inr + spouse_income);

    FinancialRatios {
        debt_to_income_ratio: record.outstanding_loan_amount_inr / annual_income,
        savings_rate: record.monthly_savings_inr / monthly_income,
        expense_ratio: record.monthly_expenses_inr / monthly_income,
        asset_to_income_ratio: total_assets / annual_income,
        employment_stability,
        banking_stability,
        digital_engagement,
        dependency_ratio: Decimal::from(record.number_of_dependents)
            / floored(Decimal::from(record.family_size)),
        income_diversification: spouse_income / household_income,
    }
}

/// Compute ratios for a whole table. One row in, one ratio set out.
pub fn calculate_ratios_bulk(records: &[ApplicantRecord]) -> Vec<FinancialRatios> {
    records.iter().map(calculate_ratios).collect()
}

/// Minimum-1 floor applied to every income-like denominator.
fn floored(denominator: Decimal) -> Decimal {
    denominator.max(Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
