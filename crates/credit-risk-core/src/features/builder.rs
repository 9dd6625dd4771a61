//! Assembly of the fixed-width numeric feature vector.
//!
//! The 33 base features and 5 encoded categorical indices below are the
//! model's entire input contract. Training and inference both go through
//! [`feature_row`], so vector length and column order cannot drift between
//! the two phases; [`FEATURE_NAMES`] is persisted in the bundle as a
//! cross-check on load.
//!
//! This is the one place where `Decimal` values cross into `f64`: model
//! fitting downstream is floating-point (see `model`), while everything
//! money-shaped upstream stays exact.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::features::encoder::EncoderSet;
use crate::features::ratios::calculate_ratios;
use crate::types::ApplicantRecord;

/// Width of the assembled vector: 34 base features + 5 encoded categories.
pub const FEATURE_WIDTH: usize = 39;

/// Feature order, identical for training and inference.
pub const FEATURE_NAMES: [&str; FEATURE_WIDTH] = [
    "age",
    "family_size",
    "number_of_dependents",
    "monthly_income_inr",
    "monthly_expenses_inr",
    "monthly_savings_inr",
    "outstanding_loan_amount_inr",
    "property_value_inr",
    "vehicle_value_inr",
    "total_investments_inr",
    "years_current_employment",
    "banking_relationship_years",
    "monthly_business_revenue_inr",
    "daily_mobile_hours",
    "monthly_digital_transactions",
    "avg_transaction_amount_inr",
    "social_media_accounts_count",
    "mobile_app_usage_intensity_score",
    "digital_payment_adoption_score",
    "utility_payment_regularity_score",
    "location_stability_score",
    "mobile_banking_usage_score",
    "payment_reliability_score",
    "financial_health_score",
    "stability_index",
    "debt_to_income_ratio",
    "savings_rate",
    "expense_ratio",
    "asset_to_income_ratio",
    "employment_stability",
    "banking_stability",
    "digital_engagement",
    "dependency_ratio",
    "income_diversification",
    "gender_encoded",
    "education_level_encoded",
    "employment_type_encoded",
    "marital_status_encoded",
    "location_type_encoded",
];

/// Assemble the feature vector for one applicant.
pub fn feature_row(record: &ApplicantRecord, encoders: &EncoderSet) -> Vec<f64> {
    let ratios = calculate_ratios(record);
    let encoded = encoders.encode_record(record);

    let mut row = Vec::with_capacity(FEATURE_WIDTH);
    row.push(f64::from(record.age));
    row.push(f64::from(record.family_size));
    row.push(f64::from(record.number_of_dependents));
    row.push(to_f64(record.monthly_income_inr));
    row.push(to_f64(record.monthly_expenses_inr));
    row.push(to_f64(record.monthly_savings_inr));
    row.push(to_f64(record.outstanding_loan_amount_inr));
    row.push(to_f64(record.property_value_inr));
    row.push(to_f64(record.vehicle_value_inr));
    row.push(to_f64(record.total_investments_inr));
    row.push(to_f64(record.years_current_employment));
    row.push(to_f64(record.banking_relationship_years));
    row.push(to_f64(record.monthly_business_revenue_inr));
    row.push(to_f64(record.daily_mobile_hours));
    row.push(f64::from(record.monthly_digital_transactions));
    row.push(to_f64(record.avg_transaction_amount_inr));
    row.push(f64::from(record.social_media_accounts_count));
    row.push(to_f64(record.mobile_app_usage_intensity_score));
    row.push(to_f64(record.digital_payment_adoption_score));
    row.push(to_f64(record.utility_payment_regularity_score));
    row.push(to_f64(record.location_stability_score));
    row.push(to_f64(record.mobile_banking_usage_score));
    row.push(to_f64(record.payment_reliability_score));
    row.push(to_f64(record.financial_health_score));
    row.push(to_f64(record.stability_index));
    row.push(to_f64(ratios.debt_to_income_ratio));
    row.push(to_f64(ratios.savings_rate));
    row.push(to_f64(ratios.expense_ratio));
    row.push(to_f64(ratios.asset_to_income_ratio));
    row.push(to_f64(ratios.employment_stability));
    row.push(to_f64(ratios.banking_stability));
    row.push(to_f64(ratios.digital_engagement));
    row.push(to_f64(ratios.dependency_ratio));
    row.push(to_f64(ratios.income_diversification));
    for index in encoded {
        row.push(index as f64);
    }
    row
}

/// Assemble the feature matrix for a whole table.
pub fn build_matrix(records: &[ApplicantRecord], encoders: &EncoderSet) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|record| feature_row(record, encoders))
        .collect()
}

/// Decimal-to-float crossing. A Decimal too large for f64 cannot occur with
/// validated applicant fields; the zero fallback mirrors the fill-with-0
/// policy for derived values.
fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_records() -> Vec<ApplicantRecord> {
        vec![
            ApplicantRecord {
                age: 30,
                gender: "Female".to_string(),
                education_level: "Graduate".to_string(),
                monthly_income_inr: dec!(60000),
                monthly_expenses_inr: dec!(25000),
                ..ApplicantRecord::default()
            },
            ApplicantRecord {
                age: 45,
                gender: "Male".to_string(),
                education_level: "Post Graduate".to_string(),
                monthly_income_inr: dec!(90000),
                monthly_expenses_inr: dec!(30000),
                ..ApplicantRecord::default()
            },
        ]
    }

    #[test]
    fn test_row_width_matches_contract() {
        let records = sample_records();
        let encoders = EncoderSet::fit(&records);
        let row = feature_row(&records[0], &encoders);
        assert_eq!(row.len(), FEATURE_WIDTH);
        assert_eq!(FEATURE_NAMES.len(), FEATURE_WIDTH);
    }

    #[test]
    fn test_base_features_in_declared_order() {
        let records = sample_records();
        let encoders = EncoderSet::fit(&records);
        let row = feature_row(&records[0], &encoders);
        assert_eq!(row[0], 30.0);
        assert_eq!(row[3], 60000.0);
        assert_eq!(row[4], 25000.0);
    }

    #[test]
    fn test_encoded_categories_fill_the_tail() {
        let records = sample_records();
        let encoders = EncoderSet::fit(&records);
        let row = feature_row(&records[0], &encoders);
        // Female sorts before Male, Graduate before Post Graduate.
        assert_eq!(row[FEATURE_WIDTH - 5], 0.0);
        assert_eq!(row[FEATURE_WIDTH - 4], 0.0);
        let row = feature_row(&records[1], &encoders);
        assert_eq!(row[FEATURE_WIDTH - 5], 1.0);
        assert_eq!(row[FEATURE_WIDTH - 4], 1.0);
    }

    #[test]
    fn test_unseen_category_does_not_fail_assembly() {
        let records = sample_records();
        let encoders = EncoderSet::fit(&records);
        let stranger = ApplicantRecord {
            gender: "Nonbinary".to_string(),
            ..records[0].clone()
        };
        let row = feature_row(&stranger, &encoders);
        assert_eq!(row[FEATURE_WIDTH - 5], 0.0);
    }

    #[test]
    fn test_matrix_has_one_row_per_record() {
        let records = sample_records();
        let encoders = EncoderSet::fit(&records);
        let matrix = build_matrix(&records, &encoders);
        assert_eq!(matrix.len(), 2);
        assert!(matrix.iter().all(|row| row.len() == FEATURE_WIDTH));
    }
}
