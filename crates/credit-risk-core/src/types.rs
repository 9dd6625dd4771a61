use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CreditRiskError;
use crate::CreditRiskResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and ratios expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Behavioural scores on a 0-100 scale.
pub type Score = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// One loan applicant, fully typed.
///
/// The row boundary ([`ApplicantRecord::from_row`]) applies an explicit
/// default-if-absent policy: the four core fields (`age`,
/// `monthly_income_inr`, `monthly_expenses_inr`,
/// `outstanding_loan_amount_inr`) are required and fatal when missing; every
/// other numeric field defaults to 0, every categorical field defaults to
/// `"Unknown"`. Monetary and tenure fields must be non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<String>,

    // Demographics
    pub age: u32,
    pub gender: String,
    pub education_level: String,
    pub employment_type: String,
    pub marital_status: String,
    pub location_type: String,
    pub family_size: u32,
    pub number_of_dependents: u32,

    // Income and obligations
    pub monthly_income_inr: Money,
    pub monthly_expenses_inr: Money,
    pub monthly_savings_inr: Money,
    pub outstanding_loan_amount_inr: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_income_inr: Option<Money>,
    pub monthly_business_revenue_inr: Money,

    // Assets
    pub property_value_inr: Money,
    pub vehicle_value_inr: Money,
    pub total_investments_inr: Money,

    // Stability
    pub years_current_employment: Years,
    pub banking_relationship_years: Years,

    // Digital behaviour
    pub daily_mobile_hours: Decimal,
    pub monthly_digital_transactions: u32,
    pub avg_transaction_amount_inr: Money,
    pub social_media_accounts_count: u32,
    pub mobile_app_usage_intensity_score: Score,
    pub digital_payment_adoption_score: Score,
    pub utility_payment_regularity_score: Score,
    pub location_stability_score: Score,
    pub mobile_banking_usage_score: Score,

    // Composite bureau-style scores
    pub payment_reliability_score: Score,
    pub financial_health_score: Score,
    pub stability_index: Score,

    // Training targets. Unused at inference time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeliness_score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repayment_ability_score: Option<Score>,
}

impl Default for ApplicantRecord {
    fn default() -> Self {
        ApplicantRecord {
            applicant_id: None,
            age: 0,
            gender: "Unknown".to_string(),
            education_level: "Unknown".to_string(),
            employment_type: "Unknown".to_string(),
            marital_status: "Unknown".to_string(),
            location_type: "Unknown".to_string(),
            family_size: 0,
            number_of_dependents: 0,
            monthly_income_inr: Decimal::ZERO,
            monthly_expenses_inr: Decimal::ZERO,
            monthly_savings_inr: Decimal::ZERO,
            outstanding_loan_amount_inr: Decimal::ZERO,
            spouse_income_inr: None,
            monthly_business_revenue_inr: Decimal::ZERO,
            property_value_inr: Decimal::ZERO,
            vehicle_value_inr: Decimal::ZERO,
            total_investments_inr: Decimal::ZERO,
            years_current_employment: Decimal::ZERO,
            banking_relationship_years: Decimal::ZERO,
            daily_mobile_hours: Decimal::ZERO,
            monthly_digital_transactions: 0,
            avg_transaction_amount_inr: Decimal::ZERO,
            social_media_accounts_count: 0,
            mobile_app_usage_intensity_score: Decimal::ZERO,
            digital_payment_adoption_score: Decimal::ZERO,
            utility_payment_regularity_score: Decimal::ZERO,
            location_stability_score: Decimal::ZERO,
            mobile_banking_usage_score: Decimal::ZERO,
            payment_reliability_score: Decimal::ZERO,
            financial_health_score: Decimal::ZERO,
            stability_index: Decimal::ZERO,
            timeliness_score: None,
            repayment_ability_score: None,
        }
    }
}

impl ApplicantRecord {
    /// Parse one applicant from a generic row mapping.
    ///
    /// `row` is the zero-based position of the record in its table and is
    /// carried into error context so a caller can identify the offending
    /// line of an upload.
    pub fn from_row(
        row: usize,
        fields: &serde_json::Map<String, Value>,
    ) -> CreditRiskResult<ApplicantRecord> {
        let mut record = ApplicantRecord {
            applicant_id: fields
                .get("applicant_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            age: required_decimal(fields, "age", row)?
                .to_u32()
                .ok_or_else(|| CreditRiskError::InvalidInput {
                    field: "age".to_string(),
                    reason: format!("not a valid age at row {row}"),
                })?,
            monthly_income_inr: required_decimal(fields, "monthly_income_inr", row)?,
            monthly_expenses_inr: required_decimal(fields, "monthly_expenses_inr", row)?,
            outstanding_loan_amount_inr: required_decimal(
                fields,
                "outstanding_loan_amount_inr",
                row,
            )?,
            ..ApplicantRecord::default()
        };

        record.gender = categorical(fields, "gender");
        record.education_level = categorical(fields, "education_level");
        record.employment_type = categorical(fields, "employment_type");
        record.marital_status = categorical(fields, "marital_status");
        record.location_type = categorical(fields, "location_type");

        record.family_size = optional_count(fields, "family_size")?;
        record.number_of_dependents = optional_count(fields, "number_of_dependents")?;
        record.monthly_savings_inr = optional_decimal(fields, "monthly_savings_inr")?;
        record.spouse_income_inr = match fields.get("spouse_income_inr") {
            None | Some(Value::Null) => None,
            Some(_) => Some(optional_decimal(fields, "spouse_income_inr")?),
        };
        record.monthly_business_revenue_inr =
            optional_decimal(fields, "monthly_business_revenue_inr")?;
        record.property_value_inr = optional_decimal(fields, "property_value_inr")?;
        record.vehicle_value_inr = optional_decimal(fields, "vehicle_value_inr")?;
        record.total_investments_inr = optional_decimal(fields, "total_investments_inr")?;
        record.years_current_employment = optional_decimal(fields, "years_current_employment")?;
        record.banking_relationship_years =
            optional_decimal(fields, "banking_relationship_years")?;
        record.daily_mobile_hours = optional_decimal(fields, "daily_mobile_hours")?;
        record.monthly_digital_transactions =
            optional_count(fields, "monthly_digital_transactions")?;
        record.avg_transaction_amount_inr =
            optional_decimal(fields, "avg_transaction_amount_inr")?;
        record.social_media_accounts_count =
            optional_count(fields, "social_media_accounts_count")?;
        record.mobile_app_usage_intensity_score =
            optional_decimal(fields, "mobile_app_usage_intensity_score")?;
        record.digital_payment_adoption_score =
            optional_decimal(fields, "digital_payment_adoption_score")?;
        record.utility_payment_regularity_score =
            optional_decimal(fields, "utility_payment_regularity_score")?;
        record.location_stability_score = optional_decimal(fields, "location_stability_score")?;
        record.mobile_banking_usage_score =
            optional_decimal(fields, "mobile_banking_usage_score")?;
        record.payment_reliability_score =
            optional_decimal(fields, "payment_reliability_score")?;
        record.financial_health_score = optional_decimal(fields, "financial_health_score")?;
        record.stability_index = optional_decimal(fields, "stability_index")?;
        record.timeliness_score = target_score(fields, "timeliness_score")?;
        record.repayment_ability_score = target_score(fields, "repayment_ability_score")?;

        Ok(record)
    }

    /// Household income including spouse contribution, if any.
    pub fn household_income(&self) -> Money {
        self.monthly_income_inr + self.spouse_income_inr.unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Row parsing helpers
// ---------------------------------------------------------------------------

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

fn required_decimal(
    fields: &serde_json::Map<String, Value>,
    column: &str,
    row: usize,
) -> CreditRiskResult<Decimal> {
    let value = fields
        .get(column)
        .filter(|v| !v.is_null())
        .ok_or_else(|| CreditRiskError::MissingInput {
            column: column.to_string(),
            row: Some(row),
        })?;
    let parsed = decimal_value(value).ok_or_else(|| CreditRiskError::InvalidInput {
        field: column.to_string(),
        reason: format!("unparseable value at row {row}"),
    })?;
    non_negative(column, parsed)
}

fn optional_decimal(
    fields: &serde_json::Map<String, Value>,
    column: &str,
) -> CreditRiskResult<Decimal> {
    match fields.get(column) {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(value) => match decimal_value(value) {
            Some(parsed) => non_negative(column, parsed),
            None => Ok(Decimal::ZERO),
        },
    }
}

fn optional_count(fields: &serde_json::Map<String, Value>, column: &str) -> CreditRiskResult<u32> {
    Ok(optional_decimal(fields, column)?.to_u32().unwrap_or(0))
}

fn categorical(fields: &serde_json::Map<String, Value>, column: &str) -> String {
    fields
        .get(column)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn target_score(
    fields: &serde_json::Map<String, Value>,
    column: &str,
) -> CreditRiskResult<Option<Decimal>> {
    match fields.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match decimal_value(value) {
            Some(parsed) => Ok(Some(non_negative(column, parsed)?)),
            None => Ok(None),
        },
    }
}

fn non_negative(column: &str, value: Decimal) -> CreditRiskResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(CreditRiskError::InvalidInput {
            field: column.to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
