//! Synthetic default-probability targets for classifier training.
//!
//! No verified default-outcome column exists in the applicant data, so the
//! classifier is supervised with a rule-derived stand-in: a weighted sum of
//! domain risk factors, clamped to [0.01, 0.35]. Each contribution is capped
//! so no single factor can dominate the target and the resulting class
//! balance stays usable for training. The weights are empirically tuned,
//! not estimated from data.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::features::ratios::calculate_ratios;
use crate::types::{ApplicantRecord, Rate};

/// Baseline default probability before penalties and bonuses.
const BASE_RATE: Decimal = dec!(0.04);

/// Scale and cap for the debt-to-income penalty.
const DEBT_PENALTY_SCALE: Decimal = dec!(0.06);
const DEBT_PENALTY_CAP: Decimal = dec!(0.15);

/// Flat penalties and their trigger thresholds.
const LOW_INCOME_PENALTY: Decimal = dec!(0.03);
const LOW_INCOME_THRESHOLD: Decimal = dec!(25000);
const YOUNG_AGE_PENALTY: Decimal = dec!(0.02);
const YOUNG_AGE_THRESHOLD: u32 = 23;
const SHORT_TENURE_PENALTY: Decimal = dec!(0.03);
const SHORT_TENURE_THRESHOLD: Decimal = dec!(1.5);

/// Scale and cap for the savings-rate bonus.
const SAVINGS_BONUS_SCALE: Decimal = dec!(0.15);
const SAVINGS_BONUS_CAP: Decimal = dec!(0.08);

/// Income-tier bonuses.
const HIGH_INCOME_BONUS: Decimal = dec!(0.04);
const HIGH_INCOME_THRESHOLD: Decimal = dec!(60000);
const MID_INCOME_BONUS: Decimal = dec!(0.02);
const MID_INCOME_THRESHOLD: Decimal = dec!(40000);

/// Scale and cap for the tenure bonus.
const TENURE_BONUS_SCALE: Decimal = dec!(0.008);
const TENURE_BONUS_CAP: Decimal = dec!(0.04);

/// Education-tier bonuses.
const ADVANCED_EDUCATION_BONUS: Decimal = dec!(0.025);
const GRADUATE_EDUCATION_BONUS: Decimal = dec!(0.01);

/// Bounds on the final synthetic probability.
const FLOOR: Decimal = dec!(0.01);
const CEILING: Decimal = dec!(0.35);

/// Probability above which a training row is labelled high-risk. This is a
/// labelling policy and intentionally not the same number as the decision
/// tier thresholds in `decision`, which are business policy applied to
/// model output.
pub const HIGH_RISK_LABEL_THRESHOLD: Decimal = dec!(0.12);

/// Rule-derived default probability target for one training row.
pub fn default_probability_target(record: &ApplicantRecord) -> Rate {
    let ratios = calculate_ratios(record);

    let debt_penalty = (ratios.debt_to_income_ratio * DEBT_PENALTY_SCALE).min(DEBT_PENALTY_CAP);
    let low_income_penalty = if record.monthly_income_inr < LOW_INCOME_THRESHOLD {
        LOW_INCOME_PENALTY
    } else {
        Decimal::ZERO
    };
    let young_penalty = if record.age < YOUNG_AGE_THRESHOLD {
        YOUNG_AGE_PENALTY
    } else {
        Decimal::ZERO
    };
    let employment_penalty = if record.years_current_employment < SHORT_TENURE_THRESHOLD {
        SHORT_TENURE_PENALTY
    } else {
        Decimal::ZERO
    };

    let savings_bonus = (ratios.savings_rate * SAVINGS_BONUS_SCALE).min(SAVINGS_BONUS_CAP);
    let income_bonus = if record.monthly_income_inr > HIGH_INCOME_THRESHOLD {
        HIGH_INCOME_BONUS
    } else if record.monthly_income_inr > MID_INCOME_THRESHOLD {
        MID_INCOME_BONUS
    } else {
        Decimal::ZERO
    };
    let stability_bonus =
        (record.years_current_employment * TENURE_BONUS_SCALE).min(TENURE_BONUS_CAP);
    let education_bonus = match record.education_level.as_str() {
        "Post Graduate" | "Professional" => ADVANCED_EDUCATION_BONUS,
        "Graduate" => GRADUATE_EDUCATION_BONUS,
        _ => Decimal::ZERO,
    };

    let raw = BASE_RATE + debt_penalty + low_income_penalty + young_penalty + employment_penalty
        - savings_bonus
        - income_bonus
        - stability_bonus
        - education_bonus;

    raw.clamp(FLOOR, CEILING)
}

/// Binary high-risk label for one training row.
pub fn high_risk_label(record: &ApplicantRecord) -> bool {
    default_probability_target(record) > HIGH_RISK_LABEL_THRESHOLD
}

/// Targets and labels for a whole training table.
pub fn label_table(records: &[ApplicantRecord]) -> Vec<(Rate, bool)> {
    records
        .iter()
        .map(|record| {
            let target = default_probability_target(record);
            (target, target > HIGH_RISK_LABEL_THRESHOLD)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn low_risk_applicant() -> ApplicantRecord {
        ApplicantRecord {
            age: 40,
            monthly_income_inr: dec!(80000),
            monthly_expenses_inr: dec!(20000),
            monthly_savings_inr: dec!(20000),
            outstanding_loan_amount_inr: Decimal::ZERO,
            years_current_employment: dec!(10),
            education_level: "Post Graduate".to_string(),
            ..ApplicantRecord::default()
        }
    }

    fn high_risk_applicant() -> ApplicantRecord {
        ApplicantRecord {
            age: 20,
            monthly_income_inr: dec!(15000),
            monthly_expenses_inr: dec!(14000),
            outstanding_loan_amount_inr: dec!(500000),
            years_current_employment: dec!(0.5),
            ..ApplicantRecord::default()
        }
    }

    #[test]
    fn test_low_risk_applicant_hits_floor() {
        // All bonuses active, no penalties: raw goes negative, clamps to floor.
        assert_eq!(default_probability_target(&low_risk_applicant()), dec!(0.01));
    }

    #[test]
    fn test_high_risk_applicant_accumulates_penalties() {
        // Debt penalty caps at 0.15; all flat penalties trigger.
        // 0.04 + 0.15 + 0.03 + 0.02 + 0.03 - 0.004 = 0.266
        let target = default_probability_target(&high_risk_applicant());
        assert_eq!(target, dec!(0.266));
    }

    #[test]
    fn test_output_always_within_bounds() {
        let extremes = vec![
            ApplicantRecord::default(),
            ApplicantRecord {
                age: 0,
                monthly_income_inr: Decimal::ZERO,
                outstanding_loan_amount_inr: dec!(100000000),
                ..ApplicantRecord::default()
            },
            ApplicantRecord {
                monthly_income_inr: dec!(10000000),
                monthly_savings_inr: dec!(9000000),
                years_current_employment: dec!(40),
                education_level: "Professional".to_string(),
                age: 60,
                ..ApplicantRecord::default()
            },
        ];
        for record in &extremes {
            let target = default_probability_target(record);
            assert!(target >= dec!(0.01) && target <= dec!(0.35), "target {target} out of bounds");
        }
    }

    #[test]
    fn test_debt_ten_times_income_caps_penalty() {
        let record = ApplicantRecord {
            age: 30,
            monthly_income_inr: dec!(30000),
            outstanding_loan_amount_inr: dec!(3600000),
            years_current_employment: dec!(3),
            ..ApplicantRecord::default()
        };
        // Debt-to-income is 10, scaled penalty 0.6 caps at 0.15.
        // 0.04 + 0.15 - 0.024 = 0.166
        assert_eq!(default_probability_target(&record), dec!(0.166));
    }

    #[test]
    fn test_label_thresholds_at_twelve_percent() {
        assert!(!high_risk_label(&low_risk_applicant()));
        assert!(high_risk_label(&high_risk_applicant()));
    }

    #[test]
    fn test_label_table_matches_row_function() {
        let records = vec![low_risk_applicant(), high_risk_applicant()];
        let labels = label_table(&records);
        assert_eq!(labels[0].0, default_probability_target(&records[0]));
        assert!(!labels[0].1);
        assert!(labels[1].1);
    }

    #[test]
    fn test_education_tiers() {
        // Enough debt to keep the raw value clear of the 0.01 floor.
        let mut record = low_risk_applicant();
        record.monthly_income_inr = dec!(30000);
        record.monthly_savings_inr = Decimal::ZERO;
        record.years_current_employment = dec!(2);
        record.outstanding_loan_amount_inr = dec!(360000);

        record.education_level = "High School".to_string();
        let base = default_probability_target(&record);
        record.education_level = "Graduate".to_string();
        let graduate = default_probability_target(&record);
        record.education_level = "Professional".to_string();
        let professional = default_probability_target(&record);

        // Debt-to-income 1.0 puts the base at 0.04 + 0.06 - 0.016 = 0.084.
        assert_eq!(base, dec!(0.084));
        assert_eq!(base - graduate, dec!(0.01));
        assert_eq!(base - professional, dec!(0.025));
    }
}
