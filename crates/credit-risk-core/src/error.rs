use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditRiskError {
    #[error("Missing required input: column '{column}'{}", row_suffix(.row))]
    MissingInput { column: String, row: Option<usize> },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Model bundle not found at '{path}'")]
    BundleNotFound { path: String },

    #[error("Model bundle at '{path}' is corrupt: {reason}")]
    BundleCorrupt { path: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(index) => format!(" at row {index}"),
        None => String::new(),
    }
}

impl From<serde_json::Error> for CreditRiskError {
    fn from(e: serde_json::Error) -> Self {
        CreditRiskError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_names_column_and_row() {
        let err = CreditRiskError::MissingInput {
            column: "monthly_income_inr".to_string(),
            row: Some(4),
        };
        assert_eq!(
            err.to_string(),
            "Missing required input: column 'monthly_income_inr' at row 4"
        );
    }

    #[test]
    fn test_missing_column_without_row_context() {
        let err = CreditRiskError::MissingInput {
            column: "timeliness_score".to_string(),
            row: None,
        };
        assert_eq!(
            err.to_string(),
            "Missing required input: column 'timeliness_score'"
        );
    }
}
