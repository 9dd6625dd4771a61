//! Categorical field encoding.
//!
//! Covers:
//! 1. **CategoryEncoder** -- one string-to-index mapping per categorical
//!    field, fitted once at training time and frozen afterwards.
//! 2. **EncoderSet** -- the five applicant encoders as one persisted unit.
//!
//! Indices are assigned over the *sorted* set of observed values, so the
//! fitted mapping is independent of row order. A value the fitted encoder
//! has never seen encodes to index 0. That fallback is a deliberate lenient
//! policy for inference on new data, not a general don't-care default: it
//! keeps a single unknown city or job title from failing a whole scoring
//! call, at the cost of aliasing it with the first fitted class.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::ApplicantRecord;

/// Index every unseen value maps to.
pub const FALLBACK_INDEX: usize = 0;

/// A fitted mapping from category value to integer index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: BTreeMap<String, usize>,
}

impl CategoryEncoder {
    /// Fit an encoder over the observed values. Values are de-duplicated and
    /// sorted before indices are assigned, so any permutation of the input
    /// produces the same mapping.
    pub fn fit<'a, I>(values: I) -> CategoryEncoder
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = values.into_iter().collect();
        CategoryEncoder {
            classes: unique
                .into_iter()
                .enumerate()
                .map(|(index, value)| (value.to_string(), index))
                .collect(),
        }
    }

    /// Encode a value against the frozen mapping. Unseen values encode to
    /// [`FALLBACK_INDEX`] rather than failing.
    pub fn encode(&self, value: &str) -> usize {
        self.classes.get(value).copied().unwrap_or(FALLBACK_INDEX)
    }

    /// Number of fitted classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The encoders for the five categorical applicant fields, fitted together
/// and persisted inside the model bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSet {
    pub gender: CategoryEncoder,
    pub education_level: CategoryEncoder,
    pub employment_type: CategoryEncoder,
    pub marital_status: CategoryEncoder,
    pub location_type: CategoryEncoder,
}

impl EncoderSet {
    /// Fit all five encoders over a training table.
    pub fn fit(records: &[ApplicantRecord]) -> EncoderSet {
        EncoderSet {
            gender: CategoryEncoder::fit(records.iter().map(|r| r.gender.as_str())),
            education_level: CategoryEncoder::fit(
                records.iter().map(|r| r.education_level.as_str()),
            ),
            employment_type: CategoryEncoder::fit(
                records.iter().map(|r| r.employment_type.as_str()),
            ),
            marital_status: CategoryEncoder::fit(
                records.iter().map(|r| r.marital_status.as_str()),
            ),
            location_type: CategoryEncoder::fit(records.iter().map(|r| r.location_type.as_str())),
        }
    }

    /// Encode one applicant's categorical fields, in feature-vector order.
    pub fn encode_record(&self, record: &ApplicantRecord) -> [usize; 5] {
        [
            self.gender.encode(&record.gender),
            self.education_level.encode(&record.education_level),
            self.employment_type.encode(&record.employment_type),
            self.marital_status.encode(&record.marital_status),
            self.location_type.encode(&record.location_type),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
