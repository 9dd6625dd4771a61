//! Deterministic feature derivation: financial ratios, categorical
//! encoding, and fixed-order feature vector assembly.

pub mod builder;
pub mod encoder;
pub mod ratios;

pub use builder::{build_matrix, feature_row, FEATURE_NAMES, FEATURE_WIDTH};
pub use encoder::{CategoryEncoder, EncoderSet};
pub use ratios::{calculate_ratios, calculate_ratios_bulk, FinancialRatios};
