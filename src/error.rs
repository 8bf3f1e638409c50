//! Error types raised by the aggregation engine.
//!
//! Command-level code works with `anyhow::Result`; the engine itself
//! (record store, merge, ordering) reports these typed conditions so that
//! callers can tell a malformed address apart from a broken merge.

use crate::store::types::InputCategory;
use thiserror::Error;

/// Conditions the engine can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiftError {
    /// An address string is not four dot-separated groups of 1-3 digits.
    #[error("malformed address: '{address}'")]
    MalformedAddress { address: String },

    /// Two records for different addresses were handed to `combine`.
    #[error("cannot merge records for different addresses ('{left}' and '{right}')")]
    MismatchedAddress { left: String, right: String },

    /// Two records from different input categories were handed to `combine`.
    #[error("cannot merge a '{left}' record with a '{right}' record")]
    MismatchedCategory {
        left: InputCategory,
        right: InputCategory,
    },

    /// The same evidence label holds a counter on one side and field groups on the other.
    #[error("evidence '{label}' is a counter in one record and a field list in the other")]
    MismatchedEvidence { label: String },
}

impl SiftError {
    /// True for the merge-related variants, which indicate a programming defect.
    pub fn is_mismatched_merge(&self) -> bool {
        matches!(
            self,
            Self::MismatchedAddress { .. }
                | Self::MismatchedCategory { .. }
                | Self::MismatchedEvidence { .. }
        )
    }
}
