//! Error taxonomy for the analytics core.
//!
//! The transforms are pure: they either return a value or hand one of these
//! back to the caller. Empty input is never an error — it yields an empty
//! result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// An equity sample whose time cannot be parsed or whose equity is not
    /// a finite number. The whole series is rejected: one corrupt sample
    /// would poison the running peak for everything after it.
    #[error("malformed equity sample at index {index}: {reason}")]
    MalformedSample { index: usize, reason: String },

    /// A win rate that cannot be brought onto the canonical 0-100 scale
    /// (negative, non-finite, or above 100 after normalization).
    #[error("win rate {value} cannot be normalized to the 0-100 scale")]
    InconsistentScale { value: f64 },
}
