//! Error types for FWHM estimation

use thiserror::Error;

/// Errors raised by the estimators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FwhmError {
    /// No sample passed the ROI test (or the field has no samples)
    #[error("ROI is empty or input has no samples")]
    EmptyRegion,

    /// ROI or data domain does not match the field's domain
    #[error("space mismatch: {0}")]
    SpaceMismatch(String),

    /// A direction produced a non-finite FWHM (only raised under `DegeneratePolicy::Error`)
    #[error("degenerate direction {direction}: FWHM is not finite")]
    DegenerateDirection { direction: usize },

    /// Orientation tags do not map exactly one grid axis to each anatomical axis
    #[error("invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Frame, component or column selection outside the data
    #[error("{what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Data length inconsistent with the declared dimensions
    #[error("invalid shape: {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, FwhmError>;
