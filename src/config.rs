//! Estimator options
//!
//! Options are plain data with sensible defaults and serde support, so a
//! caller can keep them in a JSON config and only override what it needs.

use serde::{Deserialize, Serialize};

/// What to do when a direction yields a non-finite FWHM
///
/// A direction with zero variance of differences (flat data, or no in-ROI
/// neighbor pairs) drives the log argument of the conversion to exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Report NaN for that component
    #[default]
    Propagate,
    /// Fail with `FwhmError::DegenerateDirection`
    Error,
}

/// How mesh edge lengths enter the surface estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLengthScaling {
    /// Use raw differences, scale the result by the mean in-ROI edge length
    #[default]
    Mean,
    /// Divide every difference by its own edge length, result is per 1 mm step
    PerEdge,
}

/// Options shared by all estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FwhmOptions {
    pub degenerate: DegeneratePolicy,
    pub edge_scaling: EdgeLengthScaling,
}

impl FwhmOptions {
    /// Options that turn degenerate directions into errors
    pub fn strict() -> Self {
        Self {
            degenerate: DegeneratePolicy::Error,
            ..Self::default()
        }
    }

    pub fn with_edge_scaling(mut self, edge_scaling: EdgeLengthScaling) -> Self {
        self.edge_scaling = edge_scaling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_preserve_nan() {
        let opts = FwhmOptions::default();
        assert_eq!(opts.degenerate, DegeneratePolicy::Propagate);
        assert_eq!(opts.edge_scaling, EdgeLengthScaling::Mean);
    }

    #[test]
    fn test_partial_json() {
        let opts: FwhmOptions = serde_json::from_str(r#"{"degenerate": "error"}"#).unwrap();
        assert_eq!(opts.degenerate, DegeneratePolicy::Error);
        assert_eq!(opts.edge_scaling, EdgeLengthScaling::Mean);

        let opts: FwhmOptions = serde_json::from_str(r#"{"edge_scaling": "per_edge"}"#).unwrap();
        assert_eq!(opts, FwhmOptions::default().with_edge_scaling(EdgeLengthScaling::PerEdge));
    }
}
