//! Anatomical orientation of volume grid axes
//!
//! World coordinates follow the RAS+ convention (x increases to the right,
//! y anteriorly, z superiorly). Each grid axis is tagged with the anatomical
//! direction its index increases along, so that per-axis results can be
//! reported in canonical (L/R, P/A, I/S) order regardless of storage order.

use crate::error::{FwhmError, Result};

/// Direction of increasing index along one grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientType {
    LeftToRight,
    RightToLeft,
    PosteriorToAnterior,
    AnteriorToPosterior,
    InferiorToSuperior,
    SuperiorToInferior,
}

impl OrientType {
    /// Canonical output slot: 0 = L/R, 1 = P/A, 2 = I/S
    pub fn canonical_axis(self) -> usize {
        match self {
            OrientType::LeftToRight | OrientType::RightToLeft => 0,
            OrientType::PosteriorToAnterior | OrientType::AnteriorToPosterior => 1,
            OrientType::InferiorToSuperior | OrientType::SuperiorToInferior => 2,
        }
    }

    fn from_world_axis(world_axis: usize, positive: bool) -> Self {
        match (world_axis, positive) {
            (0, true) => OrientType::LeftToRight,
            (0, false) => OrientType::RightToLeft,
            (1, true) => OrientType::PosteriorToAnterior,
            (1, false) => OrientType::AnteriorToPosterior,
            (_, true) => OrientType::InferiorToSuperior,
            (_, false) => OrientType::SuperiorToInferior,
        }
    }
}

/// Grid-axis to world-axis assignments, in the order they are tried
const AXIS_PERMUTATIONS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

/// Tag each grid axis with the anatomical direction it runs along
///
/// Picks the one-to-one grid-to-world assignment that maximises
/// `|i[a] * j[b] * k[c]|` over the spacing vectors, so oblique and skewed
/// affines still get three distinct axes. Ties keep the earlier permutation,
/// and a zero spacing vector falls back to the identity assignment.
///
/// # Arguments
/// * `sform` - 3x4 index-to-world affine, row-major (`sform[row][col]`)
///
/// # Returns
/// One `OrientType` per grid axis (i, j, k)
pub fn orientation_from_affine(sform: &[[f64; 4]; 3]) -> [OrientType; 3] {
    let mut best = AXIS_PERMUTATIONS[0];
    let mut best_val = -1.0;
    for perm in AXIS_PERMUTATIONS {
        let val = (sform[perm[0]][0] * sform[perm[1]][1] * sform[perm[2]][2]).abs();
        if val > best_val {
            best_val = val;
            best = perm;
        }
    }

    let mut orient = [OrientType::LeftToRight; 3];
    for (axis, slot) in orient.iter_mut().enumerate() {
        let world = best[axis];
        *slot = OrientType::from_world_axis(world, sform[world][axis] >= 0.0);
    }
    orient
}

/// Permute per-grid-axis values into canonical (L/R, P/A, I/S) order
///
/// Fails if the orientation does not assign exactly one grid axis to each
/// canonical axis. Tags from `orientation_from_affine` always do; hand-built
/// tags may not.
pub fn remap_to_canonical(grid: [f64; 3], orient: &[OrientType; 3]) -> Result<[f64; 3]> {
    let mut out = [0.0; 3];
    let mut seen = [false; 3];
    for (axis, o) in orient.iter().enumerate() {
        let slot = o.canonical_axis();
        if seen[slot] {
            return Err(FwhmError::InvalidOrientation(format!(
                "more than one grid axis maps to anatomical axis {} ({:?})",
                slot, orient
            )));
        }
        seen[slot] = true;
        out[slot] = grid[axis];
    }
    Ok(out)
}
