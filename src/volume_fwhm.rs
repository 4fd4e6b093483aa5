//! Volume FWHM estimation
//!
//! Estimates smoothness of a single 3D frame along each grid axis from the
//! variance of forward differences, then reports it in anatomical order.

use std::fmt;

use crate::config::FwhmOptions;
use crate::error::{FwhmError, Result};
use crate::field::Region;
use crate::orientation::remap_to_canonical;
use crate::stats::{apply_degenerate_policy, forman_fwhm, two_pass_statistics, FieldStatistics};
use crate::volume::{Volume, VolumeSpace};

/// Per-axis FWHM of a volume, in mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFwhm {
    /// (L/R, P/A, I/S)
    pub canonical: [f64; 3],
    /// In grid-axis (i, j, k) order
    pub grid: [f64; 3],
}

impl VolumeFwhm {
    pub fn x(&self) -> f64 {
        self.canonical[0]
    }

    pub fn y(&self) -> f64 {
        self.canonical[1]
    }

    pub fn z(&self) -> f64 {
        self.canonical[2]
    }
}

impl fmt::Display for VolumeFwhm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.canonical[0], self.canonical[1], self.canonical[2])
    }
}

/// Validate the ROI against the input's space and turn it into a region
pub(crate) fn roi_region<'a>(input: &Volume, roi: Option<&'a Volume>) -> Result<Region<'a>> {
    match roi {
        None => Ok(Region::all()),
        Some(roi) => {
            if !roi.space().matches(input.space()) {
                return Err(FwhmError::SpaceMismatch(
                    "roi volume does not match the space of the input volume".to_string(),
                ));
            }
            Ok(Region::from_slice(roi.roi_values()))
        }
    }
}

/// Convert grid statistics to FWHM using the space's spacing and orientation
pub(crate) fn fwhm_from_statistics(
    space: &VolumeSpace,
    stats: &FieldStatistics,
    options: &FwhmOptions,
) -> Result<VolumeFwhm> {
    let spacing = space.spacing();
    let mut grid = [0.0; 3];
    for (axis, out) in grid.iter_mut().enumerate() {
        let fwhm = forman_fwhm(spacing[axis], stats.directions[axis].variance, stats.variance);
        *out = apply_degenerate_policy(fwhm, axis, options)?;
    }
    let canonical = remap_to_canonical(grid, &space.orientation())?;
    Ok(VolumeFwhm { canonical, grid })
}

/// Estimate FWHM of one frame/component of a volume
///
/// # Arguments
/// * `input` - Input volume
/// * `roi` - Optional ROI volume (voxels with value > 0 are used); must match the input's space
/// * `frame` - Frame (subvolume) index
/// * `component` - Component index
/// * `options` - Degenerate-direction policy
///
/// # Returns
/// FWHM in mm along (L/R, P/A, I/S), plus the grid-axis values
pub fn estimate_volume_fwhm(
    input: &Volume,
    roi: Option<&Volume>,
    frame: usize,
    component: usize,
    options: &FwhmOptions,
) -> Result<VolumeFwhm> {
    let region = roi_region(input, roi)?;
    let data = input.frame(frame, component)?;
    let stats = two_pass_statistics(input.space(), region, &[data])?;
    fwhm_from_statistics(input.space(), &stats, options)
}
