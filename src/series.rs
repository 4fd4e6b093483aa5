//! Whole-series volume FWHM
//!
//! Treats every frame and component of a 4D/5D volume as one pooled
//! population: all frames feed the same global and per-axis accumulators,
//! instead of producing one estimate per frame.
//!
//! With `demean`, the per-voxel mean over frames (kept separately for each
//! component) is subtracted first. That mean is computed and applied only at
//! in-ROI voxels, which keeps the working set down for sparse ROIs.

use log::debug;

use crate::config::FwhmOptions;
use crate::error::Result;
use crate::field::{Demeaned, Region};
use crate::stats::{region_mean, two_pass_statistics, FieldStatistics};
use crate::volume::Volume;
use crate::volume_fwhm::{fwhm_from_statistics, roi_region, VolumeFwhm};

/// All frames of one component, in frame order
fn component_frames(input: &Volume, component: usize) -> Result<Vec<&[f32]>> {
    (0..input.frames()).map(|t| input.frame(t, component)).collect()
}

/// Pooled two-pass statistics over every frame and component
///
/// # Arguments
/// * `input` - Input volume series
/// * `roi` - Optional ROI volume; must match the input's space
/// * `demean` - Subtract the per-voxel temporal mean (per component) first
pub fn whole_series_statistics(input: &Volume, roi: Option<&Volume>, demean: bool) -> Result<FieldStatistics> {
    let region = roi_region(input, roi)?;
    let space = input.space();

    let mut frames: Vec<&[f32]> = Vec::with_capacity(input.frames() * input.components());
    for c in 0..input.components() {
        frames.extend(component_frames(input, c)?);
    }

    if !demean {
        return two_pass_statistics(space, region, &frames);
    }

    let means = component_means(input, region)?;
    let n_frames = input.frames();
    let demeaned: Vec<Demeaned<'_, &[f32]>> = frames
        .iter()
        .enumerate()
        .map(|(n, &field)| Demeaned { field, mean: &means[n / n_frames] })
        .collect();
    two_pass_statistics(space, region, &demeaned)
}

/// Per-component mean image over frames, filled only inside the region
fn component_means(input: &Volume, region: Region<'_>) -> Result<Vec<Vec<f64>>> {
    let size = input.space().frame_size();
    let mut means = Vec::with_capacity(input.components());
    for c in 0..input.components() {
        let frames = component_frames(input, c)?;
        means.push(region_mean(&frames, region, size));
    }
    debug!("computed {} mean image(s) over {} frames", means.len(), input.frames());
    Ok(means)
}

/// Estimate FWHM of a whole volume series at once
///
/// Same failure modes as `estimate_volume_fwhm`. For a single-frame,
/// single-component volume without `demean` the result is identical to
/// estimating frame 0.
pub fn estimate_volume_fwhm_whole_series(
    input: &Volume,
    roi: Option<&Volume>,
    demean: bool,
    options: &FwhmOptions,
) -> Result<VolumeFwhm> {
    let stats = whole_series_statistics(input, roi, demean)?;
    fwhm_from_statistics(input.space(), &stats, options)
}
