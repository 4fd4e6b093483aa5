//! Labeled per-subvolume and per-column results
//!
//! Mirrors what a command-line front end prints: one line per estimate,
//! prefixed by `subvol N `, `component M ` or `column N ` only when the input
//! actually has more than one of them (numbers are 1-based).

use std::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::config::FwhmOptions;
use crate::error::{FwhmError, Result};
use crate::surface::{estimate_surface_fwhm, SurfaceMesh};
use crate::volume::Volume;
use crate::volume_fwhm::{estimate_volume_fwhm, roi_region, VolumeFwhm};

/// An estimate with its printable label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledFwhm<T> {
    pub label: String,
    pub fwhm: T,
}

impl<T: fmt::Display> fmt::Display for LabeledFwhm<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}FWHM: {}", self.label, self.fwhm)
    }
}

fn volume_label(input: &Volume, frame: usize, component: usize) -> String {
    let mut label = String::new();
    if input.frames() != 1 {
        label.push_str(&format!("subvol {} ", frame + 1));
    }
    if input.components() != 1 {
        label.push_str(&format!("component {} ", component + 1));
    }
    label
}

/// Estimate every subvolume/component separately
///
/// # Arguments
/// * `subvolume` - Restrict to one subvolume (all of its components), or `None` for all
pub fn estimate_volume_fwhm_per_subvolume(
    input: &Volume,
    roi: Option<&Volume>,
    subvolume: Option<usize>,
    options: &FwhmOptions,
) -> Result<Vec<LabeledFwhm<VolumeFwhm>>> {
    roi_region(input, roi)?;
    let frames: Vec<usize> = match subvolume {
        Some(s) if s >= input.frames() => {
            return Err(FwhmError::IndexOutOfRange { what: "subvolume", index: s, len: input.frames() });
        }
        Some(s) => vec![s],
        None => (0..input.frames()).collect(),
    };

    let mut out = Vec::with_capacity(frames.len() * input.components());
    for &t in &frames {
        for c in 0..input.components() {
            let fwhm = estimate_volume_fwhm(input, roi, t, c, options)?;
            out.push(LabeledFwhm { label: volume_label(input, t, c), fwhm });
        }
    }
    Ok(out)
}

/// Estimate every column of per-vertex data separately
pub fn estimate_surface_fwhm_per_column(
    mesh: &SurfaceMesh,
    columns: ArrayView2<'_, f32>,
    roi: Option<ArrayView1<'_, f32>>,
    options: &FwhmOptions,
) -> Result<Vec<LabeledFwhm<f64>>> {
    let n_columns = columns.ncols();
    let mut out = Vec::with_capacity(n_columns);
    for (c, column) in columns.axis_iter(Axis(1)).enumerate() {
        let fwhm = estimate_surface_fwhm(mesh, column, roi, options)?;
        let label = if n_columns != 1 { format!("column {} ", c + 1) } else { String::new() };
        out.push(LabeledFwhm { label, fwhm });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeSpace;
    use ndarray::Array2;

    fn noisy_series(frames: usize, components: usize) -> Volume {
        let space = VolumeSpace::with_voxel_size([3, 3, 3], [1.0, 1.0, 1.0]);
        let n = space.frame_size() * frames * components;
        // deterministic pseudo-random values
        let data = (0..n).map(|v| ((v * 7919) % 13) as f32).collect();
        Volume::new(space, frames, components, data).unwrap()
    }

    #[test]
    fn test_labels_single_frame() {
        let vol = noisy_series(1, 1);
        let results = estimate_volume_fwhm_per_subvolume(&vol, None, None, &FwhmOptions::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "");
        assert!(results[0].to_string().starts_with("FWHM: "));
    }

    #[test]
    fn test_labels_multi_frame_and_component() {
        let vol = noisy_series(2, 2);
        let results = estimate_volume_fwhm_per_subvolume(&vol, None, None, &FwhmOptions::default()).unwrap();
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            ["subvol 1 component 1 ", "subvol 1 component 2 ", "subvol 2 component 1 ", "subvol 2 component 2 "]
        );

        let selected = estimate_volume_fwhm_per_subvolume(&vol, None, Some(1), &FwhmOptions::default()).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].label, "subvol 2 component 1 ");
        assert_eq!(selected[1].to_string(), results[3].to_string());
    }

    #[test]
    fn test_subvolume_out_of_range() {
        let vol = noisy_series(2, 1);
        let err = estimate_volume_fwhm_per_subvolume(&vol, None, Some(2), &FwhmOptions::default()).unwrap_err();
        assert!(matches!(err, FwhmError::IndexOutOfRange { what: "subvolume", .. }));
    }

    #[test]
    fn test_display_line() {
        let line = LabeledFwhm { label: "column 2 ".to_string(), fwhm: 4.5 };
        assert_eq!(line.to_string(), "column 2 FWHM: 4.5");
    }

    #[test]
    fn test_surface_columns() {
        let coords = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let mesh = SurfaceMesh::from_triangles(coords, &[[0, 1, 2], [1, 3, 2]]).unwrap();
        let columns = Array2::from_shape_vec((4, 2), vec![0.0f32, 1.0, 1.0, 0.0, 3.0, 2.0, 2.0, 5.0]).unwrap();
        let results = estimate_surface_fwhm_per_column(&mesh, columns.view(), None, &FwhmOptions::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "column 1 ");
        assert_eq!(results[1].label, "column 2 ");
    }
}
