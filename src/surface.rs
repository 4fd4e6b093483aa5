//! Surface FWHM estimation
//!
//! A mesh has no canonical orthogonal axes, so all edges are pooled into a
//! single direction and one scalar FWHM is reported. Each edge is owned by
//! its lower-numbered vertex so every vertex pair is visited exactly once.

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::config::{EdgeLengthScaling, FwhmOptions};
use crate::error::{FwhmError, Result};
use crate::field::{Demeaned, ForwardNeighbor, NeighborStructure, Region};
use crate::stats::{apply_degenerate_policy, forman_fwhm, region_mean, two_pass_statistics, FieldStatistics};

/// Triangulated surface: vertex coordinates (mm) and unique edges
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    coords: Vec<[f64; 3]>,
    /// forward[a] holds (b, length) for every edge a-b with b > a
    forward: Vec<Vec<(usize, f64)>>,
}

/// Distance between two points (mm)
fn vertex_distance(v1: &[f64; 3], v2: &[f64; 3]) -> f64 {
    let dx = v2[0] - v1[0];
    let dy = v2[1] - v1[1];
    let dz = v2[2] - v1[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

impl SurfaceMesh {
    /// Build the unique edge set of a triangle list
    ///
    /// # Arguments
    /// * `coords` - Vertex coordinates in mm
    /// * `triangles` - Vertex indices of each triangle
    pub fn from_triangles(coords: Vec<[f64; 3]>, triangles: &[[usize; 3]]) -> Result<Self> {
        let n_vertices = coords.len();
        let mut forward: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_vertices];

        for (t, &[v0, v1, v2]) in triangles.iter().enumerate() {
            if v0 >= n_vertices || v1 >= n_vertices || v2 >= n_vertices {
                return Err(FwhmError::InvalidShape(format!(
                    "triangle {} references vertex out of range (have {})",
                    t, n_vertices
                )));
            }
            // Add edges v0-v1, v1-v2, v2-v0
            for &(a, b) in &[(v0, v1), (v1, v2), (v2, v0)] {
                if a == b {
                    continue;
                }
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                if !forward[lo].iter().any(|&(n, _)| n == hi) {
                    let length = vertex_distance(&coords[lo], &coords[hi]);
                    forward[lo].push((hi, length));
                }
            }
        }

        Ok(SurfaceMesh { coords, forward })
    }

    pub fn vertex_count(&self) -> usize {
        self.coords.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.iter().map(|f| f.len()).sum()
    }

    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// Mean length of edges whose endpoints are both in the region
    pub fn mean_edge_length(&self, region: Region<'_>) -> Option<f64> {
        let mut total_length = 0.0;
        let mut count = 0usize;
        for (a, edges) in self.forward.iter().enumerate() {
            if !region.contains(a) {
                continue;
            }
            for &(b, length) in edges {
                if region.contains(b) {
                    total_length += length;
                    count += 1;
                }
            }
        }
        if count > 0 {
            Some(total_length / count as f64)
        } else {
            None
        }
    }

    fn neighbors(&self, scaling: EdgeLengthScaling) -> MeshNeighbors<'_> {
        MeshNeighbors { mesh: self, scaling }
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.vertex_count() {
            return Err(FwhmError::SpaceMismatch(format!(
                "{} has {} vertices, surface has {}",
                what,
                len,
                self.vertex_count()
            )));
        }
        Ok(())
    }
}

/// Mesh edges as a single-direction neighbor structure
struct MeshNeighbors<'a> {
    mesh: &'a SurfaceMesh,
    scaling: EdgeLengthScaling,
}

impl NeighborStructure for MeshNeighbors<'_> {
    fn sample_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    fn direction_count(&self) -> usize {
        1
    }

    fn for_each_forward_neighbor<F: FnMut(ForwardNeighbor)>(&self, index: usize, mut f: F) {
        for &(b, length) in &self.mesh.forward[index] {
            let scale = match self.scaling {
                EdgeLengthScaling::Mean => 1.0,
                // coincident vertices have no per-mm gradient
                EdgeLengthScaling::PerEdge if length <= 0.0 => continue,
                EdgeLengthScaling::PerEdge => 1.0 / length,
            };
            f(ForwardNeighbor { direction: 0, index: b, scale });
        }
    }
}

fn surface_region<'a>(mesh: &SurfaceMesh, roi: Option<ArrayView1<'a, f32>>) -> Result<Region<'a>> {
    match roi {
        None => Ok(Region::all()),
        Some(roi) => {
            mesh.check_len("roi", roi.len())?;
            Ok(Region::from_mask(roi))
        }
    }
}

fn fwhm_from_statistics(
    mesh: &SurfaceMesh,
    region: Region<'_>,
    stats: &FieldStatistics,
    options: &FwhmOptions,
) -> Result<f64> {
    let spacing = match options.edge_scaling {
        EdgeLengthScaling::Mean => mesh.mean_edge_length(region).unwrap_or(f64::NAN),
        EdgeLengthScaling::PerEdge => 1.0,
    };
    let fwhm = forman_fwhm(spacing, stats.directions[0].variance, stats.variance);
    apply_degenerate_policy(fwhm, 0, options)
}

/// Estimate FWHM of one column of per-vertex data
///
/// # Arguments
/// * `mesh` - Surface the data is sampled on
/// * `values` - One value per vertex
/// * `roi` - Optional per-vertex ROI (vertices with value > 0 are used)
/// * `options` - Edge-length scaling and degenerate-direction policy
///
/// # Returns
/// FWHM in mm
pub fn estimate_surface_fwhm(
    mesh: &SurfaceMesh,
    values: ArrayView1<'_, f32>,
    roi: Option<ArrayView1<'_, f32>>,
    options: &FwhmOptions,
) -> Result<f64> {
    let region = surface_region(mesh, roi)?;
    mesh.check_len("data", values.len())?;
    let stats = two_pass_statistics(&mesh.neighbors(options.edge_scaling), region, &[values])?;
    fwhm_from_statistics(mesh, region, &stats, options)
}

/// Estimate FWHM of all columns at once, pooled into one population
///
/// # Arguments
/// * `columns` - Data shaped (vertices, columns)
/// * `demean` - Subtract the per-vertex mean across columns first (in-ROI vertices only)
pub fn estimate_surface_fwhm_all_columns(
    mesh: &SurfaceMesh,
    columns: ArrayView2<'_, f32>,
    roi: Option<ArrayView1<'_, f32>>,
    demean: bool,
    options: &FwhmOptions,
) -> Result<f64> {
    let region = surface_region(mesh, roi)?;
    mesh.check_len("data", columns.nrows())?;

    let fields: Vec<ArrayView1<'_, f32>> = columns.axis_iter(Axis(1)).collect();
    let neighbors = mesh.neighbors(options.edge_scaling);
    let stats = if demean {
        let mean = region_mean(&fields, region, mesh.vertex_count());
        let demeaned: Vec<Demeaned<'_, ArrayView1<'_, f32>>> = fields
            .iter()
            .map(|field| Demeaned { field: field.view(), mean: &mean })
            .collect();
        two_pass_statistics(&neighbors, region, &demeaned)?
    } else {
        two_pass_statistics(&neighbors, region, &fields)?
    };
    fwhm_from_statistics(mesh, region, &stats, options)
}
