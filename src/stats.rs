//! Masked two-pass statistics engine
//!
//! Computes the mean and variance of in-region sample values and, per
//! direction, the mean and variance of forward differences between in-region
//! neighbor pairs. Means are computed in a first full pass and only then used
//! in a second pass for the squared deviations, which avoids the bias and
//! cancellation of single-pass variance formulas.
//!
//! Several fields may be passed at once (e.g. every frame of a series); they
//! are pooled into the same accumulators.
//!
//! Reference for the FWHM conversion:
//! Forman, S.D., Cohen, J.D., Fitzgerald, M., Eddy, W.F., Mintun, M.A., Noll, D.C. (1995).
//! "Improved assessment of significant activation in functional magnetic resonance
//! imaging (fMRI): use of a cluster-size threshold." Magn. Reson. Med. 33, 636-647.

use log::{debug, warn};

use crate::config::{DegeneratePolicy, FwhmOptions};
use crate::error::{FwhmError, Result};
use crate::field::{NeighborStructure, Region, SampleField};

/// Running count/sum/squared-deviation for one population
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulator {
    count: u64,
    sum: f64,
    sum_sq_dev: f64,
}

impl Accumulator {
    #[inline]
    fn add(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
    }

    #[inline]
    fn add_deviation(&mut self, x: f64, mean: f64) {
        let d = x - mean;
        self.sum_sq_dev += d * d;
    }

    /// Mean, or 0 for an empty population
    fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }

    /// Population variance, or 0 for an empty population
    fn variance(&self) -> f64 {
        if self.count > 0 {
            self.sum_sq_dev / self.count as f64
        } else {
            0.0
        }
    }
}

/// Statistics of forward differences along one direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionStats {
    /// Number of in-region neighbor pairs
    pub count: u64,
    pub mean: f64,
    pub variance: f64,
}

/// Result of the two-pass computation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatistics {
    /// Number of in-region samples (pooled over all fields)
    pub count: u64,
    pub mean: f64,
    pub variance: f64,
    pub directions: Vec<DirectionStats>,
}

enum Visit {
    Sample(f64),
    Difference { direction: usize, diff: f64 },
}

/// Walk every in-region sample of every field, and every forward neighbor
/// pair with both endpoints in the region. Both passes go through here so
/// their gating is identical.
fn traverse<N, F, V>(neighbors: &N, region: Region<'_>, fields: &[F], mut visit: V)
where
    N: NeighborStructure,
    F: SampleField,
    V: FnMut(Visit),
{
    let n = neighbors.sample_count();
    for field in fields {
        for index in 0..n {
            if !region.contains(index) {
                continue;
            }
            let center = field.value(index);
            visit(Visit::Sample(center));
            neighbors.for_each_forward_neighbor(index, |nb| {
                if region.contains(nb.index) {
                    let diff = (center - field.value(nb.index)) * nb.scale;
                    visit(Visit::Difference { direction: nb.direction, diff });
                }
            });
        }
    }
}

/// Global and per-direction statistics over the in-region samples of `fields`
///
/// # Arguments
/// * `neighbors` - Neighbor relation defining the index domain and directions
/// * `region` - Inclusion mask over the same domain
/// * `fields` - One or more fields over the domain, pooled together
///
/// # Errors
/// * `SpaceMismatch` if the mask or any field does not cover the domain exactly
/// * `EmptyRegion` if no sample is in the region
pub fn two_pass_statistics<N, F>(
    neighbors: &N,
    region: Region<'_>,
    fields: &[F],
) -> Result<FieldStatistics>
where
    N: NeighborStructure,
    F: SampleField,
{
    let n = neighbors.sample_count();
    if let Some(len) = region.mask_len() {
        if len != n {
            return Err(FwhmError::SpaceMismatch(format!(
                "roi has {} samples, field domain has {}",
                len, n
            )));
        }
    }
    if let Some(field) = fields.iter().find(|f| f.len() != n) {
        return Err(FwhmError::SpaceMismatch(format!(
            "field has {} samples, domain has {}",
            field.len(),
            n
        )));
    }

    let n_dirs = neighbors.direction_count();

    // Pass 1: means
    let mut global = Accumulator::default();
    let mut dirs = vec![Accumulator::default(); n_dirs];
    traverse(neighbors, region, fields, |visit| match visit {
        Visit::Sample(x) => global.add(x),
        Visit::Difference { direction, diff } => dirs[direction].add(diff),
    });

    if global.count == 0 {
        return Err(FwhmError::EmptyRegion);
    }
    let global_mean = global.mean();
    let dir_means: Vec<f64> = dirs.iter().map(Accumulator::mean).collect();

    // Pass 2: squared deviations from the pass-1 means
    traverse(neighbors, region, fields, |visit| match visit {
        Visit::Sample(x) => global.add_deviation(x, global_mean),
        Visit::Difference { direction, diff } => {
            dirs[direction].add_deviation(diff, dir_means[direction])
        }
    });

    let stats = FieldStatistics {
        count: global.count,
        mean: global_mean,
        variance: global.variance(),
        directions: dirs
            .iter()
            .map(|d| DirectionStats {
                count: d.count,
                mean: d.mean(),
                variance: d.variance(),
            })
            .collect(),
    };
    debug!(
        "two-pass statistics: {} samples, mean={:.6}, variance={:.6}, directions={:?}",
        stats.count, stats.mean, stats.variance, stats.directions
    );
    Ok(stats)
}

/// Per-sample mean across `fields`, computed only at in-region samples
///
/// Out-of-region entries are left at 0 and must not be read.
pub fn region_mean<F: SampleField>(fields: &[F], region: Region<'_>, len: usize) -> Vec<f64> {
    let mut mean = vec![0.0; len];
    if fields.is_empty() {
        return mean;
    }
    for field in fields {
        for (i, m) in mean.iter_mut().enumerate() {
            if region.contains(i) {
                *m += field.value(i);
            }
        }
    }
    let n = fields.len() as f64;
    for (i, m) in mean.iter_mut().enumerate() {
        if region.contains(i) {
            *m /= n;
        }
    }
    mean
}

/// Convert variances to FWHM
///
/// `FWHM = spacing * sqrt(-2 ln 2 / ln(1 - diff_variance / (2 variance)))`
///
/// Zero `diff_variance` makes the log argument exactly 1, so the result is
/// NaN. This is left unguarded; see `apply_degenerate_policy`.
pub fn forman_fwhm(spacing: f64, diff_variance: f64, variance: f64) -> f64 {
    let ln2 = std::f64::consts::LN_2;
    spacing * (-2.0 * ln2 / (1.0 - diff_variance / (2.0 * variance)).ln()).sqrt()
}

/// Pass non-finite FWHM values through as-is, or reject them
pub(crate) fn apply_degenerate_policy(
    fwhm: f64,
    direction: usize,
    options: &FwhmOptions,
) -> Result<f64> {
    if fwhm.is_finite() {
        return Ok(fwhm);
    }
    match options.degenerate {
        DegeneratePolicy::Propagate => {
            warn!("direction {} is degenerate, FWHM is {}", direction, fwhm);
            Ok(fwhm)
        }
        DegeneratePolicy::Error => Err(FwhmError::DegenerateDirection { direction }),
    }
}
