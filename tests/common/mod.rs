//! Common test utilities for FWHM-core integration tests

#![allow(dead_code)]

use fwhm_core::{SurfaceMesh, Volume, VolumeSpace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// FWHM = sigma * sqrt(8 ln 2)
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (8.0 * std::f64::consts::LN_2).sqrt()
}

/// Seeded i.i.d. Gaussian noise
pub fn gaussian_noise(n: usize, std_dev: f64, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(0.0, std_dev).expect("std_dev must be positive");
    (0..n).map(|_| dist.sample(&mut rng) as f32).collect()
}

/// Sampled Gaussian kernel truncated at 3 sigma, unit sum
pub fn gaussian_kernel(fwhm_vox: f64) -> Vec<f64> {
    let sigma = fwhm_to_sigma(fwhm_vox);
    let radius = (3.0 * sigma).ceil() as i64;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-(x * x) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Kernel half-width in voxels
pub fn kernel_radius(fwhm_vox: f64) -> usize {
    gaussian_kernel(fwhm_vox).len() / 2
}

/// Convolve along one axis, treating outside voxels as zero
fn smooth_axis(data: &[f32], dims: [usize; 3], axis: usize, kernel: &[f64]) -> Vec<f32> {
    let [nx, ny, nz] = dims;
    let radius = (kernel.len() / 2) as i64;
    let stride = [1, nx, nx * ny][axis];
    let mut out = vec![0.0f32; data.len()];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let idx = i + j * nx + k * nx * ny;
                let coord = [i, j, k][axis] as i64;
                let dim = dims[axis] as i64;
                let mut acc = 0.0f64;
                for (t, &w) in kernel.iter().enumerate() {
                    let c = coord + t as i64 - radius;
                    if c < 0 || c >= dim {
                        continue;
                    }
                    let n = (idx as i64 + (c - coord) * stride as i64) as usize;
                    acc += w * data[n] as f64;
                }
                out[idx] = acc as f32;
            }
        }
    }
    out
}

/// Separable Gaussian smoothing with the given FWHM (in voxels) per axis
pub fn gaussian_smooth(data: &[f32], dims: [usize; 3], fwhm_vox: [f64; 3]) -> Vec<f32> {
    let mut out = data.to_vec();
    for axis in 0..3 {
        out = smooth_axis(&out, dims, axis, &gaussian_kernel(fwhm_vox[axis]));
    }
    out
}

/// Fill a frame from a function of (i, j, k)
pub fn fill(dims: [usize; 3], f: impl Fn(usize, usize, usize) -> f32) -> Vec<f32> {
    let [nx, ny, nz] = dims;
    let mut data = vec![0.0f32; nx * ny * nz];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                data[i + j * nx + k * nx * ny] = f(i, j, k);
            }
        }
    }
    data
}

/// ROI of 1 everywhere except a `margin`-voxel border
pub fn interior_mask(dims: [usize; 3], margin: usize) -> Vec<f32> {
    fill(dims, |i, j, k| {
        let inside = |c: usize, n: usize| c >= margin && c + margin < n;
        if inside(i, dims[0]) && inside(j, dims[1]) && inside(k, dims[2]) {
            1.0
        } else {
            0.0
        }
    })
}

pub fn unit_volume(dims: [usize; 3], voxel_size: [f64; 3], data: Vec<f32>) -> Volume {
    Volume::from_frame(VolumeSpace::with_voxel_size(dims, voxel_size), data).unwrap()
}

/// Smoothed noise volume with known per-axis FWHM (in voxels)
pub fn smoothed_noise_volume(dims: [usize; 3], voxel_size: [f64; 3], fwhm_vox: [f64; 3], seed: u64) -> Volume {
    let noise = gaussian_noise(dims[0] * dims[1] * dims[2], 1.0, seed);
    unit_volume(dims, voxel_size, gaussian_smooth(&noise, dims, fwhm_vox))
}

/// Relative error of an estimate
pub fn relative_error(estimate: f64, truth: f64) -> f64 {
    ((estimate - truth) / truth).abs()
}

/// Planar triangular lattice with unit edge length, `n` x `n` vertices
///
/// Vertex (i, j) sits at (i + j/2, j*sqrt(3)/2), so all three edge
/// directions have length 1.
pub fn triangular_lattice(n: usize, edge: f64) -> SurfaceMesh {
    let h = 3f64.sqrt() / 2.0;
    let mut coords = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            coords.push([(i as f64 + 0.5 * j as f64) * edge, j as f64 * h * edge, 0.0]);
        }
    }
    let v = |i: usize, j: usize| i + j * n;
    let mut triangles = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            triangles.push([v(i, j), v(i + 1, j), v(i, j + 1)]);
            triangles.push([v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]);
        }
    }
    SurfaceMesh::from_triangles(coords, &triangles).unwrap()
}

/// Replace each lattice value by the mean of itself and its in-bounds neighbors
pub fn lattice_smooth(values: &[f32], n: usize, iterations: usize) -> Vec<f32> {
    let offsets: [(i64, i64); 6] = [(1, 0), (-1, 0), (0, 1), (0, -1), (-1, 1), (1, -1)];
    let mut cur = values.to_vec();
    for _ in 0..iterations {
        let mut next = vec![0.0f32; cur.len()];
        for j in 0..n as i64 {
            for i in 0..n as i64 {
                let mut sum = cur[(i + j * n as i64) as usize] as f64;
                let mut count = 1.0;
                for &(di, dj) in &offsets {
                    let (a, b) = (i + di, j + dj);
                    if a >= 0 && b >= 0 && a < n as i64 && b < n as i64 {
                        sum += cur[(a + b * n as i64) as usize] as f64;
                        count += 1.0;
                    }
                }
                next[(i + j * n as i64) as usize] = (sum / count) as f32;
            }
        }
        cur = next;
    }
    cur
}
