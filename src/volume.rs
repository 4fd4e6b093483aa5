//! In-memory volume data and its grid space
//!
//! Data is stored as a flat f32 buffer in Fortran order (x varies fastest)
//! to match the NIfTI convention:
//! `index = i + j*nx + k*nx*ny + frame*nx*ny*nz + component*nx*ny*nz*frames`.

use ndarray::{ArrayViewD, Axis};

use crate::error::{FwhmError, Result};
use crate::field::{ForwardNeighbor, NeighborStructure};
use crate::orientation::{orientation_from_affine, OrientType};

/// Smallest ratio two nonzero affine elements may differ by and still match
const AFFINE_TOLERANCE_RATIO: f64 = 0.999;

/// Grid dimensions plus index-to-world affine
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSpace {
    dims: [usize; 3],
    /// 3x4 affine, row-major
    sform: [[f64; 4]; 3],
}

impl VolumeSpace {
    pub fn new(dims: [usize; 3], sform: [[f64; 4]; 3]) -> Self {
        VolumeSpace { dims, sform }
    }

    /// Axis-aligned RAS space with the given voxel sizes (mm)
    pub fn with_voxel_size(dims: [usize; 3], voxel_size: [f64; 3]) -> Self {
        let mut sform = [[0.0; 4]; 3];
        for (axis, &vs) in voxel_size.iter().enumerate() {
            sform[axis][axis] = vs;
        }
        VolumeSpace { dims, sform }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn sform(&self) -> &[[f64; 4]; 3] {
        &self.sform
    }

    /// Number of voxels in one frame
    pub fn frame_size(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Linear index of voxel (i, j, k)
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.dims[0] + k * self.dims[0] * self.dims[1]
    }

    /// Physical length (mm) of one step along each grid axis
    pub fn spacing(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (axis, s) in out.iter_mut().enumerate() {
            let (x, y, z) = (self.sform[0][axis], self.sform[1][axis], self.sform[2][axis]);
            *s = (x * x + y * y + z * z).sqrt();
        }
        out
    }

    pub fn orientation(&self) -> [OrientType; 3] {
        orientation_from_affine(&self.sform)
    }

    /// Same dimensions and (within tolerance) the same affine
    ///
    /// Affine elements match when equal, or when both are nonzero and each
    /// ratio `a / b`, `b / a` is at least 0.999. A zero never matches a
    /// nonzero, and opposite signs never match.
    pub fn matches(&self, other: &VolumeSpace) -> bool {
        if self.dims != other.dims {
            return false;
        }
        self.sform.iter().flatten().zip(other.sform.iter().flatten()).all(|(&a, &b)| {
            a == b
                || (a != 0.0 && b != 0.0 && a / b >= AFFINE_TOLERANCE_RATIO && b / a >= AFFINE_TOLERANCE_RATIO)
        })
    }

    /// Index of the next voxel along `axis`, if it is inside the grid
    #[inline]
    pub fn forward_neighbor(&self, index: usize, axis: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        let (coord, dim, stride) = match axis {
            0 => (index % nx, nx, 1),
            1 => ((index / nx) % ny, ny, nx),
            2 => (index / (nx * ny), nz, nx * ny),
            _ => return None,
        };
        if coord + 1 < dim {
            Some(index + stride)
        } else {
            None
        }
    }
}

impl NeighborStructure for VolumeSpace {
    fn sample_count(&self) -> usize {
        self.frame_size()
    }

    fn direction_count(&self) -> usize {
        3
    }

    #[inline]
    fn for_each_forward_neighbor<F: FnMut(ForwardNeighbor)>(&self, index: usize, mut f: F) {
        for axis in 0..3 {
            if let Some(neighbor) = self.forward_neighbor(index, axis) {
                f(ForwardNeighbor { direction: axis, index: neighbor, scale: 1.0 });
            }
        }
    }
}

/// A 3D volume with optional frames (4th dim) and components (5th dim)
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    space: VolumeSpace,
    frames: usize,
    components: usize,
    data: Vec<f32>,
}

impl Volume {
    /// Wrap a Fortran-ordered buffer
    pub fn new(space: VolumeSpace, frames: usize, components: usize, data: Vec<f32>) -> Result<Self> {
        if frames == 0 || components == 0 {
            return Err(FwhmError::InvalidShape(format!(
                "frames ({}) and components ({}) must be at least 1",
                frames, components
            )));
        }
        let expected = space.frame_size() * frames * components;
        if data.len() != expected {
            return Err(FwhmError::InvalidShape(format!(
                "dims {:?} x {} frames x {} components need {} values, got {}",
                space.dims, frames, components, expected, data.len()
            )));
        }
        Ok(Volume { space, frames, components, data })
    }

    /// Single-frame volume
    pub fn from_frame(space: VolumeSpace, data: Vec<f32>) -> Result<Self> {
        Volume::new(space, 1, 1, data)
    }

    /// Build from an array shaped (nx, ny, nz[, frames[, components]])
    ///
    /// This is the shape readers such as nifti-rs produce; the grid space is
    /// taken from the array shape and `sform`.
    pub fn from_array(sform: [[f64; 4]; 3], array: ArrayViewD<'_, f32>) -> Result<Self> {
        let shape = array.shape();
        if shape.len() < 3 || shape.len() > 5 {
            return Err(FwhmError::InvalidShape(format!(
                "expected 3 to 5 dimensions, got {}",
                shape.len()
            )));
        }
        let dims = [shape[0], shape[1], shape[2]];
        let frames = shape.get(3).copied().unwrap_or(1);
        let components = shape.get(4).copied().unwrap_or(1);

        // Pad to 5D so a single traversal handles every case
        let mut view = array;
        while view.ndim() < 5 {
            let n = view.ndim();
            view = view.insert_axis(Axis(n));
        }

        // Extract in Fortran order (x varies fastest)
        let mut data = Vec::with_capacity(dims[0] * dims[1] * dims[2] * frames * components);
        for c in 0..components {
            for t in 0..frames {
                for k in 0..dims[2] {
                    for j in 0..dims[1] {
                        for i in 0..dims[0] {
                            data.push(view[[i, j, k, t, c].as_slice()]);
                        }
                    }
                }
            }
        }

        Volume::new(VolumeSpace::new(dims, sform), frames, components, data)
    }

    pub fn space(&self) -> &VolumeSpace {
        &self.space
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// One 3D frame as a flat Fortran-ordered slice
    pub fn frame(&self, frame: usize, component: usize) -> Result<&[f32]> {
        if frame >= self.frames {
            return Err(FwhmError::IndexOutOfRange { what: "frame", index: frame, len: self.frames });
        }
        if component >= self.components {
            return Err(FwhmError::IndexOutOfRange {
                what: "component",
                index: component,
                len: self.components,
            });
        }
        let size = self.space.frame_size();
        let start = (frame + component * self.frames) * size;
        Ok(&self.data[start..start + size])
    }

    /// Values used when this volume serves as an ROI (first frame, first component)
    pub fn roi_values(&self) -> &[f32] {
        &self.data[..self.space.frame_size()]
    }

    pub fn value(&self, i: usize, j: usize, k: usize, frame: usize, component: usize) -> Result<f32> {
        let [nx, ny, nz] = self.space.dims;
        for (what, index, len) in [("i", i, nx), ("j", j, ny), ("k", k, nz)] {
            if index >= len {
                return Err(FwhmError::IndexOutOfRange { what, index, len });
            }
        }
        Ok(self.frame(frame, component)?[self.space.index(i, j, k)])
    }
}
