//! Field accessors shared by the volume and surface estimators
//!
//! A field is a read-only scalar function over sample indices. The neighbor
//! structure says which samples are forward neighbors of which, so the
//! statistics engine can walk grids and meshes with the same two-pass loop.

use ndarray::ArrayView1;

/// Read-only scalar values indexed by sample
pub trait SampleField {
    /// Number of samples
    fn len(&self) -> usize;

    /// Value at `index`, promoted to f64 for accumulation
    fn value(&self, index: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleField for [f32] {
    fn len(&self) -> usize {
        <[f32]>::len(self)
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        self[index] as f64
    }
}

impl SampleField for ArrayView1<'_, f32> {
    fn len(&self) -> usize {
        self.dim()
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        self[index] as f64
    }
}

impl<T: SampleField + ?Sized> SampleField for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        (**self).value(index)
    }
}

/// A field with a per-sample mean subtracted
///
/// The mean is only meaningful at in-ROI samples; out-of-ROI samples are
/// never read by the statistics engine.
#[derive(Debug, Clone, Copy)]
pub struct Demeaned<'a, F> {
    pub field: F,
    pub mean: &'a [f64],
}

impl<F: SampleField> SampleField for Demeaned<'_, F> {
    fn len(&self) -> usize {
        self.field.len()
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        self.field.value(index) - self.mean[index]
    }
}

/// Optional inclusion mask: a sample is in the region iff there is no mask
/// or the mask value is `> 0`
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    mask: Option<ArrayView1<'a, f32>>,
}

impl<'a> Region<'a> {
    /// Region covering every sample
    pub fn all() -> Self {
        Region { mask: None }
    }

    pub fn from_mask(mask: ArrayView1<'a, f32>) -> Self {
        Region { mask: Some(mask) }
    }

    pub fn from_slice(mask: &'a [f32]) -> Self {
        Region::from_mask(ArrayView1::from(mask))
    }

    /// Mask length, or `None` when unmasked
    pub fn mask_len(&self) -> Option<usize> {
        self.mask.as_ref().map(|m| m.len())
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        match &self.mask {
            None => true,
            Some(mask) => mask[index] > 0.0,
        }
    }
}

/// One forward neighbor of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardNeighbor {
    /// Which direction accumulator the difference belongs to
    pub direction: usize,
    /// Sample index of the neighbor
    pub index: usize,
    /// Factor applied to the difference (1 for grids)
    pub scale: f64,
}

/// Neighbor relation over sample indices
///
/// Every unordered neighbor pair must be reported exactly once, from exactly
/// one of its endpoints, so that differences are not double counted.
pub trait NeighborStructure {
    /// Size of the index domain
    fn sample_count(&self) -> usize;

    /// Number of separately accumulated directions
    fn direction_count(&self) -> usize;

    /// Call `f` for every forward neighbor of `index`
    fn for_each_forward_neighbor<F: FnMut(ForwardNeighbor)>(&self, index: usize, f: F);
}
