//! FWHM-Core: smoothness estimation for neuroimaging data
//!
//! Estimates the spatial autocorrelation of a scalar field as the FWHM (mm)
//! of an equivalent Gaussian kernel, on volumes (per anatomical axis) and on
//! triangulated surfaces (one scalar).
//!
//! # Modules
//! - `stats`: Masked two-pass statistics engine shared by all estimators
//! - `field`: Sample/neighbor abstractions the engine runs over
//! - `volume`: In-memory volumes and grid spaces
//! - `volume_fwhm`: Per-frame volume estimation
//! - `series`: Whole-series (pooled, optionally demeaned) volume estimation
//! - `surface`: Surface meshes and surface estimation
//! - `orientation`: Grid axis to anatomical axis mapping
//! - `report`: Labeled per-subvolume / per-column results

// Core modules
pub mod config;
pub mod error;
pub mod field;
pub mod stats;

// Data containers
pub mod orientation;
pub mod volume;

// Estimators
pub mod series;
pub mod surface;
pub mod volume_fwhm;

// Front-end helpers
pub mod report;

pub use config::{DegeneratePolicy, EdgeLengthScaling, FwhmOptions};
pub use error::{FwhmError, Result};
pub use report::{estimate_surface_fwhm_per_column, estimate_volume_fwhm_per_subvolume, LabeledFwhm};
pub use series::{estimate_volume_fwhm_whole_series, whole_series_statistics};
pub use surface::{estimate_surface_fwhm, estimate_surface_fwhm_all_columns, SurfaceMesh};
pub use volume::{Volume, VolumeSpace};
pub use volume_fwhm::{estimate_volume_fwhm, VolumeFwhm};
