//! Spectral transform and bin axes

pub mod bins;
pub mod fft;

pub use bins::{frequency_bins, time_bins, BinAxes, BinConvention};
pub use fft::{Complex32, SpectralTransform, TransformError};
