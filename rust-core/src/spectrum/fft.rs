//! Forward/inverse real transform using realfft
//!
//! Both directions share one planned engine of fixed length N. The engine is
//! unnormalized; `inverse` divides by N and `magnitude` by N/2 so the series
//! come out amplitude-correct.

use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;
use thiserror::Error;

/// Complex spectral bin
pub type Complex32 = Complex<f32>;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unsupported transform length {0} (must be a power of two >= 2)")]
    UnsupportedLength(usize),

    #[error("Buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Transform engine failure: {0}")]
    Engine(String),
}

fn check_len(expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::LengthMismatch { expected, actual })
    }
}

/// Fixed-length real spectral transform
pub struct SpectralTransform {
    /// Transform length N
    len: usize,

    /// Real-to-complex (forward) plan
    r2c: Arc<dyn RealToComplex<f32>>,

    /// Complex-to-real (inverse) plan
    c2r: Arc<dyn ComplexToReal<f32>>,

    /// Copy of the time-domain input (realfft consumes its input)
    time_scratch: Vec<f32>,

    /// Copy of the spectrum handed to the inverse plan
    freq_scratch: Vec<Complex32>,

    forward_scratch: Vec<Complex32>,
    inverse_scratch: Vec<Complex32>,
}

impl SpectralTransform {
    /// Plan the transform for a fixed length
    ///
    /// # Arguments
    /// * `len` - Transform length N
    ///
    /// # Errors
    /// `UnsupportedLength` when N is 0, 1 or not a power of two. This is a
    /// configuration fault and is never retried.
    pub fn new(len: usize) -> Result<Self, TransformError> {
        if len < 2 || !len.is_power_of_two() {
            return Err(TransformError::UnsupportedLength(len));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        let c2r = planner.plan_fft_inverse(len);

        let time_scratch = r2c.make_input_vec();
        let freq_scratch = c2r.make_input_vec();
        let forward_scratch = r2c.make_scratch_vec();
        let inverse_scratch = c2r.make_scratch_vec();

        log::info!("Spectral transform planned for N = {len}");

        Ok(Self {
            len,
            r2c,
            c2r,
            time_scratch,
            freq_scratch,
            forward_scratch,
            inverse_scratch,
        })
    }

    /// Transform length N
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of complex bins in a spectrum (N/2 + 1, DC through Nyquist)
    pub fn num_bins(&self) -> usize {
        self.len / 2 + 1
    }

    /// Number of entries in a magnitude spectrum (N/2)
    pub fn num_magnitudes(&self) -> usize {
        self.len / 2
    }

    /// Zeroed spectrum buffer of the right size
    pub fn make_spectrum(&self) -> Vec<Complex32> {
        vec![Complex32::new(0.0, 0.0); self.num_bins()]
    }

    /// Forward real-to-complex transform
    ///
    /// `src` is left untouched; the engine works on an internal copy.
    pub fn forward(&mut self, src: &[f32], dst: &mut [Complex32]) -> Result<(), TransformError> {
        check_len(self.len, src.len())?;
        check_len(self.num_bins(), dst.len())?;

        self.time_scratch.copy_from_slice(src);
        self.r2c
            .process_with_scratch(&mut self.time_scratch, dst, &mut self.forward_scratch)
            .map_err(|e| TransformError::Engine(e.to_string()))
    }

    /// Inverse complex-to-real transform, normalized by N
    ///
    /// `spectrum` is left untouched.
    pub fn inverse(&mut self, spectrum: &[Complex32], dst: &mut [f32]) -> Result<(), TransformError> {
        check_len(self.num_bins(), spectrum.len())?;
        check_len(self.len, dst.len())?;

        self.freq_scratch.copy_from_slice(spectrum);
        // A real signal has purely real DC and Nyquist bins
        let last = self.freq_scratch.len() - 1;
        self.freq_scratch[0].im = 0.0;
        self.freq_scratch[last].im = 0.0;

        self.c2r
            .process_with_scratch(&mut self.freq_scratch, dst, &mut self.inverse_scratch)
            .map_err(|e| TransformError::Engine(e.to_string()))?;

        let scale = 1.0 / self.len as f32;
        for sample in dst.iter_mut() {
            *sample *= scale;
        }
        Ok(())
    }

    /// Magnitude of bins 0..N/2, normalized by N/2
    ///
    /// A bin-aligned sinusoid of amplitude A reads as A.
    pub fn magnitude(&self, spectrum: &[Complex32], dst: &mut [f32]) -> Result<(), TransformError> {
        check_len(self.num_bins(), spectrum.len())?;
        check_len(self.num_magnitudes(), dst.len())?;

        let half = (self.len / 2) as f32;
        for (mag, bin) in dst.iter_mut().zip(spectrum.iter()) {
            *mag = bin.norm() / half;
        }
        Ok(())
    }
}
