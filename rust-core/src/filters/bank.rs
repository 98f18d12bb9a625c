//! In-place spectral filtering
//!
//! Hard zeroing of complex bins (real and imaginary parts). The caller keeps a
//! copy of the spectrum if the unfiltered version is still needed.

use super::design::FilterSpec;
use crate::config::PipelineConfig;
use crate::spectrum::Complex32;

fn zero_ranges(spectrum: &mut [Complex32], spec: FilterSpec, sample_rate: f32, len: usize) {
    let num_bins = spectrum.len();
    for range in spec.stop_ranges(sample_rate, len, num_bins) {
        spectrum[range].fill(Complex32::new(0.0, 0.0));
    }
}

/// Zero the bins `[idx0 - 5, idx0 + 5)` around `f0`
///
/// # Arguments
/// * `spectrum` - One-sided spectrum of an N-sample signal
/// * `f0` - Notch center in Hz
/// * `sample_rate` - Sample rate fs in Hz
/// * `len` - Transform length N
pub fn notch(spectrum: &mut [Complex32], f0: f32, sample_rate: f32, len: usize) {
    zero_ranges(spectrum, FilterSpec::notch(f0), sample_rate, len);
}

/// Zero every bin outside the guard-widened passband `[f1, f2]`
pub fn bandpass(spectrum: &mut [Complex32], f1: f32, f2: f32, sample_rate: f32, len: usize) {
    zero_ranges(spectrum, FilterSpec::bandpass(f1, f2), sample_rate, len);
}

/// Ordered set of filters applied to every cycle's spectrum
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: Vec<FilterSpec>,
    sample_rate: f32,
    len: usize,
}

impl FilterBank {
    /// Empty bank for a given sample rate and transform length
    pub fn new(sample_rate: f32, len: usize) -> Self {
        Self {
            filters: Vec::new(),
            sample_rate,
            len,
        }
    }

    /// Notch always, band-pass when configured
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut bank = Self::new(config.sample_rate_hz, config.fft_len)
            .with(FilterSpec::notch(config.notch_hz));

        if let Some(bp) = config.bandpass {
            bank = bank.with(FilterSpec::bandpass(bp.low_hz, bp.high_hz));
        }
        bank
    }

    /// Append a filter
    pub fn with(mut self, spec: FilterSpec) -> Self {
        self.filters.push(spec);
        self
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Apply every filter in order, in place
    pub fn apply(&self, spectrum: &mut [Complex32]) {
        for &spec in &self.filters {
            zero_ranges(spectrum, spec, self.sample_rate, self.len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BandPassConfig;

    const FS: f32 = 500.0;
    const N: usize = 1024;

    fn ones() -> Vec<Complex32> {
        vec![Complex32::new(1.0, -1.0); N / 2 + 1]
    }

    fn zeroed(spectrum: &[Complex32]) -> Vec<usize> {
        spectrum
            .iter()
            .enumerate()
            .filter(|(_, c)| c.re == 0.0 && c.im == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_notch_zeroes_exact_window() {
        let k = 100;
        let mut spectrum = ones();
        notch(&mut spectrum, k as f32 * FS / N as f32, FS, N);

        assert_eq!(zeroed(&spectrum), (95..105).collect::<Vec<_>>());
        assert_eq!(spectrum[94], Complex32::new(1.0, -1.0));
        assert_eq!(spectrum[105], Complex32::new(1.0, -1.0));
    }

    #[test]
    fn test_notch_near_dc_does_not_wrap() {
        let k = 3;
        let mut spectrum = ones();
        notch(&mut spectrum, k as f32 * FS / N as f32, FS, N);

        assert_eq!(zeroed(&spectrum), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_bandpass_keeps_passband() {
        let mut spectrum = ones();
        bandpass(&mut spectrum, 25.0, 100.0, FS, N);

        let kept: Vec<usize> = (0..spectrum.len()).filter(|i| spectrum[*i].re != 0.0).collect();
        assert_eq!(kept, (46..=210).collect::<Vec<_>>());
    }

    #[test]
    fn test_bank_from_config() {
        let config = PipelineConfig {
            bandpass: Some(BandPassConfig {
                low_hz: 25.0,
                high_hz: 100.0,
            }),
            ..Default::default()
        };
        let bank = FilterBank::from_config(&config);
        assert_eq!(bank.filters().len(), 2);

        let mut spectrum = ones();
        bank.apply(&mut spectrum);

        // Notch at bin 102 inside the passband
        assert!((97..107).all(|i| spectrum[i].re == 0.0));
        assert_eq!(spectrum[60], Complex32::new(1.0, -1.0));
        assert_eq!(spectrum[300].re, 0.0);
    }

    #[test]
    fn test_bank_notch_only_by_default() {
        let bank = FilterBank::from_config(&PipelineConfig::default());
        assert_eq!(bank.filters(), &[FilterSpec::notch(50.0)]);
    }
}
