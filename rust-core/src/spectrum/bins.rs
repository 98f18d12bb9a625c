//! Frequency and time axes for the spectral and reconstructed series
//!
//! Pure functions of sample rate and transform length.

use serde::{Deserialize, Serialize};

/// Formula used to label magnitude bins with a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinConvention {
    /// `f[i] = fs * i / N` (one-sided spectrum, matches filter bin mapping)
    FullRate,

    /// `f[i] = fs * i / (2N)`
    HalfRate,
}

impl BinConvention {
    /// Frequency step between two adjacent magnitude bins
    pub fn step_hz(self, sample_rate: f32, len: usize) -> f32 {
        match self {
            BinConvention::FullRate => sample_rate / len as f32,
            BinConvention::HalfRate => sample_rate / (2 * len) as f32,
        }
    }
}

/// Frequency axis with N/2 entries, one per magnitude bin
pub fn frequency_bins(sample_rate: f32, len: usize, convention: BinConvention) -> Vec<f32> {
    let step = convention.step_hz(sample_rate, len);
    (0..len / 2).map(|i| step * i as f32).collect()
}

/// Time axis with N entries, one per reconstructed sample
pub fn time_bins(sample_rate: f32, len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32 / sample_rate).collect()
}

/// Map a frequency in Hz to the nearest spectral bin index (`round(f / (fs/N))`)
///
/// Negative or NaN frequencies map to bin 0.
pub fn frequency_to_bin(freq_hz: f32, sample_rate: f32, len: usize) -> usize {
    let resolution = sample_rate / len as f32;
    // float -> usize casts saturate, so negatives and NaN land on 0
    (freq_hz / resolution).round() as usize
}

/// Both axes, computed once since they never change at run time
#[derive(Debug, Clone)]
pub struct BinAxes {
    pub frequencies: Vec<f32>,
    pub times: Vec<f32>,
}

impl BinAxes {
    pub fn new(sample_rate: f32, len: usize, convention: BinConvention) -> Self {
        Self {
            frequencies: frequency_bins(sample_rate, len, convention),
            times: time_bins(sample_rate, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strictly_increasing(values: &[f32]) -> bool {
        values.windows(2).all(|w| w[1] > w[0])
    }

    #[test]
    fn test_frequency_bins_full_rate() {
        let freqs = frequency_bins(500.0, 1024, BinConvention::FullRate);

        assert_eq!(freqs.len(), 512);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[1] - 500.0 / 1024.0).abs() < 1e-6);
        assert!((freqs[511] - 511.0 * 500.0 / 1024.0).abs() < 1e-3);
        assert!(strictly_increasing(&freqs));
    }

    #[test]
    fn test_frequency_bins_half_rate() {
        let freqs = frequency_bins(1000.0, 1024, BinConvention::HalfRate);

        assert_eq!(freqs.len(), 512);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[2] - 2.0 * 1000.0 / 2048.0).abs() < 1e-6);
        assert!(strictly_increasing(&freqs));
    }

    #[test]
    fn test_time_bins() {
        let times = time_bins(500.0, 1024);

        assert_eq!(times.len(), 1024);
        assert_eq!(times[0], 0.0);
        assert!((times[500] - 1.0).abs() < 1e-6);
        assert!(strictly_increasing(&times));
    }

    #[test]
    fn test_frequency_to_bin_rounds() {
        // 50 Hz at 500 Hz / 1024 -> 102.4
        assert_eq!(frequency_to_bin(50.0, 500.0, 1024), 102);
        // 10 Hz -> 20.48
        assert_eq!(frequency_to_bin(10.0, 500.0, 1024), 20);
        // 0.3 Hz -> 0.61
        assert_eq!(frequency_to_bin(0.3, 500.0, 1024), 1);
        assert_eq!(frequency_to_bin(-3.0, 500.0, 1024), 0);
    }

    #[test]
    fn test_axes_cache_matches_functions() {
        let axes = BinAxes::new(500.0, 256, BinConvention::FullRate);
        assert_eq!(axes.frequencies, frequency_bins(500.0, 256, BinConvention::FullRate));
        assert_eq!(axes.times, time_bins(500.0, 256));
    }
}
