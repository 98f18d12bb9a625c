//! Frequency-domain filter specifications
//!
//! Maps a notch or band-pass request in Hz to the bin ranges that get zeroed.
//! Cutoffs are widened by a fixed guard of `GUARD_BINS` to absorb leakage.

use crate::spectrum::bins::frequency_to_bin;
use std::ops::Range;

/// Extra bins zeroed beyond a filter's nominal edge
pub const GUARD_BINS: usize = 5;

/// Brick-wall filter request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterSpec {
    /// Zero `[idx0 - guard, idx0 + guard)` around `center_hz`
    Notch { center_hz: f32 },

    /// Zero everything outside `[idx1 - guard, idx2 + guard]`
    BandPass { low_hz: f32, high_hz: f32 },
}

impl FilterSpec {
    pub fn notch(center_hz: f32) -> Self {
        FilterSpec::Notch { center_hz }
    }

    pub fn bandpass(low_hz: f32, high_hz: f32) -> Self {
        FilterSpec::BandPass { low_hz, high_hz }
    }

    /// Bin ranges this filter zeroes in a spectrum of `num_bins` complex bins
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate fs in Hz
    /// * `len` - Transform length N
    /// * `num_bins` - Bins present in the spectrum (N/2 + 1)
    ///
    /// # Returns
    /// Up to two half-open ranges, already clamped to `0..num_bins`
    pub fn stop_ranges(&self, sample_rate: f32, len: usize, num_bins: usize) -> Vec<Range<usize>> {
        let ranges = match *self {
            FilterSpec::Notch { center_hz } => {
                let idx0 = frequency_to_bin(center_hz, sample_rate, len);
                // idx0 < GUARD_BINS must not wrap
                let start = idx0.saturating_sub(GUARD_BINS);
                let end = idx0.saturating_add(GUARD_BINS);
                vec![start..end]
            }
            FilterSpec::BandPass { low_hz, high_hz } => {
                let (lo, hi) = self.pass_range(low_hz, high_hz, sample_rate, len);
                vec![0..lo, hi.saturating_add(1)..num_bins]
            }
        };

        ranges
            .into_iter()
            .map(|r| r.start.min(num_bins)..r.end.min(num_bins))
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// Inclusive passband `[idx1, idx2]` after guard widening
    fn pass_range(&self, low_hz: f32, high_hz: f32, sample_rate: f32, len: usize) -> (usize, usize) {
        let idx1 = frequency_to_bin(low_hz, sample_rate, len).saturating_sub(GUARD_BINS);
        let idx2 = frequency_to_bin(high_hz, sample_rate, len).saturating_add(GUARD_BINS);
        (idx1, idx2)
    }
}
