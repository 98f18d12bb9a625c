//! Pipeline configuration
//!
//! One structure built at start-up that fixes transform length, sample rate,
//! filter cutoffs and the ADC scaling for the whole run.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::spectrum::bins::BinConvention;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Transform length must be a power of two >= 2 (got {0})")]
    InvalidLength(usize),

    #[error("Sample rate must be positive and finite (got {0} Hz)")]
    InvalidSampleRate(f32),

    #[error("Notch frequency must be non-negative and finite (got {0} Hz)")]
    InvalidNotch(f32),

    #[error("Band-pass cutoffs must satisfy 0 <= low <= high (got {low} Hz .. {high} Hz)")]
    InvalidBandPass { low: f32, high: f32 },

    #[error("ADC full-scale code must be non-zero")]
    ZeroFullScale,

    #[error("ADC reference voltage must be positive and finite (got {0} V)")]
    InvalidReference(f32),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// ADC front-end scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcConfig {
    /// Reference voltage in volts
    pub vref: f32,

    /// Largest raw code the converter produces
    pub full_scale: u16,

    /// Fixed offset subtracted from every voltage (e.g. 1.65 for a mid-rail bias)
    pub dc_offset: Option<f32>,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            vref: 3.3,
            full_scale: 4095,
            dc_offset: None,
        }
    }
}

/// Band-pass cutoffs in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPassConfig {
    pub low_hz: f32,
    pub high_hz: f32,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transform length N (samples per acquisition cycle)
    pub fft_len: usize,

    /// Sample rate in Hz
    pub sample_rate_hz: f32,

    /// Mains-hum notch center in Hz
    pub notch_hz: f32,

    /// Optional passband restriction
    pub bandpass: Option<BandPassConfig>,

    /// ADC scaling
    pub adc: AdcConfig,

    /// Frequency axis formula used for the published `freqs` series
    pub frequency_axis: BinConvention,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fft_len: 1024,
            sample_rate_hz: 500.0,
            notch_hz: 50.0,
            bandpass: None,
            adc: AdcConfig::default(),
            frequency_axis: BinConvention::FullRate,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every field for values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_len < 2 || !self.fft_len.is_power_of_two() {
            return Err(ConfigError::InvalidLength(self.fft_len));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if !(self.notch_hz.is_finite() && self.notch_hz >= 0.0) {
            return Err(ConfigError::InvalidNotch(self.notch_hz));
        }
        if let Some(bp) = self.bandpass {
            let ordered = bp.low_hz.is_finite()
                && bp.high_hz.is_finite()
                && bp.low_hz >= 0.0
                && bp.low_hz <= bp.high_hz;
            if !ordered {
                return Err(ConfigError::InvalidBandPass {
                    low: bp.low_hz,
                    high: bp.high_hz,
                });
            }
        }
        if self.adc.full_scale == 0 {
            return Err(ConfigError::ZeroFullScale);
        }
        if !(self.adc.vref.is_finite() && self.adc.vref > 0.0) {
            return Err(ConfigError::InvalidReference(self.adc.vref));
        }
        Ok(())
    }

    /// Timer interval between two samples (1/fs)
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sample_rate_hz as f64)
    }
}
