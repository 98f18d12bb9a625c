//! Analog input sources
//!
//! The sampler only sees `AnalogInput::read_raw`. Real hardware plugs in
//! behind that trait; `ReplayInput` and `SignalGenerator` cover recorded
//! datasets and synthetic test signals.

use crate::config::AdcConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Recording contains no samples")]
    EmptyRecording,

    #[error("Invalid ADC code '{0}' in recording")]
    InvalidCode(String),

    #[error("Failed to read recording: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw ADC conversions, one per timer tick
pub trait AnalogInput {
    /// Read one conversion in `0..=full_scale`
    fn read_raw(&mut self) -> u16;
}

impl<F> AnalogInput for F
where
    F: FnMut() -> u16,
{
    fn read_raw(&mut self) -> u16 {
        self()
    }
}

/// Raw code to voltage conversion: `vref * raw / full_scale - offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageScale {
    vref: f32,
    full_scale: u16,
    offset: f32,
}

impl VoltageScale {
    pub fn new(vref: f32, full_scale: u16, offset: Option<f32>) -> Self {
        Self {
            vref,
            full_scale,
            offset: offset.unwrap_or(0.0),
        }
    }

    #[inline]
    pub fn to_volts(&self, raw: u16) -> f32 {
        self.vref * raw as f32 / self.full_scale as f32 - self.offset
    }

    /// Quantize a pin voltage (before offset removal) to the nearest code
    pub fn to_raw(&self, volts: f32) -> u16 {
        let code = (volts / self.vref * self.full_scale as f32).round();
        code.clamp(0.0, self.full_scale as f32) as u16
    }
}

impl From<&AdcConfig> for VoltageScale {
    fn from(adc: &AdcConfig) -> Self {
        Self::new(adc.vref, adc.full_scale, adc.dc_offset)
    }
}

/// Loops over a recorded set of raw conversions
#[derive(Debug, Clone)]
pub struct ReplayInput {
    codes: Vec<u16>,
    cursor: usize,
}

impl ReplayInput {
    pub fn new(codes: Vec<u16>) -> Result<Self, InputError> {
        if codes.is_empty() {
            return Err(InputError::EmptyRecording);
        }
        Ok(Self { codes, cursor: 0 })
    }

    /// Parse whitespace- or comma-separated integer codes
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let codes = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u16>()
                    .map_err(|_| InputError::InvalidCode(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(codes)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl AnalogInput for ReplayInput {
    fn read_raw(&mut self) -> u16 {
        let code = self.codes[self.cursor];
        self.cursor = (self.cursor + 1) % self.codes.len();
        code
    }
}

/// One sinusoidal component of a synthetic signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub amplitude: f32,
}

impl Tone {
    pub fn new(frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            frequency_hz,
            amplitude,
        }
    }
}

/// Sum of sinusoids around a DC level, quantized like the real ADC
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    sample_rate: f32,
    tones: Vec<Tone>,
    dc_volts: f32,
    scale: VoltageScale,
    n: u64,
}

impl SignalGenerator {
    /// # Arguments
    /// * `sample_rate` - Rate at which `read_raw` will be called
    /// * `dc_volts` - Bias level the tones swing around
    /// * `scale` - ADC scaling used for quantization
    pub fn new(sample_rate: f32, dc_volts: f32, scale: VoltageScale) -> Self {
        Self {
            sample_rate,
            tones: Vec::new(),
            dc_volts,
            scale,
            n: 0,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tones.push(tone);
        self
    }

    /// Pin voltage at sample index `n`
    pub fn voltage_at(&self, n: u64) -> f32 {
        let t = n as f64 / self.sample_rate as f64;
        self.tones.iter().fold(self.dc_volts, |acc, tone| {
            let phase = 2.0 * std::f64::consts::PI * tone.frequency_hz as f64 * t;
            acc + tone.amplitude * phase.sin() as f32
        })
    }
}

impl AnalogInput for SignalGenerator {
    fn read_raw(&mut self) -> u16 {
        let code = self.scale.to_raw(self.voltage_at(self.n));
        self.n += 1;
        code
    }
}
