//! Main-loop orchestration
//!
//! Polls the sampler and, once a cycle is complete, runs
//! transform -> filter -> reconstruct -> publish synchronously before
//! re-arming acquisition. The sampler is idle for the whole processing window,
//! so this may take far longer than one sample period.

use crate::acquisition::{AcquisitionError, AnalogInput, SampleTicker, Sampler, VoltageScale};
use crate::config::{ConfigError, PipelineConfig};
use crate::filters::FilterBank;
use crate::output::{labels, SeriesSink};
use crate::spectrum::{BinAxes, Complex32, SpectralTransform, TransformError};
use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;

/// Idle sleep between polls while waiting for a cycle
const POLL_INTERVAL: Duration = Duration::from_micros(100);

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),
}

/// Orchestrator state; cycles forever, there is no terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    WaitingForSample,
    Transforming,
    Filtering,
    Reconstructing,
    Publishing,
}

/// Every series computed in one cycle
#[derive(Debug, Clone)]
pub struct CycleResults {
    /// Scaled samples moved out of the sampler
    pub samples: Vec<f32>,

    /// Spectrum of `samples`
    pub spectrum: Vec<Complex32>,

    /// Copy of `spectrum` after the filter bank
    pub filtered_spectrum: Vec<Complex32>,

    /// Normalized magnitude of `spectrum` (N/2 bins)
    pub magnitude: Vec<f32>,

    /// Normalized magnitude of `filtered_spectrum` (N/2 bins)
    pub filtered_magnitude: Vec<f32>,

    /// Inverse of `spectrum`
    pub waveform: Vec<f32>,

    /// Inverse of `filtered_spectrum`
    pub filtered_waveform: Vec<f32>,
}

impl CycleResults {
    fn new(transform: &SpectralTransform) -> Self {
        let len = transform.len();
        Self {
            samples: vec![0.0; len],
            spectrum: transform.make_spectrum(),
            filtered_spectrum: transform.make_spectrum(),
            magnitude: vec![0.0; transform.num_magnitudes()],
            filtered_magnitude: vec![0.0; transform.num_magnitudes()],
            waveform: vec![0.0; len],
            filtered_waveform: vec![0.0; len],
        }
    }
}

/// Acquisition/transform/filter pipeline
pub struct Pipeline<S> {
    config: PipelineConfig,
    sampler: Sampler,
    transform: SpectralTransform,
    filters: FilterBank,
    axes: BinAxes,
    sink: S,
    state: PipelineState,
    results: CycleResults,
    cycles: u64,
}

impl<S: SeriesSink> Pipeline<S> {
    /// Build the pipeline around an existing sampler and arm the first cycle
    ///
    /// # Errors
    /// Invalid configuration or an unsupported transform length. Both are
    /// fatal: the caller is expected to report them and stop.
    pub fn new(config: PipelineConfig, mut sampler: Sampler, sink: S) -> Result<Self, PipelineError> {
        config.validate()?;
        let transform = SpectralTransform::new(config.fft_len)?;

        if sampler.len() != config.fft_len {
            return Err(AcquisitionError::LengthMismatch {
                expected: config.fft_len,
                actual: sampler.len(),
            }
            .into());
        }

        let filters = FilterBank::from_config(&config);
        let axes = BinAxes::new(config.sample_rate_hz, config.fft_len, config.frequency_axis);
        let results = CycleResults::new(&transform);

        sampler.start()?;
        log::info!(
            "Pipeline ready: N = {}, fs = {} Hz, {} filter(s)",
            config.fft_len,
            config.sample_rate_hz,
            filters.filters().len()
        );

        Ok(Self {
            config,
            sampler,
            transform,
            filters,
            axes,
            sink,
            state: PipelineState::WaitingForSample,
            results,
            cycles: 0,
        })
    }

    /// Build sampler and pipeline from one configuration
    ///
    /// # Returns
    /// The pipeline and the ticker to hand to the timer context
    pub fn from_config<A: AnalogInput>(
        config: PipelineConfig,
        input: A,
        sink: S,
    ) -> Result<(Self, SampleTicker<A>), PipelineError> {
        config.validate()?;
        let scale = VoltageScale::from(&config.adc);
        let (sampler, ticker) = Sampler::new(input, scale, config.fft_len);
        let pipeline = Self::new(config, sampler, sink)?;
        Ok((pipeline, ticker))
    }

    /// Perform the work of the current state and move to the next one
    ///
    /// In `WaitingForSample` this is a no-op until the sampler reports
    /// completion.
    pub fn step(&mut self) -> Result<PipelineState, PipelineError> {
        let next = match self.state {
            PipelineState::WaitingForSample => {
                if !self.sampler.is_complete() {
                    return Ok(self.state);
                }
                self.sampler.take_samples(&mut self.results.samples)?;
                PipelineState::Transforming
            }
            PipelineState::Transforming => {
                self.transform
                    .forward(&self.results.samples, &mut self.results.spectrum)?;
                self.transform
                    .magnitude(&self.results.spectrum, &mut self.results.magnitude)?;
                PipelineState::Filtering
            }
            PipelineState::Filtering => {
                // Filter a copy so the unfiltered spectrum stays available
                self.results
                    .filtered_spectrum
                    .copy_from_slice(&self.results.spectrum);
                self.filters.apply(&mut self.results.filtered_spectrum);
                self.transform.magnitude(
                    &self.results.filtered_spectrum,
                    &mut self.results.filtered_magnitude,
                )?;
                PipelineState::Reconstructing
            }
            PipelineState::Reconstructing => {
                self.transform
                    .inverse(&self.results.spectrum, &mut self.results.waveform)?;
                self.transform.inverse(
                    &self.results.filtered_spectrum,
                    &mut self.results.filtered_waveform,
                )?;
                PipelineState::Publishing
            }
            PipelineState::Publishing => {
                self.publish();
                // Only now is the previous cycle fully consumed
                self.sampler.start()?;
                self.cycles += 1;
                log::debug!("Cycle {} published", self.cycles);
                PipelineState::WaitingForSample
            }
        };

        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// Run one full cycle if samples are ready
    ///
    /// # Returns
    /// `true` if a cycle was processed and acquisition re-armed
    pub fn poll(&mut self) -> Result<bool, PipelineError> {
        if self.state == PipelineState::WaitingForSample && !self.sampler.is_complete() {
            return Ok(false);
        }

        loop {
            if self.step()? == PipelineState::WaitingForSample {
                return Ok(true);
            }
        }
    }

    /// Poll forever; only returns on a fatal error
    pub fn run(&mut self) -> Result<Infallible, PipelineError> {
        loop {
            if !self.poll()? {
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }

    fn publish(&mut self) {
        let results = &self.results;
        let series: [(&str, &[f32]); 6] = [
            (labels::FREQS, self.axes.frequencies.as_slice()),
            (labels::FFT_REAL, results.magnitude.as_slice()),
            (labels::FFT_FILTERED, results.filtered_magnitude.as_slice()),
            (labels::TIME, self.axes.times.as_slice()),
            (labels::IFFT_REAL, results.waveform.as_slice()),
            (labels::IFFT_FILTERED, results.filtered_waveform.as_slice()),
        ];

        for (label, values) in series {
            if let Err(e) = self.sink.publish(label, values) {
                log::warn!("Failed to publish '{label}': {e}");
            }
        }
        if let Err(e) = self.sink.flush() {
            log::warn!("Failed to flush output: {e}");
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Series of the most recently processed cycle
    pub fn last_cycle(&self) -> &CycleResults {
        &self.results
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    pub fn axes(&self) -> &BinAxes {
        &self.axes
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingSink;
    use std::io;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            fft_len: 64,
            sample_rate_hz: 64.0,
            notch_hz: 10.0,
            ..Default::default()
        }
    }

    fn fill<A: AnalogInput>(ticker: &mut SampleTicker<A>, ticks: usize) {
        for _ in 0..ticks {
            ticker.on_tick();
        }
    }

    #[test]
    fn test_state_sequence() {
        let (mut pipeline, mut ticker) =
            Pipeline::from_config(small_config(), || 2048u16, RecordingSink::new()).unwrap();

        assert_eq!(pipeline.step().unwrap(), PipelineState::WaitingForSample);
        fill(&mut ticker, 64);

        let states: Vec<PipelineState> = (0..5).map(|_| pipeline.step().unwrap()).collect();
        assert_eq!(
            states,
            vec![
                PipelineState::Transforming,
                PipelineState::Filtering,
                PipelineState::Reconstructing,
                PipelineState::Publishing,
                PipelineState::WaitingForSample,
            ]
        );
        assert_eq!(pipeline.cycles_completed(), 1);
        assert!(pipeline.sampler().is_armed());
    }

    #[test]
    fn test_poll_waits_for_samples() {
        let (mut pipeline, mut ticker) =
            Pipeline::from_config(small_config(), || 2048u16, RecordingSink::new()).unwrap();

        fill(&mut ticker, 63);
        assert!(!pipeline.poll().unwrap());
        assert!(pipeline.sink().series().is_empty());

        fill(&mut ticker, 1);
        assert!(pipeline.poll().unwrap());

        let labels: Vec<&str> = pipeline.sink().series().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(
            labels,
            vec!["freqs", "fft_real", "fft_filtered", "time", "ifft_real", "ifft_filtered"]
        );
    }

    #[test]
    fn test_sampler_not_rearmed_mid_cycle() {
        let (mut pipeline, mut ticker) =
            Pipeline::from_config(small_config(), || 100u16, RecordingSink::new()).unwrap();
        fill(&mut ticker, 64);

        // Stop right before publishing
        for _ in 0..4 {
            pipeline.step().unwrap();
        }
        assert_eq!(pipeline.state(), PipelineState::Publishing);
        assert!(!pipeline.sampler().is_armed());
        assert_eq!(ticker.on_tick(), crate::acquisition::TickOutcome::Idle);

        pipeline.step().unwrap();
        assert!(pipeline.sampler().is_armed());
    }

    #[test]
    fn test_rejects_mismatched_sampler() {
        let scale = VoltageScale::new(3.3, 4095, None);
        let (sampler, _ticker) = Sampler::new(|| 0u16, scale, 32);

        let result = Pipeline::new(small_config(), sampler, RecordingSink::new());
        assert!(matches!(
            result,
            Err(PipelineError::Acquisition(AcquisitionError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_rejects_bad_length_at_init() {
        let config = PipelineConfig {
            fft_len: 1000,
            ..Default::default()
        };
        let result = Pipeline::from_config(config, || 0u16, RecordingSink::new());
        assert!(matches!(result, Err(PipelineError::Config(ConfigError::InvalidLength(1000)))));
    }

    struct FailingSink;

    impl SeriesSink for FailingSink {
        fn publish(&mut self, _label: &str, _values: &[f32]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }
    }

    #[test]
    fn test_sink_failure_does_not_stop_pipeline() {
        let (mut pipeline, mut ticker) =
            Pipeline::from_config(small_config(), || 2048u16, FailingSink).unwrap();

        for _ in 0..3 {
            fill(&mut ticker, 64);
            assert!(pipeline.poll().unwrap());
        }
        assert_eq!(pipeline.cycles_completed(), 3);
    }
}
