//! ECG filter main loop
//!
//! Samples at the configured rate, filters each 1024-sample frame and writes
//! the six plotter series to stdout as JSON lines. Runs until killed.
//!
//! Environment:
//! * `ECG_FILTER_CONFIG` - optional JSON config file
//! * `ECG_FILTER_REPLAY` - optional file of raw ADC codes to replay instead of
//!   the built-in test signal
//! * `RUST_LOG` - log filter (default `info`, logs go to stderr)

use ecg_filter::acquisition::{AnalogInput, ReplayInput, SignalGenerator, TickThread, Tone, VoltageScale};
use ecg_filter::output::JsonLineSink;
use ecg_filter::{Pipeline, PipelineConfig};
use std::convert::Infallible;
use std::error::Error;
use std::io::BufWriter;
use std::process::ExitCode;

const CONFIG_ENV: &str = "ECG_FILTER_CONFIG";
const REPLAY_ENV: &str = "ECG_FILTER_REPLAY";

/// Bias of the analog front-end in volts
const FRONT_END_BIAS: f32 = 1.65;

enum Source {
    Replay(ReplayInput),
    Synthetic(SignalGenerator),
}

impl AnalogInput for Source {
    fn read_raw(&mut self) -> u16 {
        match self {
            Source::Replay(input) => input.read_raw(),
            Source::Synthetic(input) => input.read_raw(),
        }
    }
}

fn test_signal(config: &PipelineConfig) -> SignalGenerator {
    SignalGenerator::new(config.sample_rate_hz, FRONT_END_BIAS, VoltageScale::from(&config.adc))
        .with_tone(Tone::new(10.0, 1.0))
        .with_tone(Tone::new(50.0, 0.5))
}

fn run() -> Result<Infallible, Box<dyn Error>> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            log::info!("Loading config from {}", path.to_string_lossy());
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };

    let source = match std::env::var_os(REPLAY_ENV) {
        Some(path) => {
            let replay = ReplayInput::from_file(&path)?;
            log::info!("Replaying {} codes from {}", replay.len(), path.to_string_lossy());
            Source::Replay(replay)
        }
        None => {
            log::info!("Using synthetic 10 Hz + 50 Hz test signal");
            Source::Synthetic(test_signal(&config))
        }
    };

    let sink = JsonLineSink::new(BufWriter::new(std::io::stdout().lock()));
    let (mut pipeline, ticker) = Pipeline::from_config(config.clone(), source, sink)?;
    let _timer = TickThread::spawn(ticker, config.sample_period())?;

    Ok(pipeline.run()?)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(never) => match never {},
        Err(e) => {
            log::error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
