//! Timed ADC acquisition

pub mod buffer;
pub mod input;
pub mod sampler;
pub mod timer;

pub use input::{AnalogInput, InputError, ReplayInput, SignalGenerator, Tone, VoltageScale};
pub use sampler::{AcquisitionError, SampleTicker, Sampler, TickOutcome};
pub use timer::TickThread;
