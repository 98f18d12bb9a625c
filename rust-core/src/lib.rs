//! ECG Filter - Frequency-Domain ECG Cleanup Core
//!
//! Timed acquisition of a fixed-length ECG frame, real FFT, mains-hum notch
//! and band-pass zeroing, inverse FFT, and JSON-line publishing of both domains.

pub mod acquisition;
pub mod config;
pub mod filters;
pub mod output;
pub mod pipeline;
pub mod spectrum;

pub use config::PipelineConfig;
pub use filters::FilterBank;
pub use pipeline::Pipeline;
pub use spectrum::SpectralTransform;
