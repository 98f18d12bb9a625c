//! Publishing of spectral and time-domain series

pub mod sink;

pub use sink::{labels, JsonLineSink, RecordingSink, SeriesSink};
