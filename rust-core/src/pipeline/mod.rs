//! Acquisition -> transform -> filter -> reconstruct -> publish loop

pub mod processor;

pub use processor::{CycleResults, Pipeline, PipelineError, PipelineState};
