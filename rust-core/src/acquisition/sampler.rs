//! Timer-driven acquisition state machine
//!
//! Split into two halves that never share mutable state:
//! - `SampleTicker` runs in the timer context. Each tick reads one
//!   conversion, scales it and pushes it into the ring. After the Nth sample
//!   it disarms itself and raises the completion flag.
//! - `Sampler` stays with the main loop. It polls completion, moves the cycle
//!   out of the ring and re-arms the ticker.
//!
//! The ring holds exactly N samples and `start` refuses to re-arm while any of
//! them is still unread, so an acquisition can never overwrite a cycle the
//! main loop has not copied out yet.

use super::buffer::{sample_ring, SampleConsumer, SampleProducer};
use super::input::{AnalogInput, VoltageScale};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("Acquisition is not complete")]
    NotReady,

    #[error("Sampler is already armed")]
    Busy,

    #[error("Cannot re-arm: {0} samples of the previous cycle are still unread")]
    UnconsumedSamples(usize),

    #[error("Read {actual} samples, expected {expected}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Destination holds {actual} samples, cycle length is {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Result of a single timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not armed, nothing was read
    Idle,

    /// One sample was stored
    Sampled,

    /// The Nth sample was stored, timer disarmed and completion raised
    Completed,

    /// Ring was full, sample dropped and timer disarmed
    Overrun,
}

/// Flags shared across the timer boundary
#[derive(Debug, Default)]
struct SamplerShared {
    armed: AtomicBool,
    complete: AtomicBool,
    completions: AtomicUsize,
}

/// Timer-context half: the only write path into the sample ring
pub struct SampleTicker<A> {
    input: A,
    scale: VoltageScale,
    producer: SampleProducer,
    written: usize,
    len: usize,
    shared: Arc<SamplerShared>,
}

impl<A: AnalogInput> SampleTicker<A> {
    /// Handle one timer expiry
    ///
    /// Bounded and non-blocking: one conversion, one ring write.
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.shared.armed.load(Ordering::Acquire) {
            return TickOutcome::Idle;
        }

        let volts = self.scale.to_volts(self.input.read_raw());
        if !self.producer.push(volts) {
            self.written = 0;
            self.shared.armed.store(false, Ordering::Release);
            log::warn!("Sample ring full, acquisition stopped");
            return TickOutcome::Overrun;
        }

        self.written += 1;
        if self.written < self.len {
            return TickOutcome::Sampled;
        }

        // Cancel the timer before publishing completion
        self.written = 0;
        self.shared.armed.store(false, Ordering::Release);
        self.shared.complete.store(true, Ordering::Release);
        self.shared.completions.fetch_add(1, Ordering::Relaxed);
        TickOutcome::Completed
    }

    /// Whether ticks currently take samples
    pub fn is_armed(&self) -> bool {
        self.shared.armed.load(Ordering::Acquire)
    }
}

/// Main-loop half of the acquisition state machine
pub struct Sampler {
    consumer: SampleConsumer,
    len: usize,
    shared: Arc<SamplerShared>,
}

impl Sampler {
    /// Build both halves around a ring of `len` samples
    ///
    /// The sampler starts disarmed; call `start` to begin the first cycle.
    pub fn new<A: AnalogInput>(input: A, scale: VoltageScale, len: usize) -> (Self, SampleTicker<A>) {
        let (producer, consumer) = sample_ring(len);
        let shared = Arc::new(SamplerShared::default());

        let sampler = Self {
            consumer,
            len,
            shared: Arc::clone(&shared),
        };
        let ticker = SampleTicker {
            input,
            scale,
            producer,
            written: 0,
            len,
            shared,
        };

        (sampler, ticker)
    }

    /// Arm the timer for a new cycle
    ///
    /// # Errors
    /// * `Busy` - a cycle is already in progress
    /// * `UnconsumedSamples` - the previous cycle has not been taken yet
    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.shared.armed.load(Ordering::Acquire) {
            return Err(AcquisitionError::Busy);
        }
        if !self.consumer.is_empty() {
            return Err(AcquisitionError::UnconsumedSamples(self.consumer.len()));
        }

        self.shared.complete.store(false, Ordering::Release);
        self.shared.armed.store(true, Ordering::Release);
        log::trace!("Sampler armed for {} samples", self.len);
        Ok(())
    }

    /// Completion flag, no side effects
    pub fn is_complete(&self) -> bool {
        self.shared.complete.load(Ordering::Acquire)
    }

    /// Whether a cycle is being acquired
    pub fn is_armed(&self) -> bool {
        self.shared.armed.load(Ordering::Acquire)
    }

    /// Number of cycles completed since construction
    pub fn completions(&self) -> usize {
        self.shared.completions.load(Ordering::Relaxed)
    }

    /// Samples per cycle
    pub fn len(&self) -> usize {
        self.len
    }

    /// Move the completed cycle into `dst` and clear the completion flag
    ///
    /// After this returns the ring is empty and `start` may be called.
    pub fn take_samples(&mut self, dst: &mut [f32]) -> Result<(), AcquisitionError> {
        if dst.len() != self.len {
            return Err(AcquisitionError::LengthMismatch {
                expected: self.len,
                actual: dst.len(),
            });
        }
        if !self.is_complete() {
            return Err(AcquisitionError::NotReady);
        }

        let read = self.consumer.read(dst);
        self.shared.complete.store(false, Ordering::Release);

        if read != self.len {
            return Err(AcquisitionError::ShortRead {
                expected: self.len,
                actual: read,
            });
        }
        Ok(())
    }
}
