//! Frequency-domain notch and band-pass filtering

pub mod bank;
pub mod design;

pub use bank::{bandpass, notch, FilterBank};
pub use design::{FilterSpec, GUARD_BINS};
