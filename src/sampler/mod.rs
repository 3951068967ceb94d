//! Sensor sampling subsystem
//!
//! Feeds the processor from a [`SampleSource`]:
//!
//! 1. [`sample_source`] - Hardware seam plus the simulated accelerometer
//! 2. [`sampler_handle`] - Rate-limited polling loop, classification,
//!    calibration flag, shutdown token
//!
//! # Architecture
//!
//! ```text
//! SampleSource ──► SamplerHandle ──► ProcessorHandle
//!  (raw m/s²)      (≥500ms ticks,
//!                   classify, calibrate flag)
//! ```

pub mod sample_source;
pub mod sampler_handle;

pub use sample_source::{SampleSource, SimulatedAccelerometer};
pub use sampler_handle::{SamplerHandle, SamplerSettings, MIN_SAMPLE_INTERVAL_MS};

use crate::processor::MailboxError;

// Sampler errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("No accelerometer available: {0}")]
    SensorUnavailable(String),

    #[error("Failed to read sensor: {0}")]
    ReadError(String),

    #[error("Processor unavailable: {0}")]
    ProcessorUnavailable(#[from] MailboxError),
}
