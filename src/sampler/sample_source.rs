use std::time::Instant;
use tracing::debug;

use super::SamplerError;
use crate::processor::STANDARD_GRAVITY;

/// Source of raw lateral-acceleration readings in m/s².
///
/// Seam between the meter and whatever accelerometer the host provides.
/// A source that cannot deliver readings returns
/// [`SamplerError::SensorUnavailable`]; the meter keeps running with an
/// idle display in that case.
pub trait SampleSource: Send {
    fn name(&self) -> &str;

    /// Read the current raw lateral acceleration.
    fn read(&mut self) -> Result<f32, SamplerError>;
}

/// Deterministic accelerometer stand-in for hosts without real hardware.
///
/// Produces a smooth driving-like profile: standard gravity plus a sine
/// swing of the configured amplitude over the configured period.
#[derive(Debug)]
pub struct SimulatedAccelerometer {
    amplitude: f32,
    period_secs: f32,
    started: Instant,
}

impl SimulatedAccelerometer {
    pub fn new(amplitude: f32, period_secs: f32) -> Self {
        debug!(
            "Creating simulated accelerometer (amplitude {:.2} m/s², period {:.1}s)",
            amplitude, period_secs
        );
        Self {
            amplitude,
            period_secs: period_secs.max(1.0),
            started: Instant::now(),
        }
    }
}

impl SampleSource for SimulatedAccelerometer {
    fn name(&self) -> &str {
        "simulated accelerometer"
    }

    fn read(&mut self) -> Result<f32, SamplerError> {
        let elapsed = self.started.elapsed().as_secs_f32();
        let phase = elapsed / self.period_secs * std::f32::consts::TAU;
        Ok(STANDARD_GRAVITY + self.amplitude * phase.sin())
    }
}
