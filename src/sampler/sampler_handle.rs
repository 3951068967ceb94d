use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::sample_source::SampleSource;
use crate::processor::{Category, ProcessorHandle};

/// Samples are never forwarded more often than this, regardless of what
/// the config asks for.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 500;

// Sampler settings
#[derive(Clone, Debug)]
pub struct SamplerSettings {
    /// Forwarding interval in milliseconds, clamped up to
    /// [`MIN_SAMPLE_INTERVAL_MS`].
    pub sample_interval_ms: u64,

    /// Route samples through the legacy combined channel instead of the
    /// per-category one.
    pub use_combined_channel: bool,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: MIN_SAMPLE_INTERVAL_MS,
            use_combined_channel: false,
        }
    }
}

impl SamplerSettings {
    fn effective_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(MIN_SAMPLE_INTERVAL_MS))
    }
}

/// Handle for the sampling task feeding the processor.
///
/// Polls a [`SampleSource`] at the configured cadence, classifies each raw
/// reading, and forwards exactly one command per tick. A pending-calibration
/// flag (set at startup, and again via [`request_calibration`]) turns the
/// next reading into a `Calibrate` command instead of a sample.
///
/// [`request_calibration`]: Self::request_calibration
pub struct SamplerHandle {
    calibrate_requested: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl SamplerHandle {
    /// Spawn the sampling loop as a tokio task.
    pub fn spawn(
        settings: Option<SamplerSettings>,
        mut source: Box<dyn SampleSource>,
        processor: ProcessorHandle,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        info!(
            "Spawning sampler for {} with settings: {:?}",
            source.name(),
            settings
        );

        // The meter calibrates against the first reading it ever sees
        let calibrate_requested = Arc::new(AtomicBool::new(true));
        let shutdown = CancellationToken::new();

        let flag = Arc::clone(&calibrate_requested);
        let token = shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.effective_interval());
            let mut forwarded: u64 = 0;
            let mut last_log = chrono::Local::now();
            let log_interval = chrono::Duration::seconds(30);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("Sampler shutdown requested");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                let raw = match source.read() {
                    Ok(raw) => raw,
                    Err(e) => {
                        // Non-fatal: the display just stays idle
                        warn!("Sensor read failed: {}", e);
                        continue;
                    }
                };

                let result = if flag.swap(false, Ordering::SeqCst) {
                    debug!("Forwarding calibration reading {:+.4}", raw);
                    processor.calibrate(raw)
                } else if settings.use_combined_channel {
                    processor.submit_gravity(raw)
                } else {
                    // Classification runs on the raw reading, before any
                    // offset correction
                    let category = Category::classify(raw);
                    trace!("Classified raw {:+.4} as {:?}", raw, category);
                    processor.submit_force(category, raw)
                };

                match result {
                    Ok(()) => forwarded += 1,
                    Err(e) => {
                        error!("Processor unavailable, sample dropped: {}", e);
                    }
                }

                let now = chrono::Local::now();
                if now - last_log > log_interval {
                    info!(
                        "Sampler stats: forwarded {} samples in last {}s",
                        forwarded,
                        log_interval.num_seconds()
                    );
                    forwarded = 0;
                    last_log = now;
                }
            }

            info!("Sampler task finished");
        });

        Self {
            calibrate_requested,
            shutdown,
        }
    }

    /// Turn the next forwarded reading into a calibration.
    pub fn request_calibration(&self) {
        info!("Calibration requested");
        self.calibrate_requested.store(true, Ordering::SeqCst);
    }

    /// Stop the sampling loop. The processor keeps running until it is
    /// stopped separately.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
