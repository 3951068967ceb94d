use statum::{machine, state};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::mailbox::{Mailbox, ProcessorCommand};
use super::stats::{passes_dead_band, CalibrationState, Category, StatChannel, StatsTable};
use crate::display::{format_g, DisplayUpdate};

// Define worker states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum WorkerState {
    Running,
    Stopped,
}

#[machine]
#[derive(Debug)]
pub struct GForceProcessor<S: WorkerState> {
    // Inbound command queue
    mailbox: Mailbox,

    // Calibration offset against measured gravity
    calibration: CalibrationState,

    // Five stat channels: combined plus one per force category
    stats: StatsTable,

    // Channel for pushing formatted snapshots to the display sink
    update_sender: mpsc::Sender<DisplayUpdate>,
}

// Implementation for the Running state
impl GForceProcessor<Running> {
    pub fn create(mailbox: Mailbox, update_sender: mpsc::Sender<DisplayUpdate>) -> Self {
        debug!("Creating G-force processor worker");
        Self::new(
            mailbox,
            CalibrationState::new(),
            StatsTable::new(),
            update_sender,
        )
    }

    /// Process commands until a `Stop` arrives. Terminal: the returned
    /// machine cannot re-enter the loop; spawn a fresh worker to resume.
    pub async fn run(mut self) -> GForceProcessor<Stopped> {
        info!("Starting G-force processor loop");

        loop {
            let command = self.mailbox.recv().await;
            match command {
                ProcessorCommand::Calibrate(raw) => self.handle_calibrate(raw),
                ProcessorCommand::GravityChange(raw) => self.handle_gravity_change(raw),
                ProcessorCommand::ForceSample(category, raw) => {
                    self.handle_force_sample(category, raw)
                }
                ProcessorCommand::Stop => {
                    info!("Stop received, shutting down processor");
                    self.mailbox.close();
                    break;
                }
            }
        }

        info!("G-force processor loop finished");
        self.transition()
    }

    fn handle_calibrate(&mut self, raw: f32) {
        debug!("Calibrating against raw reading {:+.4}", raw);

        // A queued legacy sample must not be interpreted with the new offset
        self.mailbox.cancel_gravity();

        self.calibration.calibrate(raw);
        self.stats.reset();

        let at_rest = self.stats.get(StatChannel::Combined);
        self.emit(DisplayUpdate::Combined {
            current: format_g(at_rest.last),
            min: format_g(at_rest.min),
            max: format_g(at_rest.max),
        });
    }

    // Legacy combined-channel path
    fn handle_gravity_change(&mut self, raw: f32) {
        let normalized = self.calibration.normalize(raw);
        let last = self.stats.get(StatChannel::Combined).last;
        debug!(
            "Gravity sample {:+.4} normalized to {:+.2} (last {:+.2})",
            raw, normalized, last
        );

        if !passes_dead_band(normalized, last) {
            trace!("Difference not enough, dropping gravity sample");
            return;
        }

        let stats = self.stats.observe(StatChannel::Combined, normalized);
        self.emit(DisplayUpdate::Combined {
            current: format_g(stats.last),
            min: format_g(stats.min),
            max: format_g(stats.max),
        });
    }

    fn handle_force_sample(&mut self, category: Category, raw: f32) {
        let normalized = self.calibration.normalize(raw);
        let last = self.stats.get(StatChannel::Force(category)).last;
        debug!(
            "{:?} sample {:+.4} normalized to {:+.2} (last {:+.2})",
            category, raw, normalized, last
        );

        if !passes_dead_band(normalized, last) {
            trace!("Difference not enough, dropping {:?} sample", category);
            return;
        }

        let stats = self.stats.observe(StatChannel::Force(category), normalized);
        self.emit(DisplayUpdate::Force {
            current: format_g(stats.last),
            label: format!("{}: {}", category.label(), format_g(stats.last)),
            max: format_g(stats.max),
        });
    }

    // Fire-and-forget handoff; the worker never waits on the sink
    fn emit(&self, update: DisplayUpdate) {
        match self.update_sender.try_send(update) {
            Ok(()) => trace!("Display update emitted"),
            Err(mpsc::error::TrySendError::Full(update)) => {
                warn!("Display channel full, dropping {:?}", update);
            }
            Err(mpsc::error::TrySendError::Closed(update)) => {
                warn!("Display channel closed, dropping {:?}", update);
            }
        }
    }
}
