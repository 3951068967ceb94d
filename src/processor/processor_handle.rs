use tokio::sync::mpsc;
use tracing::{debug, info};

use super::mailbox::{Mailbox, MailboxError, ProcessorCommand};
use super::stats::Category;
use super::worker::GForceProcessor;
use crate::display::DisplayUpdate;

/// Handle to a running G-force processor worker.
///
/// Created by [`ProcessorHandle::spawn`] and passed to whichever components
/// produce commands; the worker's queue is never exposed through shared
/// static state. Cloning the handle shares the same mailbox.
///
/// # Threading model
///
/// ```text
/// producers ─[ProcessorCommand]→ worker task ─[DisplayUpdate]→ sink
///            (coalescing mailbox)              (provided sender)
/// ```
///
/// Every send is fire-and-forget; after [`stop`](Self::stop) all further
/// sends are dropped with [`MailboxError::Closed`].
#[derive(Debug, Clone)]
pub struct ProcessorHandle {
    mailbox: Mailbox,
}

impl ProcessorHandle {
    /// Spawn the worker task and return the producer-side handle.
    pub fn spawn(update_sender: mpsc::Sender<DisplayUpdate>) -> Self {
        info!("Spawning G-force processor");

        let mailbox = Mailbox::new();
        let worker = GForceProcessor::create(mailbox.clone(), update_sender);

        tokio::spawn(async move {
            let _stopped = worker.run().await;
        });

        info!("G-force processor spawned successfully");
        Self { mailbox }
    }

    /// Zero the offset against a raw gravity reading and reset all running
    /// stats. Processed ahead of any queued sample.
    pub fn calibrate(&self, raw: f32) -> Result<(), MailboxError> {
        self.mailbox.send(ProcessorCommand::Calibrate(raw))
    }

    /// Legacy combined-channel sample.
    pub fn submit_gravity(&self, raw: f32) -> Result<(), MailboxError> {
        self.mailbox.send(ProcessorCommand::GravityChange(raw))
    }

    /// Classified directional sample.
    pub fn submit_force(&self, category: Category, raw: f32) -> Result<(), MailboxError> {
        self.mailbox.send(ProcessorCommand::ForceSample(category, raw))
    }

    /// Terminate the worker. Safe to call more than once; repeated stops
    /// find the mailbox already sealed.
    pub fn stop(&self) {
        match self.mailbox.send(ProcessorCommand::Stop) {
            Ok(()) => info!("Stop command enqueued"),
            Err(MailboxError::Closed) => debug!("Processor already stopping"),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.mailbox.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayUpdate;
    use crate::processor::stats::STANDARD_GRAVITY;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next_update(rx: &mut mpsc::Receiver<DisplayUpdate>) -> DisplayUpdate {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for display update")
            .expect("display channel closed unexpectedly")
    }

    #[tokio::test]
    async fn calibrate_emits_at_rest_snapshot() {
        let (tx, mut rx) = mpsc::channel(16);
        let processor = ProcessorHandle::spawn(tx);

        processor.calibrate(STANDARD_GRAVITY).unwrap();

        assert_eq!(
            next_update(&mut rx).await,
            DisplayUpdate::Combined {
                current: "+1.00".into(),
                min: "+1.00".into(),
                max: "+1.00".into(),
            }
        );
        processor.stop();
    }

    #[tokio::test]
    async fn acceleration_sample_end_to_end() {
        let (tx, mut rx) = mpsc::channel(16);
        let processor = ProcessorHandle::spawn(tx);

        processor.calibrate(STANDARD_GRAVITY).unwrap();
        let _ = next_update(&mut rx).await;

        processor
            .submit_force(Category::Acceleration, STANDARD_GRAVITY * 1.6)
            .unwrap();

        assert_eq!(
            next_update(&mut rx).await,
            DisplayUpdate::Force {
                current: "+1.60".into(),
                label: "Acceleration: +1.60".into(),
                max: "+1.60".into(),
            }
        );
        processor.stop();
    }

    #[tokio::test]
    async fn gravity_channel_tracks_running_min_and_max() {
        let (tx, mut rx) = mpsc::channel(16);
        let processor = ProcessorHandle::spawn(tx);

        processor.calibrate(STANDARD_GRAVITY).unwrap();
        let _ = next_update(&mut rx).await;

        processor.submit_gravity(STANDARD_GRAVITY * 2.0).unwrap();
        assert_eq!(
            next_update(&mut rx).await,
            DisplayUpdate::Combined {
                current: "+2.00".into(),
                min: "+1.00".into(),
                max: "+2.00".into(),
            }
        );

        processor.submit_gravity(STANDARD_GRAVITY * 0.5).unwrap();
        assert_eq!(
            next_update(&mut rx).await,
            DisplayUpdate::Combined {
                current: "+0.50".into(),
                min: "+0.50".into(),
                max: "+2.00".into(),
            }
        );
        processor.stop();
    }

    #[tokio::test]
    async fn recalibrating_resets_every_channel() {
        let (tx, mut rx) = mpsc::channel(16);
        let processor = ProcessorHandle::spawn(tx);

        processor.calibrate(STANDARD_GRAVITY).unwrap();
        let _ = next_update(&mut rx).await;
        processor
            .submit_force(Category::Braking, -STANDARD_GRAVITY * 1.2)
            .unwrap();
        let _ = next_update(&mut rx).await;

        processor.calibrate(STANDARD_GRAVITY).unwrap();
        let _ = next_update(&mut rx).await;

        // Category min starts back at the at-rest baseline
        processor
            .submit_force(Category::Braking, STANDARD_GRAVITY * 1.1)
            .unwrap();
        assert_eq!(
            next_update(&mut rx).await,
            DisplayUpdate::Force {
                current: "+1.10".into(),
                label: "Braking: +1.10".into(),
                max: "+1.10".into(),
            }
        );
        processor.stop();
    }

    #[tokio::test]
    async fn commands_after_stop_neither_fault_nor_emit() {
        let (tx, mut rx) = mpsc::channel(16);
        let processor = ProcessorHandle::spawn(tx);

        processor.stop();
        // Idempotent-safe: a second stop must not fault
        processor.stop();
        assert!(processor.is_stopped());

        assert!(matches!(
            processor.calibrate(STANDARD_GRAVITY),
            Err(MailboxError::Closed)
        ));
        assert!(matches!(
            processor.submit_force(Category::LeftForce, -3.0),
            Err(MailboxError::Closed)
        ));

        // The worker drops its update sender on shutdown; no update may
        // precede the close
        let closed = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("worker did not shut down in time");
        assert_eq!(closed, None);
    }
}
