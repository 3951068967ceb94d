use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::{debug, trace};

use super::stats::Category;

// Commands accepted by the processor worker
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorCommand {
    /// Zero the offset against a raw gravity reading and reset all stats.
    Calibrate(f32),
    /// Legacy combined-channel sample.
    GravityChange(f32),
    /// Directional sample, already classified by the sampler.
    ForceSample(Category, f32),
    /// Terminate the worker loop. Terminal.
    Stop,
}

/// Coalescing key: at most one command per key sits in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoalesceKey {
    Calibrate,
    Gravity,
    Force(Category),
    Stop,
}

impl ProcessorCommand {
    fn key(&self) -> CoalesceKey {
        match self {
            ProcessorCommand::Calibrate(_) => CoalesceKey::Calibrate,
            ProcessorCommand::GravityChange(_) => CoalesceKey::Gravity,
            ProcessorCommand::ForceSample(category, _) => CoalesceKey::Force(*category),
            ProcessorCommand::Stop => CoalesceKey::Stop,
        }
    }

    // Calibrate and Stop must take effect before any queued sample
    fn is_priority(&self) -> bool {
        matches!(
            self,
            ProcessorCommand::Calibrate(_) | ProcessorCommand::Stop
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox closed, command dropped")]
    Closed,
}

/// Ordered inbound queue for the processor worker.
///
/// Implements the three queue guarantees the worker relies on:
///
/// 1. **Coalescing** - enqueueing a command removes any queued command with
///    the same coalescing key, so only the most recent sample per channel
///    is ever processed and backlog cannot build up.
/// 2. **Priority** - `Calibrate` and `Stop` enqueue at the front of the
///    queue, ahead of every pending sample.
/// 3. **Close** - once closed (by the worker handling `Stop`), further
///    sends are rejected and dropped; producers log and carry on.
///
/// Enqueueing never blocks the caller.
#[derive(Debug, Clone)]
pub struct Mailbox {
    inner: Arc<MailboxInner>,
}

#[derive(Debug)]
struct MailboxInner {
    queue: Mutex<VecDeque<ProcessorCommand>>,
    notify: Notify,
    closed: AtomicBool,
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue a command, replacing any pending command with the same
    /// coalescing key.
    pub fn send(&self, command: ProcessorCommand) -> Result<(), MailboxError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            trace!("Dropping {:?}: mailbox closed", command);
            return Err(MailboxError::Closed);
        }

        let key = command.key();
        let priority = command.is_priority();
        {
            let mut queue = self
                .inner
                .queue
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            queue.retain(|pending| pending.key() != key);
            if priority {
                queue.push_front(command);
            } else {
                queue.push_back(command);
            }
        }
        // Nothing sent after a Stop may reach the worker, even if the
        // worker has not drained the queue yet
        if key == CoalesceKey::Stop {
            self.inner.closed.store(true, Ordering::SeqCst);
        }
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Receive the next command, waiting until one is available.
    pub async fn recv(&self) -> ProcessorCommand {
        loop {
            let notified = self.inner.notify.notified();
            if let Some(command) = self.pop() {
                return command;
            }
            notified.await;
        }
    }

    fn pop(&self) -> Option<ProcessorCommand> {
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.pop_front()
    }

    /// Drop any pending legacy gravity samples. Called when a calibration
    /// is handled so no stale sample is interpreted with the new offset.
    pub fn cancel_gravity(&self) {
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = queue.len();
        queue.retain(|pending| pending.key() != CoalesceKey::Gravity);
        if queue.len() != before {
            debug!("Cancelled pending gravity sample");
        }
    }

    /// Reject all further sends and discard anything still queued.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !queue.is_empty() {
            debug!("Discarding {} queued commands on close", queue.len());
            queue.clear();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn back_to_back_calibrates_coalesce_to_the_later_value() {
        let mailbox = Mailbox::new();
        mailbox.send(ProcessorCommand::Calibrate(9.7)).unwrap();
        mailbox.send(ProcessorCommand::Calibrate(9.9)).unwrap();

        assert_eq!(mailbox.len(), 1);
        assert_eq!(mailbox.recv().await, ProcessorCommand::Calibrate(9.9));
    }

    #[tokio::test]
    async fn calibrate_jumps_ahead_of_queued_samples() {
        let mailbox = Mailbox::new();
        mailbox
            .send(ProcessorCommand::ForceSample(Category::Braking, -4.0))
            .unwrap();
        mailbox.send(ProcessorCommand::GravityChange(9.8)).unwrap();
        mailbox.send(ProcessorCommand::Calibrate(9.81)).unwrap();

        assert_eq!(mailbox.recv().await, ProcessorCommand::Calibrate(9.81));
    }

    #[tokio::test]
    async fn force_samples_coalesce_per_category() {
        let mailbox = Mailbox::new();
        mailbox
            .send(ProcessorCommand::ForceSample(Category::Acceleration, 1.0))
            .unwrap();
        mailbox
            .send(ProcessorCommand::ForceSample(Category::Braking, -1.0))
            .unwrap();
        mailbox
            .send(ProcessorCommand::ForceSample(Category::Acceleration, 2.0))
            .unwrap();

        assert_eq!(mailbox.len(), 2);
        assert_eq!(
            mailbox.recv().await,
            ProcessorCommand::ForceSample(Category::Braking, -1.0)
        );
        assert_eq!(
            mailbox.recv().await,
            ProcessorCommand::ForceSample(Category::Acceleration, 2.0)
        );
    }

    #[tokio::test]
    async fn cancel_gravity_leaves_other_commands_queued() {
        let mailbox = Mailbox::new();
        mailbox.send(ProcessorCommand::GravityChange(9.8)).unwrap();
        mailbox
            .send(ProcessorCommand::ForceSample(Category::LeftForce, -2.0))
            .unwrap();

        mailbox.cancel_gravity();
        assert_eq!(mailbox.len(), 1);
        assert_eq!(
            mailbox.recv().await,
            ProcessorCommand::ForceSample(Category::LeftForce, -2.0)
        );
    }

    #[test]
    fn sends_after_close_are_dropped() {
        let mailbox = Mailbox::new();
        mailbox.send(ProcessorCommand::GravityChange(9.8)).unwrap();
        mailbox.close();

        assert!(mailbox.is_closed());
        assert_eq!(mailbox.len(), 0);
        assert!(matches!(
            mailbox.send(ProcessorCommand::Calibrate(9.81)),
            Err(MailboxError::Closed)
        ));
        // Closing twice must not fault
        mailbox.close();
    }

    #[tokio::test]
    async fn stop_seals_the_mailbox_against_later_sends() {
        let mailbox = Mailbox::new();
        mailbox.send(ProcessorCommand::Stop).unwrap();

        assert!(matches!(
            mailbox.send(ProcessorCommand::Calibrate(9.81)),
            Err(MailboxError::Closed)
        ));
        // The worker still drains the Stop itself
        assert_eq!(mailbox.recv().await, ProcessorCommand::Stop);
    }
}
