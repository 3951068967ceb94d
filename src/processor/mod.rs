//! G-force processing core
//!
//! Implements the meter's sequential worker and its data model:
//!
//! 1. [`mailbox`] - Coalescing priority queue feeding the worker
//! 2. [`stats`] - Calibration offset, classifier, per-category min/last/max
//! 3. [`worker`] - Command loop (Running → Stopped state machine)
//! 4. [`processor_handle`] - Spawning and the producer-facing API
//!
//! # Architecture
//!
//! ```text
//! Sampler ──► Mailbox ──► Worker ──► DisplayUpdate
//!            (coalesced)  (calibrate, dead-band, stats)
//! ```
//!
//! The worker owns all mutable state; producers only ever enqueue typed
//! commands and never block.

pub mod mailbox;
pub mod processor_handle;
pub mod stats;
pub mod worker;

pub use mailbox::{MailboxError, ProcessorCommand};
pub use processor_handle::ProcessorHandle;
pub use stats::{Category, StatChannel, STANDARD_GRAVITY};
