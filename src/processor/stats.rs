use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Reference acceleration used to normalize raw readings into G units.
///
/// Matches the common "standard gravity" constant sensor stacks report
/// for a device at rest.
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Half-width of the dead-band window around the last accepted value.
pub const DEAD_BAND: f32 = 0.01;

// Force category for a classified sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Acceleration,
    Braking,
    RightForce,
    LeftForce,
}

impl Category {
    /// Classify a raw (pre-offset) lateral reading into a force category.
    ///
    /// The coarse ±0.5 thresholds are checked before the sign checks, so a
    /// reading of exactly 0.5 lands in `RightForce`, not `Acceleration`.
    pub fn classify(value: f32) -> Category {
        if value > 0.5 {
            Category::Acceleration
        } else if value < -0.5 {
            Category::Braking
        } else if value > 0.0 {
            Category::RightForce
        } else if value < 0.0 {
            Category::LeftForce
        } else {
            Category::Acceleration
        }
    }

    // Label used in the category display line
    pub fn label(&self) -> &'static str {
        match self {
            Category::Acceleration => "Acceleration",
            Category::Braking => "Braking",
            Category::RightForce => "Right Force",
            Category::LeftForce => "Left Force",
        }
    }

    pub const ALL: [Category; 4] = [
        Category::Acceleration,
        Category::Braking,
        Category::RightForce,
        Category::LeftForce,
    ];
}

/// Key into the stats table: one channel per force category plus the
/// combined channel fed by the legacy gravity-change path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatChannel {
    Combined,
    Force(Category),
}

// Running min/last/max for one channel, in normalized G units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceStats {
    pub min: f32,
    pub max: f32,
    pub last: f32,
}

impl ForceStats {
    /// Stats for a device at rest under one standard gravity.
    pub fn at_rest() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            last: 1.0,
        }
    }

    /// Record an accepted sample, widening min/max as needed.
    pub fn observe(&mut self, value: f32) {
        self.last = value;
        if self.min > value {
            self.min = value;
        }
        if self.max < value {
            self.max = value;
        }
    }
}

/// All five stat channels, keyed by [`StatChannel`].
///
/// Replaces the original meter's four parallel min/max/last field blocks
/// plus the separate combined block with a single mapping.
#[derive(Debug, Clone)]
pub struct StatsTable {
    channels: HashMap<StatChannel, ForceStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        let mut channels = HashMap::with_capacity(5);
        channels.insert(StatChannel::Combined, ForceStats::at_rest());
        for category in Category::ALL {
            channels.insert(StatChannel::Force(category), ForceStats::at_rest());
        }
        Self { channels }
    }

    pub fn get(&self, channel: StatChannel) -> ForceStats {
        // Every channel is inserted at construction and never removed
        self.channels
            .get(&channel)
            .copied()
            .unwrap_or_else(ForceStats::at_rest)
    }

    pub fn observe(&mut self, channel: StatChannel, value: f32) -> ForceStats {
        let stats = self
            .channels
            .entry(channel)
            .or_insert_with(ForceStats::at_rest);
        stats.observe(value);
        *stats
    }

    /// Reset every channel back to the at-rest baseline.
    pub fn reset(&mut self) {
        for stats in self.channels.values_mut() {
            *stats = ForceStats::at_rest();
        }
    }
}

impl Default for StatsTable {
    fn default() -> Self {
        Self::new()
    }
}

// Calibration offset against measured gravity
#[derive(Debug, Clone, Copy)]
pub struct CalibrationState {
    pub offset: f32,
    pub calibrated: bool,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            calibrated: false,
        }
    }

    /// Zero the meter against a raw gravity reading taken at rest.
    pub fn calibrate(&mut self, raw: f32) {
        self.offset = raw - STANDARD_GRAVITY;
        self.calibrated = true;
        debug!("Calibrated with offset {:+.4}", self.offset);
    }

    /// Convert a raw reading into offset-corrected G units.
    pub fn normalize(&self, raw: f32) -> f32 {
        (raw - self.offset) / STANDARD_GRAVITY
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Dead-band acceptance rule, applied to every normalized reading against
/// the channel's last accepted value.
///
/// Kept byte-for-byte compatible with the meter's historical rule: the
/// window is checked with an OR, so any finite reading within *or* outside
/// the ±0.01 band is accepted. The tighter reject-inside-the-band variant
/// was never confirmed as the intended behavior.
pub fn passes_dead_band(normalized: f32, last: f32) -> bool {
    normalized >= last - DEAD_BAND || normalized <= last + DEAD_BAND
}
