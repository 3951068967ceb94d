//! Display side of the meter
//!
//! The processor pushes immutable [`DisplayUpdate`] snapshots over an mpsc
//! channel and never waits for rendering. [`console`] provides the bundled
//! sink, a tokio task that prints each snapshot together with the gauge
//! indicator angle.

pub mod console;

pub use console::ConsoleDisplay;

/// Gauge full-scale reading in G; the indicator wraps at 1.5 g.
pub const GAUGE_FULL_SCALE: f32 = 1.5;

/// Formatted snapshot pushed to the display sink.
///
/// Both variants carry already-formatted decimal strings; the sink only
/// arranges them and derives the indicator angle from the current value.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    /// Combined-channel snapshot: current, running min, running max.
    Combined {
        current: String,
        min: String,
        max: String,
    },
    /// Category snapshot: current, labeled category line, category max.
    Force {
        current: String,
        label: String,
        max: String,
    },
}

impl DisplayUpdate {
    /// The formatted current reading, common to both variants.
    pub fn current(&self) -> &str {
        match self {
            DisplayUpdate::Combined { current, .. } => current,
            DisplayUpdate::Force { current, .. } => current,
        }
    }
}

/// Format a G value the way every display field expects it: explicit sign,
/// two decimals (`+1.60`).
pub fn format_g(value: f32) -> String {
    format!("{:+.2}", value)
}

/// Rotation of the circular gauge's indicator for a normalized reading.
pub fn indicator_angle(current: f32) -> f32 {
    360.0 * (current / GAUGE_FULL_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_carries_explicit_sign_and_two_decimals() {
        assert_eq!(format_g(1.6), "+1.60");
        assert_eq!(format_g(-0.25), "-0.25");
        assert_eq!(format_g(0.0), "+0.00");
    }

    #[test]
    fn indicator_angle_spans_full_turn_at_full_scale() {
        assert_eq!(indicator_angle(1.5), 360.0);
        assert_eq!(indicator_angle(0.75), 180.0);
        assert_eq!(indicator_angle(0.0), 0.0);
    }

    #[test]
    fn formatted_current_parses_back() {
        // The console sink re-parses the current field to place the dot
        let value: f32 = format_g(1.23).parse().unwrap();
        assert!((value - 1.23).abs() < 1e-6);
    }
}
