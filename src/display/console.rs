use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{indicator_angle, DisplayUpdate};

/// Console rendering of the meter: prints each snapshot and the position
/// the gauge indicator would rotate to.
pub struct ConsoleDisplay {}

impl ConsoleDisplay {
    /// Spawn the sink task consuming display updates until the channel
    /// closes.
    pub fn spawn(mut updates: mpsc::Receiver<DisplayUpdate>) -> JoinHandle<()> {
        info!("Starting console display sink");

        tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                Self::render(&update);
            }
            info!("Display channel closed, console sink finished");
        })
    }

    fn render(update: &DisplayUpdate) {
        // The current field is the sink's only numeric input; it arrives
        // formatted, so parse it back for the gauge geometry
        let angle = match update.current().parse::<f32>() {
            Ok(current) => indicator_angle(current),
            Err(e) => {
                warn!("Unparseable current value {:?}: {}", update.current(), e);
                0.0
            }
        };

        match update {
            DisplayUpdate::Combined { current, min, max } => {
                println!("G {}  min {}  max {}  | indicator {:.0}°", current, min, max, angle);
            }
            DisplayUpdate::Force {
                current,
                label,
                max,
            } => {
                println!("G {}  {}  max {}  | indicator {:.0}°", current, label, max, angle);
            }
        }
        debug!("Rendered {:?}", update);
    }
}
