pub mod config;
pub mod display;
pub mod processor;
pub mod sampler;

use crate::config::MeterConfig;
use crate::display::ConsoleDisplay;
use crate::processor::ProcessorHandle;
use crate::sampler::{SamplerHandle, SimulatedAccelerometer};
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = MeterConfig::load();
    info!("Starting G-force meter with config: {:?}", config);

    // Display channel: processor pushes formatted snapshots, sink renders
    let (update_tx, update_rx) = mpsc::channel(config.display.update_channel_capacity);

    let processor = ProcessorHandle::spawn(update_tx);
    let sink = ConsoleDisplay::spawn(update_rx);

    let source = Box::new(SimulatedAccelerometer::new(
        config.sampler.simulated_amplitude,
        config.sampler.simulated_period_secs,
    ));
    let sampler = SamplerHandle::spawn(Some(config.sampler_settings()), source, processor.clone());

    info!("G-force meter running, Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    sampler.shutdown();
    processor.stop();
    // Worker drops the update sender on stop, which lets the sink drain
    let _ = sink.await;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
