//! Headless engine for the carrot growth simulation.
//!
//! Reads learner commands and host messages from stdin, runs one session on
//! a real-time tick driver, and writes host messages and per-week snapshots
//! to stdout as JSON lines. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `carrot-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Start the stdout writer and the host message forwarder
//! 4. Create the session with an interval tick driver
//! 5. Start the stdin reader and the Ctrl-C handler
//! 6. Run the session loop until `quit`, end of input or Ctrl-C
//! 7. Log the result and drain stdout

mod error;
mod input;
mod output;

use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use carrot_core::config::{LoggingConfig, ModelConfig};
use carrot_core::{ChannelBridge, IntervalDriver, PeerWorkStore, Session, SessionCommand, runner};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::output::SnapshotCallback;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        max_weeks = config.simulation.max_weeks,
        tick_interval_ms = config.simulation.tick_interval_ms,
        components = config.context.components.len(),
        "carrot-engine starting"
    );

    // 3. Output plumbing.
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(output::write_lines(out_rx));
    let (bridge, host_rx) = ChannelBridge::new();
    let forwarder = tokio::spawn(output::forward_host(host_rx, out_tx.clone()));

    // 4. Session.
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let driver = IntervalDriver::new(
        Duration::from_millis(config.simulation.tick_interval_ms),
        commands_tx.clone(),
    );
    info!(period = ?driver.period(), "tick driver ready");
    let mut session = Session::new(&config, bridge, PeerWorkStore::new(), driver);

    // 5. Inputs.
    // The reader thread is detached; a pending stdin read must not block exit.
    let _reader = input::spawn_reader(BufReader::new(std::io::stdin()), commands_tx.clone());
    let interrupt = {
        let commands = commands_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
                let _ = commands.send(SessionCommand::Shutdown);
            }
        })
    };
    drop(commands_tx);

    // 6. Run.
    let mut callback = SnapshotCallback::new(out_tx);
    let summary = runner::run_session(&mut session, commands_rx, &mut callback).await;

    // 7. Log and drain.
    runner::log_session_end(&summary);
    interrupt.abort();
    drop(session);
    drop(callback);
    if let Err(e) = forwarder.await {
        warn!(error = %e, "host message forwarder failed");
    }
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "stdout writer failed"),
        Err(e) => warn!(error = %e, "stdout writer task failed"),
    }

    info!(
        trials_recorded = summary.trials_recorded,
        "carrot-engine shutdown complete"
    );
    Ok(())
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the model configuration from `carrot-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<ModelConfig, EngineError> {
    let config_path = Path::new("carrot-config.yaml");
    if config_path.exists() {
        Ok(ModelConfig::from_file(config_path)?)
    } else {
        let mut config = ModelConfig::default();
        config.simulation.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}
