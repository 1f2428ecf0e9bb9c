//! Stdout output: host messages and per-week snapshots as JSON lines.
//!
//! A single writer task owns stdout. Host messages from the
//! [`ChannelBridge`](carrot_core::ChannelBridge) and snapshots from the
//! [`SnapshotCallback`] are funnelled into one channel so lines never
//! interleave.

use carrot_core::session::TickOutcome;
use carrot_core::TickCallback;
use carrot_types::{OutboundMessage, PlotBand, SessionSnapshot};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::EngineError;

/// One stdout line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum EngineOutput {
    /// A message for the hosting page.
    Host(OutboundMessage),
    /// Session state after an applied week.
    Week {
        /// Chart band for the week, absent when the clock ran out.
        band: Option<PlotBand>,
        /// Background colour of the band.
        #[serde(rename = "bandColor")]
        band_color: Option<&'static str>,
        /// Full session state.
        snapshot: Box<SessionSnapshot>,
    },
}

/// Tick callback that emits a snapshot line per applied week.
pub struct SnapshotCallback {
    output: mpsc::UnboundedSender<EngineOutput>,
}

impl SnapshotCallback {
    /// Create a callback feeding the stdout writer.
    pub const fn new(output: mpsc::UnboundedSender<EngineOutput>) -> Self {
        Self { output }
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, outcome: &TickOutcome, snapshot: &SessionSnapshot) {
        let band = match *outcome {
            TickOutcome::Advanced { band, .. } | TickOutcome::PlantDied { band, .. } => Some(band),
            TickOutcome::TimeEnded { .. } | TickOutcome::Ignored => None,
        };
        match *outcome {
            TickOutcome::PlantDied { week, .. } => info!(week, "The plant has died"),
            TickOutcome::TimeEnded { week } => info!(week, "The simulation has ended"),
            TickOutcome::Advanced { .. } | TickOutcome::Ignored => {}
        }
        let line = EngineOutput::Week {
            band,
            band_color: band.map(|b| b.light.plot_band_color()),
            snapshot: Box::new(snapshot.clone()),
        };
        if self.output.send(line).is_err() {
            debug!(week = snapshot.week, "stdout writer gone, snapshot dropped");
        }
    }
}

/// Wrap every host message from the bridge as an output line.
pub async fn forward_host(
    mut host: mpsc::UnboundedReceiver<OutboundMessage>,
    output: mpsc::UnboundedSender<EngineOutput>,
) {
    while let Some(message) = host.recv().await {
        if output.send(EngineOutput::Host(message)).is_err() {
            break;
        }
    }
}

/// Write output lines to stdout until every sender is dropped.
///
/// # Errors
///
/// Returns [`EngineError`] if a line cannot be serialized or written.
pub async fn write_lines(mut lines: mpsc::UnboundedReceiver<EngineOutput>) -> Result<(), EngineError> {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.recv().await {
        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');
        stdout.write_all(&bytes).await?;
        stdout.flush().await?;
    }
    Ok(())
}
