//! Command loop that owns a session for its whole lifetime.
//!
//! Every input reaches the session through one channel of
//! [`SessionCommand`]s, so learner actions, host messages and timer ticks
//! are applied strictly one at a time. [`run_session`] returns when it
//! receives [`SessionCommand::Shutdown`] or when every sender is gone.

use carrot_types::{InboundMessage, SessionSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::HostBridge;
use crate::driver::TickDriver;
use crate::peers::PeerWorkProvider;
use crate::session::{LearnerAction, Session, TickOutcome};

/// One input to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// A button press.
    Learner(LearnerAction),
    /// A message from the hosting page.
    Host(InboundMessage),
    /// A timer tick stamped with the driver generation that produced it.
    Tick {
        /// Generation of the driver that fired.
        generation: u64,
    },
    /// Stop the loop.
    Shutdown,
}

/// Why [`run_session`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEndReason {
    /// A [`SessionCommand::Shutdown`] was received.
    Shutdown,
    /// Every sender was dropped.
    ChannelClosed,
}

/// Result of a session loop.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Why the loop stopped.
    pub end_reason: LoopEndReason,
    /// Commands received, including ignored ones.
    pub commands: u64,
    /// Ticks that advanced the clock or ended a trial.
    pub ticks_applied: u64,
    /// Trials finalized and kept over the whole session.
    pub trials_recorded: usize,
    /// State when the loop stopped.
    pub final_snapshot: SessionSnapshot,
}

/// Callback invoked after each applied tick.
///
/// The presentation layer uses this to redraw the chart and the plant.
pub trait TickCallback: Send {
    /// Called after a tick that changed the session.
    fn on_tick(&mut self, outcome: &TickOutcome, snapshot: &SessionSnapshot);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _outcome: &TickOutcome, _snapshot: &SessionSnapshot) {}
}

/// Apply commands to `session` until shutdown.
///
/// The driver is cancelled before returning so no timer outlives the loop.
pub async fn run_session<H, P, D>(
    session: &mut Session<H, P, D>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    callback: &mut dyn TickCallback,
) -> SessionSummary
where
    H: HostBridge,
    P: PeerWorkProvider,
    D: TickDriver,
{
    let mut received: u64 = 0;
    let mut ticks_applied: u64 = 0;

    info!(week = session.week(), "session loop starting");

    let end_reason = loop {
        let Some(command) = commands.recv().await else {
            break LoopEndReason::ChannelClosed;
        };
        received = received.saturating_add(1);

        match command {
            SessionCommand::Learner(action) => {
                let applied = session.apply(action);
                debug!(?action, applied, "learner action");
            }
            SessionCommand::Host(message) => session.receive(&message),
            SessionCommand::Tick { generation } => {
                let outcome = session.on_driver_tick(generation);
                if outcome.is_applied() {
                    ticks_applied = ticks_applied.saturating_add(1);
                    callback.on_tick(&outcome, &session.snapshot());
                }
            }
            SessionCommand::Shutdown => break LoopEndReason::Shutdown,
        }
    };

    if session.pause() {
        debug!("running session paused on shutdown");
    }

    SessionSummary {
        end_reason,
        commands: received,
        ticks_applied,
        trials_recorded: session.history().len(),
        final_snapshot: session.snapshot(),
    }
}

/// Log the end of a session loop.
pub fn log_session_end(summary: &SessionSummary) {
    let snapshot = &summary.final_snapshot;
    info!(
        reason = ?summary.end_reason,
        commands = summary.commands,
        ticks_applied = summary.ticks_applied,
        trials_recorded = summary.trials_recorded,
        "Session ended"
    );
    if summary.ticks_applied == 0 {
        warn!("Session ended with no weeks simulated");
    } else {
        info!(
            week = snapshot.week,
            stored = snapshot.glucose.stored,
            termination = ?snapshot.termination,
            "Final session state"
        );
    }
}
