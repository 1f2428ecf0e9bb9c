//! Host bridge: the outbound half of the contract with the hosting page.
//!
//! The session reports finalized trials and asks for peer work through a
//! [`HostBridge`]. Both calls are fire-and-forget from the session's point
//! of view: a failure is logged and the simulation carries on.
//!
//! Implementations:
//!
//! - [`NullBridge`] -- discards everything (headless runs).
//! - [`RecordingBridge`] -- keeps every message in memory (tests, replay).
//! - [`ChannelBridge`] -- forwards messages to a Tokio channel drained by a
//!   transport task.

use carrot_types::{OutboundMessage, Trial, TrialSave};
use tokio::sync::mpsc;

/// Errors a bridge implementation can report.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The message could not be serialized.
    #[error("failed to serialize host message: {source}")]
    Serialize {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing to the transport failed.
    #[error("host transport I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The receiving side of the transport is gone.
    #[error("host transport closed")]
    Closed,
}

/// Outbound interface to the hosting page.
pub trait HostBridge {
    /// Deliver one message to the host.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the message could not be delivered.
    fn send(&mut self, message: OutboundMessage) -> Result<(), BridgeError>;

    /// Persist a finalized trial.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the save could not be handed off.
    fn persist_trial(&mut self, trial: &Trial) -> Result<(), BridgeError> {
        self.send(OutboundMessage::StudentWork(Box::new(TrialSave::new(
            trial.clone(),
        ))))
    }

    /// Ask the host for peer work. The answer arrives later as an inbound
    /// message.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the request could not be handed off.
    fn request_peer_work(&mut self) -> Result<(), BridgeError> {
        self.send(OutboundMessage::GetStudentWork)
    }

    /// Ask the host to save the whole node, as its save button would.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the request could not be handed off.
    fn request_save(&mut self) -> Result<(), BridgeError> {
        self.send(OutboundMessage::SaveButtonClicked)
    }
}

/// A bridge that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBridge;

impl HostBridge for NullBridge {
    fn send(&mut self, _message: OutboundMessage) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// A bridge that keeps every message it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    sent: Vec<OutboundMessage>,
}

impl RecordingBridge {
    /// An empty recording.
    pub const fn new() -> Self {
        Self { sent: Vec::new() }
    }

    /// Every message in send order.
    pub fn sent(&self) -> &[OutboundMessage] {
        &self.sent
    }

    /// The trials persisted so far, in order.
    pub fn persisted(&self) -> Vec<&Trial> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::StudentWork(save) => Some(&save.student_data),
                OutboundMessage::GetStudentWork | OutboundMessage::SaveButtonClicked => None,
            })
            .collect()
    }

    /// How many peer-work requests were sent.
    pub fn peer_work_requests(&self) -> usize {
        self.sent
            .iter()
            .filter(|m| matches!(m, OutboundMessage::GetStudentWork))
            .count()
    }
}

impl HostBridge for RecordingBridge {
    fn send(&mut self, message: OutboundMessage) -> Result<(), BridgeError> {
        self.sent.push(message);
        Ok(())
    }
}

/// A bridge that forwards messages to a transport task over a channel.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelBridge {
    /// Create a bridge and the receiver its transport task should drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl HostBridge for ChannelBridge {
    fn send(&mut self, message: OutboundMessage) -> Result<(), BridgeError> {
        self.tx.send(message).map_err(|_err| BridgeError::Closed)
    }
}
