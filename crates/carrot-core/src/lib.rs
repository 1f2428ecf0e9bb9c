//! Simulation engine for the carrot growth model.
//!
//! A learner grows a carrot plant for up to a fixed number of weeks, switching
//! the light on and off. Each week the plant makes glucose if lit and always
//! spends some; a dark week that empties the store kills the plant. Every run
//! is recorded as a trial and handed to the hosting page.
//!
//! # Modules
//!
//! - [`bridge`] -- [`HostBridge`] trait for saving trials and requesting peer
//!   work, with null, recording and channel implementations.
//! - [`clock`] -- Week counter bounded by the configured maximum.
//! - [`config`] -- Configuration loading from `carrot-config.yaml`.
//! - [`driver`] -- [`TickDriver`] trait with a manual driver and a Tokio
//!   interval driver.
//! - [`glucose`] -- The weekly glucose ledger update.
//! - [`growth`] -- Leaf and carrot stages derived from the light history.
//! - [`peers`] -- [`PeerWorkProvider`] trait and the in-memory peer-work store.
//! - [`recorder`] -- Open trial and append-only trial history.
//! - [`runner`] -- Async command loop that owns a session.
//! - [`session`] -- The lifecycle state machine.
//!
//! [`HostBridge`]: bridge::HostBridge
//! [`TickDriver`]: driver::TickDriver
//! [`PeerWorkProvider`]: peers::PeerWorkProvider

pub mod bridge;
pub mod clock;
pub mod config;
pub mod driver;
pub mod glucose;
pub mod growth;
pub mod peers;
pub mod recorder;
pub mod runner;
pub mod session;

pub use bridge::{BridgeError, ChannelBridge, HostBridge, NullBridge, RecordingBridge};
pub use config::{ConfigError, ModelConfig};
pub use driver::{IntervalDriver, ManualDriver, TickDriver};
pub use peers::{PeerWorkProvider, PeerWorkStore};
pub use runner::{SessionCommand, SessionSummary, TickCallback, run_session};
pub use session::{LearnerAction, Session, TickOutcome};
