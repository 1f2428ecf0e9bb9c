//! Periodic tick drivers.
//!
//! A driver is the session's handle on "call `tick` every N milliseconds".
//! The session owns exactly one driver and is the only caller of
//! [`TickDriver::install`] and [`TickDriver::cancel`]:
//!
//! - `install` is a no-op while a driver is already active, so two periodic
//!   tasks can never run at once.
//! - `cancel` is synchronous and idempotent; it clears the handle before
//!   returning, so a following `install` always starts fresh.
//! - Each install bumps a generation counter. Ticks carry the generation of
//!   the task that produced them, and the session ignores ticks whose
//!   generation is no longer current (a tick can already sit in the command
//!   queue when its task is cancelled).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error};

use crate::runner::SessionCommand;

/// Handle on a cancellable periodic tick source.
pub trait TickDriver {
    /// Start firing ticks. Returns the generation of the active driver.
    ///
    /// Does nothing (and returns the current generation) if already active.
    fn install(&mut self) -> u64;

    /// Stop firing ticks. Does nothing if not active.
    fn cancel(&mut self);

    /// Whether a periodic source is currently installed.
    fn is_active(&self) -> bool;

    /// Generation of the most recent install.
    fn generation(&self) -> u64;

    /// Whether a tick stamped with `generation` comes from the live driver.
    fn accepts(&self, generation: u64) -> bool {
        self.is_active() && self.generation() == generation
    }
}

/// A driver with no timer. The owner calls `Session::tick` directly.
///
/// Tracks install and cancel calls so tests can assert on driver hygiene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualDriver {
    active: bool,
    generation: u64,
    installs: u64,
    cancels: u64,
}

impl ManualDriver {
    /// An inactive driver.
    pub const fn new() -> Self {
        Self {
            active: false,
            generation: 0,
            installs: 0,
            cancels: 0,
        }
    }

    /// Number of installs that actually started a driver.
    pub const fn installs(&self) -> u64 {
        self.installs
    }

    /// Number of cancels that actually stopped a driver.
    pub const fn cancels(&self) -> u64 {
        self.cancels
    }
}

impl TickDriver for ManualDriver {
    fn install(&mut self) -> u64 {
        if !self.active {
            self.active = true;
            self.generation = self.generation.saturating_add(1);
            self.installs = self.installs.saturating_add(1);
        }
        self.generation
    }

    fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.cancels = self.cancels.saturating_add(1);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// A Tokio task that sends [`SessionCommand::Tick`] once per period.
///
/// The first tick fires one full period after install, matching a
/// `setInterval`-style timer. Must be installed from within a Tokio runtime;
/// outside one the install is refused and logged.
#[derive(Debug)]
pub struct IntervalDriver {
    period: Duration,
    commands: mpsc::UnboundedSender<SessionCommand>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalDriver {
    /// Create an inactive driver that will feed `commands`.
    pub const fn new(period: Duration, commands: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self {
            period,
            commands,
            handle: None,
            generation: 0,
        }
    }

    /// Tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl TickDriver for IntervalDriver {
    fn install(&mut self) -> u64 {
        if self.handle.is_some() {
            return self.generation;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "cannot install tick driver outside a Tokio runtime");
                return self.generation;
            }
        };

        self.generation = self.generation.saturating_add(1);
        let generation = self.generation;
        let period = self.period;
        let commands = self.commands.clone();

        self.handle = Some(runtime.spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if commands.send(SessionCommand::Tick { generation }).is_err() {
                    debug!(generation, "session gone, tick driver exiting");
                    break;
                }
            }
        }));
        debug!(generation, period_ms = period.as_millis(), "tick driver installed");
        generation
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(generation = self.generation, "tick driver cancelled");
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for IntervalDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
