//! Trial recorder: the event log and glucose series of each run.
//!
//! At most one trial is open at a time. The open trial collects events from
//! the moment it is opened (construction or reset), but only a trial that
//! the learner actually started is kept when it is finalized. Closed trials
//! go into an append-only history that is only ever handed out as a shared
//! slice, so a finalized trial is never mutated again.

use carrot_types::{ContextSnapshot, EventName, GlucoseState, SeriesPoint, Trial, TrialEvent, TrialId, TrialOutcome};
use chrono::Utc;
use tracing::debug;

/// Owner of the open trial and the closed-trial history.
#[derive(Debug, Clone, Default)]
pub struct TrialRecorder {
    open: Option<Trial>,
    history: Vec<Trial>,
}

impl TrialRecorder {
    /// Create a recorder with no open trial and an empty history.
    pub const fn new() -> Self {
        Self {
            open: None,
            history: Vec::new(),
        }
    }

    /// Open a fresh trial seeded with the week-0 ledger.
    ///
    /// Any unfinalized open trial is discarded. The context is normally
    /// empty here and attached later by [`mark_started`](Self::mark_started).
    pub fn open_new_trial(&mut self, initial: GlucoseState, context: ContextSnapshot) -> TrialId {
        if let Some(previous) = self.open.take() {
            debug!(trial = %previous.id, "discarding unfinalized trial");
        }
        let mut trial = Trial::seeded(initial);
        trial.context = context;
        let id = trial.id;
        self.open = Some(trial);
        id
    }

    /// Mark the open trial as started and attach its context snapshot.
    ///
    /// Returns `false` when no trial is open or it was already started.
    pub fn mark_started(&mut self, context: ContextSnapshot) -> bool {
        match self.open.as_mut() {
            Some(trial) if !trial.is_started() => {
                trial.context = context;
                trial.started_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Append a timestamped event to the open trial.
    ///
    /// Does nothing when no trial is open.
    pub fn record_event(&mut self, name: EventName) {
        if let Some(trial) = self.open.as_mut() {
            trial.events.push(TrialEvent {
                name,
                timestamp: Utc::now().timestamp_millis(),
            });
        }
    }

    /// Append one point to each glucose series of the open trial.
    ///
    /// Does nothing when no trial is open.
    pub fn record_sample(&mut self, week: u32, glucose: GlucoseState) {
        if let Some(trial) = self.open.as_mut() {
            trial.created_series.push(SeriesPoint(week, glucose.created));
            trial.used_series.push(SeriesPoint(week, glucose.used));
            trial.stored_series.push(SeriesPoint(week, glucose.stored));
        }
    }

    /// Close the open trial.
    ///
    /// A started trial is stamped with its outcome, appended to the history
    /// and returned so it can be persisted. A trial that was never started is
    /// dropped and `None` is returned. With no open trial this is a no-op.
    pub fn finalize_trial(&mut self, outcome: TrialOutcome) -> Option<&Trial> {
        let mut trial = self.open.take()?;
        if !trial.is_started() {
            debug!(trial = %trial.id, "dropping trial that was never started");
            return None;
        }
        trial.finalized_at = Some(Utc::now());
        trial.outcome = Some(outcome);
        self.history.push(trial);
        self.history.last()
    }

    /// The open trial if any, otherwise the most recently closed one.
    pub fn export_open_or_last_trial(&self) -> Option<&Trial> {
        self.open.as_ref().or_else(|| self.history.last())
    }

    /// The open trial, if any.
    pub const fn open_trial(&self) -> Option<&Trial> {
        self.open.as_ref()
    }

    /// Whether a trial is open.
    pub const fn has_open_trial(&self) -> bool {
        self.open.is_some()
    }

    /// Closed trials, oldest first.
    pub fn history(&self) -> &[Trial] {
        &self.history
    }
}
