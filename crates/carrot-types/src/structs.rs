//! Core data structs: glucose accounting values, trial logs, and the
//! read-only snapshot handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventName, LightState, RunState, StartButtonLabel, TerminationState, TrialOutcome};
use crate::ids::TrialId;

// ---------------------------------------------------------------------------
// Glucose
// ---------------------------------------------------------------------------

/// The plant's simplified photosynthesis ledger.
///
/// `stored` is always `created - used`. It may go negative; a non-positive
/// value on a dark week is the death signal, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GlucoseState {
    /// Total glucose produced by photosynthesis so far.
    pub created: i32,
    /// Total glucose consumed by the plant so far.
    pub used: i32,
    /// Glucose remaining in the root.
    pub stored: i32,
}

impl GlucoseState {
    /// Build a state from created and used totals, deriving `stored`.
    pub const fn from_totals(created: i32, used: i32) -> Self {
        Self {
            created,
            used,
            stored: created.saturating_sub(used),
        }
    }
}

/// One `(week, value)` point of a glucose series.
///
/// Serializes as a two-element array so the host can feed it straight into
/// a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeriesPoint(pub u32, pub i32);

impl SeriesPoint {
    /// The week this point belongs to.
    pub const fn week(self) -> u32 {
        self.0
    }

    /// The glucose amount at that week.
    pub const fn value(self) -> i32 {
        self.1
    }
}

// ---------------------------------------------------------------------------
// Trial log
// ---------------------------------------------------------------------------

/// A timestamped learner or simulation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TrialEvent {
    /// What happened.
    pub name: EventName,
    /// Wall-clock time in epoch milliseconds.
    pub timestamp: i64,
}

/// A peer component's answer captured when a trial starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PeerAnswer {
    /// Node holding the peer component.
    pub node_id: String,
    /// The peer component.
    pub component_id: String,
    /// Free-text response followed by chosen option texts.
    pub lines: Vec<String>,
}

/// Read-only copy of peer answers attached to a trial for audit.
///
/// Components without submitted work are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ContextSnapshot {
    /// Answers in configured component order.
    pub answers: Vec<PeerAnswer>,
}

impl ContextSnapshot {
    /// Whether no peer component had any answer.
    pub fn is_empty(&self) -> bool {
        self.answers.iter().all(|a| a.lines.is_empty())
    }

    /// All answer lines joined with newlines, in component order.
    pub fn text(&self) -> String {
        self.answers
            .iter()
            .flat_map(|a| a.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One run of the simulation from start to termination or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Trial {
    /// Trial identifier.
    pub id: TrialId,
    /// Cumulative glucose created per week, seeded with week 0.
    pub created_series: Vec<SeriesPoint>,
    /// Cumulative glucose used per week, seeded with week 0.
    pub used_series: Vec<SeriesPoint>,
    /// Glucose stored per week, seeded with week 0.
    pub stored_series: Vec<SeriesPoint>,
    /// Learner and simulation events in order.
    pub events: Vec<TrialEvent>,
    /// Peer answers captured when the trial started.
    pub context: ContextSnapshot,
    /// When the trial buffer was opened.
    pub opened_at: DateTime<Utc>,
    /// When the learner first started this trial.
    pub started_at: Option<DateTime<Utc>>,
    /// When the trial was closed.
    pub finalized_at: Option<DateTime<Utc>>,
    /// How the trial ended, once closed.
    pub outcome: Option<TrialOutcome>,
}

impl Trial {
    /// Create an unstarted trial whose series hold only the week-0 seed.
    pub fn seeded(initial: GlucoseState) -> Self {
        Self {
            id: TrialId::new(),
            created_series: vec![SeriesPoint(0, initial.created)],
            used_series: vec![SeriesPoint(0, initial.used)],
            stored_series: vec![SeriesPoint(0, initial.stored)],
            events: Vec::new(),
            context: ContextSnapshot::default(),
            opened_at: Utc::now(),
            started_at: None,
            finalized_at: None,
            outcome: None,
        }
    }

    /// Number of points in each series (ticks applied plus the seed).
    pub fn sample_count(&self) -> usize {
        self.created_series.len()
    }

    /// Whether the learner has started this trial.
    pub const fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether the trial has been closed.
    pub const fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    /// The most recent stored-glucose point.
    pub fn last_stored(&self) -> Option<SeriesPoint> {
        self.stored_series.last().copied()
    }

    /// Event names in order, without timestamps.
    pub fn event_names(&self) -> Vec<EventName> {
        self.events.iter().map(|e| e.name).collect()
    }
}

// ---------------------------------------------------------------------------
// Presentation view
// ---------------------------------------------------------------------------

/// Visible growth of the plant derived from the weekly light history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GrowthStage {
    /// +1 per lit week, -1 per dark week.
    pub glucose_index: i32,
    /// Number of leaves to display.
    pub leaves: u32,
    /// Carrot image to display (1-based); 0 shows no carrot.
    pub carrot_stage: u32,
}

/// Chart background band for one simulated week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlotBand {
    /// Band start (previous week).
    pub from: u32,
    /// Band end (this week).
    pub to: u32,
    /// Light state during the week.
    pub light: LightState,
}

/// Button enablement derived from session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Controls {
    /// Which operation the start button performs.
    pub start_label: StartButtonLabel,
    /// Whether the start button accepts presses.
    pub start_enabled: bool,
    /// Whether "Turn Light ON" accepts presses.
    pub light_on_enabled: bool,
    /// Whether "Turn Light OFF" accepts presses.
    pub light_off_enabled: bool,
    /// Whether "Reset" accepts presses.
    pub reset_enabled: bool,
}

/// Everything the presentation layer renders, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SessionSnapshot {
    /// Current simulated week.
    pub week: u32,
    /// Last simulated week.
    pub max_weeks: u32,
    /// Current glucose ledger.
    pub glucose: GlucoseState,
    /// Current light state.
    pub light: LightState,
    /// Whether the tick driver runs.
    pub run_state: RunState,
    /// Whether the trial is still live.
    pub termination: TerminationState,
    /// Derived button enablement.
    pub controls: Controls,
    /// Derived plant growth.
    pub growth: GrowthStage,
    /// Number of closed trials in the history.
    pub trial_count: usize,
    /// The open trial, if any.
    pub open_trial: Option<TrialId>,
}
