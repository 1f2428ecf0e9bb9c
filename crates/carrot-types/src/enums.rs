//! Enumeration types for the carrot growth simulation.
//!
//! The session state is the product of three independent enums:
//! [`RunState`] x [`TerminationState`] x [`LightState`]. Everything else the
//! presentation layer needs (button labels, enablement) is derived from them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// The light source toggled by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum LightState {
    /// The lamp is lit; the plant photosynthesizes and creates glucose.
    #[default]
    On,
    /// The lamp is dark; the plant only consumes glucose.
    Off,
}

impl LightState {
    /// Whether the light is on.
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Colour of the chart plot band for a week spent in this light state.
    pub const fn plot_band_color(self) -> &'static str {
        match self {
            Self::On => "#fff9a5",
            Self::Off => "#dddddd",
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Whether the periodic tick driver is running.
///
/// `Stopped` and `Paused` both have no active driver. They differ only in
/// which operation the start button maps to (start vs resume).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum RunState {
    /// Fresh session or freshly reset; the start button reads "Start".
    #[default]
    Stopped,
    /// The tick driver is installed and weeks advance.
    Running,
    /// Halted mid-trial; the start button reads "Resume".
    Paused,
}

/// Whether the current trial can still advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum TerminationState {
    /// The trial is live.
    #[default]
    Active,
    /// Stored glucose reached zero during a dark week.
    PlantDied,
    /// The clock ran past the last simulated week.
    TimeEnded,
}

impl TerminationState {
    /// Whether the trial is still live.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Label shown on the tri-state start button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum StartButtonLabel {
    /// Pressing starts a new run.
    Start,
    /// Pressing pauses the running simulation.
    Pause,
    /// Pressing resumes a paused simulation.
    Resume,
}

impl StartButtonLabel {
    /// Label text as displayed on the button.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
        }
    }
}

// ---------------------------------------------------------------------------
// Trial log
// ---------------------------------------------------------------------------

/// Name of an event appended to a trial log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum EventName {
    /// The learner started the simulation.
    StartButtonClicked,
    /// The learner paused the simulation.
    PauseButtonClicked,
    /// The learner resumed a paused simulation.
    ResumeButtonClicked,
    /// The learner switched the light on.
    TurnLightOnButtonClicked,
    /// The learner switched the light off.
    TurnLightOffButtonClicked,
    /// The learner reset the simulation.
    ResetButtonClicked,
    /// The plant ran out of stored glucose.
    PlantDied,
    /// The last simulated week passed.
    SimulationEnded,
}

impl EventName {
    /// Wire name of the event.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartButtonClicked => "startButtonClicked",
            Self::PauseButtonClicked => "pauseButtonClicked",
            Self::ResumeButtonClicked => "resumeButtonClicked",
            Self::TurnLightOnButtonClicked => "turnLightOnButtonClicked",
            Self::TurnLightOffButtonClicked => "turnLightOffButtonClicked",
            Self::ResetButtonClicked => "resetButtonClicked",
            Self::PlantDied => "plantDied",
            Self::SimulationEnded => "simulationEnded",
        }
    }
}

impl core::fmt::Display for EventName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finalized trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum TrialOutcome {
    /// The plant died.
    PlantDied,
    /// The simulation reached its last week.
    TimeEnded,
    /// The learner reset before the trial terminated on its own.
    Reset,
}
