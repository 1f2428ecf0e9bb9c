//! Shared type definitions for the carrot growth simulation.
//!
//! Every type that crosses the boundary to the hosting page lives here and
//! is exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Light, run, termination and event enums
//! - [`structs`] -- Glucose ledger, trial log and presentation snapshot
//! - [`peer`] -- Student work from sibling components
//! - [`messages`] -- Typed inbound/outbound host messages

pub mod enums;
pub mod ids;
pub mod messages;
pub mod peer;
pub mod structs;

pub use enums::{EventName, LightState, RunState, StartButtonLabel, TerminationState, TrialOutcome};
pub use ids::TrialId;
pub use messages::{InboundMessage, OutboundMessage, PeerWorkBundle, SavedComponentState, TrialSave};
pub use peer::{ComponentRef, ComponentState, StudentChoice, StudentData};
pub use structs::{
    ContextSnapshot, Controls, GlucoseState, GrowthStage, PeerAnswer, PlotBand, SeriesPoint,
    SessionSnapshot, Trial, TrialEvent,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the hosting page.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::TrialId::export_all();

        let _ = crate::enums::LightState::export_all();
        let _ = crate::enums::RunState::export_all();
        let _ = crate::enums::TerminationState::export_all();
        let _ = crate::enums::StartButtonLabel::export_all();
        let _ = crate::enums::EventName::export_all();
        let _ = crate::enums::TrialOutcome::export_all();

        let _ = crate::structs::Trial::export_all();
        let _ = crate::structs::SessionSnapshot::export_all();
        let _ = crate::structs::PlotBand::export_all();

        let _ = crate::messages::InboundMessage::export_all();
        let _ = crate::messages::OutboundMessage::export_all();
    }
}
