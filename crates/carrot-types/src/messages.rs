//! Typed messages exchanged with the hosting page.
//!
//! Both directions are tagged by a `messageType` field. How the messages are
//! carried (frames, sockets, pipes) is up to the bridge implementation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::peer::ComponentState;
use crate::structs::Trial;

/// Peer work delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PeerWorkBundle {
    /// Work from other components on the same node.
    #[serde(default)]
    pub student_work_from_this_node: Vec<ComponentState>,
    /// Work from components on other nodes.
    #[serde(default)]
    pub student_work_from_other_components: Vec<ComponentState>,
}

/// Acknowledgement of a component state the host has stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SavedComponentState {
    /// The stored state as the host echoed it.
    pub component_state: serde_json::Value,
}

/// Messages the host sends to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "messageType", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum InboundMessage {
    /// Reply to [`OutboundMessage::GetStudentWork`].
    StudentWork(PeerWorkBundle),
    /// The student pressed the node's submit button; carries fresh work.
    NodeSubmitClicked(PeerWorkBundle),
    /// The host stored a component state.
    ComponentStateSaved(SavedComponentState),
}

/// A trial wrapped as a component state for saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TrialSave {
    /// Saved automatically rather than by the student.
    pub is_auto_save: bool,
    /// Counts as a submission.
    pub is_submit: bool,
    /// The trial log.
    pub student_data: Trial,
}

impl TrialSave {
    /// Wrap a finalized trial as a plain (non-auto, non-submit) save.
    pub const fn new(trial: Trial) -> Self {
        Self {
            is_auto_save: false,
            is_submit: false,
            student_data: trial,
        }
    }
}

/// Messages the simulation sends to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "messageType", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum OutboundMessage {
    /// Ask for peer work; the reply arrives as [`InboundMessage::StudentWork`].
    GetStudentWork,
    /// Persist a finalized trial.
    StudentWork(Box<TrialSave>),
    /// Ask the host to save the node.
    SaveButtonClicked,
}
