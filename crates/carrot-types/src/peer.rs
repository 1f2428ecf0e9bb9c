//! Student work from sibling components on the authoring platform.
//!
//! The host delivers these payloads whenever it likes. Only the fields the
//! simulation reads are modelled; anything else in the payload is ignored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Address of a sibling component whose answers give a trial its context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ComponentRef {
    /// Node (step) identifier.
    pub node_id: String,
    /// Component identifier within the node.
    pub component_id: String,
}

impl ComponentRef {
    /// Build a reference from string slices.
    pub fn new(node_id: &str, component_id: &str) -> Self {
        Self {
            node_id: node_id.to_owned(),
            component_id: component_id.to_owned(),
        }
    }
}

/// A choice the student selected in a multiple-choice component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StudentChoice {
    /// Choice identifier, when the host sends one.
    #[serde(default)]
    pub id: Option<String>,
    /// Choice text shown to the student.
    pub text: String,
}

/// The answer part of a component state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StudentData {
    /// Free-text answer of an open-response component.
    #[serde(default)]
    pub response: Option<String>,
    /// Selected choices of a multiple-choice component.
    #[serde(default)]
    pub student_choices: Option<Vec<StudentChoice>>,
}

/// Saved work of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ComponentState {
    /// Node the component lives in.
    pub node_id: String,
    /// The component.
    pub component_id: String,
    /// The student's answer, absent when nothing was submitted.
    #[serde(default)]
    pub student_data: Option<StudentData>,
}

impl ComponentState {
    /// Whether this state belongs to the referenced component.
    pub fn matches(&self, target: &ComponentRef) -> bool {
        self.node_id == target.node_id && self.component_id == target.component_id
    }

    /// The free-text response followed by each chosen option text.
    ///
    /// Empty responses are skipped.
    pub fn answer_lines(&self) -> Vec<String> {
        let Some(data) = &self.student_data else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        if let Some(response) = data.response.as_ref().filter(|r| !r.is_empty()) {
            lines.push(response.clone());
        }
        if let Some(choices) = &data.student_choices {
            lines.extend(choices.iter().map(|c| c.text.clone()));
        }
        lines
    }
}
