//! Peer work provider: answers from sibling components.
//!
//! The session asks a [`PeerWorkProvider`] for peer answers once, when a
//! trial starts. The host may deliver that data at any time (including
//! before the first start, or never), so absence is an ordinary result.

use carrot_types::{ComponentRef, ComponentState, ContextSnapshot, InboundMessage, PeerAnswer, PeerWorkBundle};
use tracing::debug;

/// Source of student work from sibling components.
pub trait PeerWorkProvider {
    /// Look up the saved work of one component, if the host has sent it.
    fn peer_work(&self, target: &ComponentRef) -> Option<&ComponentState>;

    /// Accept an inbound host message. Providers that do not cache host
    /// data ignore it.
    fn receive(&mut self, _message: &InboundMessage) {}

    /// Whether the host has delivered any peer work yet. Providers that do
    /// not depend on host deliveries always have data.
    fn has_data(&self) -> bool {
        true
    }

    /// Capture the answers of the given components as a trial context.
    ///
    /// Components without work, or whose work has no answer, are omitted.
    fn capture(&self, targets: &[ComponentRef]) -> ContextSnapshot {
        let answers = targets
            .iter()
            .filter_map(|target| {
                let lines = self.peer_work(target)?.answer_lines();
                (!lines.is_empty()).then(|| PeerAnswer {
                    node_id: target.node_id.clone(),
                    component_id: target.component_id.clone(),
                    lines,
                })
            })
            .collect();
        ContextSnapshot { answers }
    }
}

/// In-memory cache of the most recent peer work the host delivered.
#[derive(Debug, Clone, Default)]
pub struct PeerWorkStore {
    this_node: Vec<ComponentState>,
    other_components: Vec<ComponentState>,
    updates: u64,
}

impl PeerWorkStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            this_node: Vec::new(),
            other_components: Vec::new(),
            updates: 0,
        }
    }

    /// Replace the cached work with a fresh bundle.
    pub fn replace(&mut self, bundle: &PeerWorkBundle) {
        self.this_node.clone_from(&bundle.student_work_from_this_node);
        self.other_components
            .clone_from(&bundle.student_work_from_other_components);
        self.updates = self.updates.saturating_add(1);
        debug!(
            this_node = self.this_node.len(),
            other_components = self.other_components.len(),
            "peer work updated"
        );
    }

    /// Number of bundles received so far.
    pub const fn updates(&self) -> u64 {
        self.updates
    }
}

impl PeerWorkProvider for PeerWorkStore {
    fn peer_work(&self, target: &ComponentRef) -> Option<&ComponentState> {
        self.this_node
            .iter()
            .find(|s| s.matches(target))
            .or_else(|| self.other_components.iter().find(|s| s.matches(target)))
    }

    fn receive(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::StudentWork(bundle) | InboundMessage::NodeSubmitClicked(bundle) => {
                self.replace(bundle);
            }
            InboundMessage::ComponentStateSaved(_) => {
                debug!("host acknowledged a saved component state");
            }
        }
    }

    fn has_data(&self) -> bool {
        self.updates > 0
    }
}
