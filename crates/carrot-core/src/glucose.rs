//! Glucose accounting model.
//!
//! One call to [`GlucoseModel::tick`] is one simulated week:
//!
//! ```text
//! created' = created + created_per_week   (light on)
//! created' = created                      (light off)
//! used'    = used + used_per_week         (always)
//! stored'  = created' - used'
//! ```
//!
//! The model is pure. It never clamps `stored`; a non-positive value after a
//! dark week is how the session detects that the plant died. Arithmetic
//! saturates at `i32` bounds rather than wrapping.

use carrot_types::GlucoseState;

use crate::config::GlucoseConfig;

/// Fixed linear-increment glucose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlucoseModel {
    initial: GlucoseState,
    created_per_week: i32,
    used_per_week: i32,
}

impl GlucoseModel {
    /// Build the model from configuration.
    pub const fn new(config: &GlucoseConfig) -> Self {
        Self {
            initial: config.initial_state(),
            created_per_week: config.created_per_week,
            used_per_week: config.used_per_week,
        }
    }

    /// The week-0 ledger.
    pub const fn initial(&self) -> GlucoseState {
        self.initial
    }

    /// Advance the ledger by one week.
    pub const fn tick(&self, state: GlucoseState, light_on: bool) -> GlucoseState {
        let created = if light_on {
            state.created.saturating_add(self.created_per_week)
        } else {
            state.created
        };
        let used = state.used.saturating_add(self.used_per_week);
        GlucoseState::from_totals(created, used)
    }
}

impl Default for GlucoseModel {
    fn default() -> Self {
        Self::new(&GlucoseConfig::default())
    }
}
