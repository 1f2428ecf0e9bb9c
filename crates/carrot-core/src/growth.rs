//! Plant growth derived from the weekly light history.
//!
//! The presentation layer shows leaves and a carrot image. Both follow a
//! glucose index that rises on lit weeks and falls on dark ones:
//!
//! - leaves shown = `floor((index + 1) / 2)`, clamped to `0..=MAX_LEAVES`
//! - carrot stage = `floor(index / 2) + 1`, clamped to `0..=CARROT_STAGES`,
//!   and only re-evaluated on lit weeks; stage 0 hides every carrot image
//!
//! Before the first week a single leaf is shown. A dead plant shows none.

use carrot_types::{GrowthStage, LightState};

/// Number of leaf sprites on the plant.
pub const MAX_LEAVES: u32 = 9;

/// Number of carrot images, smallest first.
pub const CARROT_STAGES: u32 = 6;

/// Growth tracker updated once per applied week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantGrowth {
    stage: GrowthStage,
}

impl PlantGrowth {
    /// A seedling: one leaf, smallest carrot.
    pub const fn new() -> Self {
        Self {
            stage: GrowthStage {
                glucose_index: 0,
                leaves: 1,
                carrot_stage: 1,
            },
        }
    }

    /// Record one simulated week.
    pub fn record_week(&mut self, light: LightState) {
        let index = match light {
            LightState::On => self.stage.glucose_index.saturating_add(1),
            LightState::Off => self.stage.glucose_index.saturating_sub(1),
        };
        self.stage.glucose_index = index;
        self.stage.leaves = leaves_for(index);
        if light.is_on() {
            self.stage.carrot_stage = carrot_stage_for(index);
        }
    }

    /// Drop every leaf.
    pub const fn wither(&mut self) {
        self.stage.leaves = 0;
    }

    /// Current stage.
    pub const fn stage(&self) -> GrowthStage {
        self.stage
    }
}

impl Default for PlantGrowth {
    fn default() -> Self {
        Self::new()
    }
}

fn leaves_for(index: i32) -> u32 {
    let raw = index.saturating_add(1).div_euclid(2);
    u32::try_from(raw.max(0)).unwrap_or(0).min(MAX_LEAVES)
}

fn carrot_stage_for(index: i32) -> u32 {
    let raw = index.div_euclid(2).saturating_add(1);
    u32::try_from(raw.max(0)).unwrap_or(0).min(CARROT_STAGES)
}
