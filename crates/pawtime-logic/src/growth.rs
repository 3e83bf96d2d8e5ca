//! Growth stages derived from age.
//!
//! The stage is a pure, non-decreasing function of `age`. [`recompute`] is
//! the only place that writes `Pet::growth_stage`; it applies each entered
//! stage's one-time bonus and reports the transition to the caller.

use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::config::GrowthConfig;
use crate::pet::Pet;

/// Discrete life phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrowthStage {
    Puppy,
    Juvenile,
    Adult,
    Senior,
}

impl GrowthStage {
    /// All stages in age order.
    pub const ALL: [GrowthStage; 4] = [
        GrowthStage::Puppy,
        GrowthStage::Juvenile,
        GrowthStage::Adult,
        GrowthStage::Senior,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GrowthStage::Puppy => "幼犬",
            GrowthStage::Juvenile => "青年期",
            GrowthStage::Adult => "成年期",
            GrowthStage::Senior => "老年期",
        }
    }

    fn next(self) -> Option<GrowthStage> {
        match self {
            GrowthStage::Puppy => Some(GrowthStage::Juvenile),
            GrowthStage::Juvenile => Some(GrowthStage::Adult),
            GrowthStage::Adult => Some(GrowthStage::Senior),
            GrowthStage::Senior => None,
        }
    }
}

/// A stage transition reported by [`recompute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthChange {
    pub from: GrowthStage,
    pub to: GrowthStage,
}

/// Map an age in game days to its stage.
pub fn stage_for_age(age: f64, cfg: &GrowthConfig) -> GrowthStage {
    if age.is_nan() || age < cfg.juvenile_at {
        GrowthStage::Puppy
    } else if age < cfg.adult_at {
        GrowthStage::Juvenile
    } else if age < cfg.senior_at {
        GrowthStage::Adult
    } else {
        GrowthStage::Senior
    }
}

/// Age at which the stage after `stage` begins, if there is one.
pub fn next_stage_age(stage: GrowthStage, cfg: &GrowthConfig) -> Option<f64> {
    match stage.next()? {
        GrowthStage::Puppy => None,
        GrowthStage::Juvenile => Some(cfg.juvenile_at),
        GrowthStage::Adult => Some(cfg.adult_at),
        GrowthStage::Senior => Some(cfg.senior_at),
    }
}

/// Energy headroom lost when entering the senior stage.
const SENIOR_ENERGY_DROP: f64 = 20.0;
/// A new senior's energy ends at least this high.
const SENIOR_ENERGY_FLOOR: f64 = 30.0;

fn apply_stage_bonus(pet: &mut Pet, stage: GrowthStage) {
    let attrs = &mut pet.attributes;
    match stage {
        GrowthStage::Puppy => {}
        GrowthStage::Juvenile => {
            attrs.adjust(Attribute::Energy, 10.0);
            attrs.adjust(Attribute::Health, 5.0);
        }
        GrowthStage::Adult => {
            attrs.adjust(Attribute::Energy, 5.0);
            attrs.adjust(Attribute::Health, 10.0);
        }
        GrowthStage::Senior => {
            let lowered = (attrs.energy() - SENIOR_ENERGY_DROP).max(SENIOR_ENERGY_FLOOR);
            attrs.set(Attribute::Energy, lowered);
            attrs.adjust(Attribute::Happiness, 10.0);
        }
    }
}

/// Recompute the stage from `pet.age`.
///
/// Returns `Some` when the stage advanced. When a long catch-up tick
/// crosses several boundaries, every entered stage applies its bonus once,
/// in order. A computed stage below the stored one is ignored, so the
/// stage never regresses.
pub fn recompute(pet: &mut Pet, cfg: &GrowthConfig) -> Option<GrowthChange> {
    let target = stage_for_age(pet.age, cfg);
    let from = pet.growth_stage;
    if target <= from {
        return None;
    }

    let mut stage = from;
    while stage < target {
        let Some(next) = stage.next() else { break };
        apply_stage_bonus(pet, next);
        stage = next;
    }
    pet.growth_stage = stage;

    log::info!(
        "{} grew from {} to {} at {:.1} days",
        pet.name,
        from.label(),
        stage.label(),
        pet.age
    );
    Some(GrowthChange { from, to: stage })
}
