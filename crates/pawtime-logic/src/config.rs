//! Tunable rate table.
//!
//! All constants that shape the simulation live here so a host can load
//! overrides from JSON. Every field has a default, and a partial JSON
//! document only replaces the keys it names.

use serde::{Deserialize, Serialize};

/// Configuration for elapsed-time decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Real seconds per simulated game day (300 = five minutes).
    pub seconds_per_game_day: f64,
    /// Base hunger loss per game day, before breed modifiers.
    pub hunger_per_day: f64,
    /// Base happiness loss per game day, before personality modifiers.
    pub happiness_per_day: f64,
    /// Cleanliness loss per game day.
    pub cleanliness_per_day: f64,
    /// Base energy loss per game day, before personality modifiers.
    pub energy_per_day: f64,
    /// Hunger below which health suffers.
    pub hunger_threshold: f64,
    /// Health lost per day per point of hunger below the threshold.
    pub hunger_penalty: f64,
    /// Cleanliness below which health suffers.
    pub cleanliness_threshold: f64,
    /// Health lost per day per point of cleanliness below the threshold.
    pub cleanliness_penalty: f64,
    /// Happiness below which health suffers.
    pub happiness_threshold: f64,
    /// Health lost per day per point of happiness below the threshold.
    pub happiness_penalty: f64,
    /// Hunger and happiness must both exceed this for health to regenerate.
    pub regen_floor: f64,
    /// Health regained per game day when well fed and happy.
    pub health_regen_per_day: f64,
    /// Energy granted when a sleeping pet wakes.
    pub wake_energy_bonus: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            seconds_per_game_day: 300.0,
            hunger_per_day: 1.0,
            happiness_per_day: 1.5,
            cleanliness_per_day: 0.75,
            energy_per_day: 0.5,
            hunger_threshold: 20.0,
            hunger_penalty: 0.25,
            cleanliness_threshold: 30.0,
            cleanliness_penalty: 0.15,
            happiness_threshold: 20.0,
            happiness_penalty: 0.1,
            regen_floor: 50.0,
            health_regen_per_day: 0.5,
            wake_energy_bonus: 80.0,
        }
    }
}

/// Age boundaries (in game days) between growth stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub juvenile_at: f64,
    pub adult_at: f64,
    pub senior_at: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            juvenile_at: 30.0,
            adult_at: 180.0,
            senior_at: 1095.0,
        }
    }
}

/// Configuration for experience and leveling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience needed to leave level `n` is `n * exp_per_level`.
    pub exp_per_level: f64,
    /// Flat restoration applied to every core attribute on level-up.
    pub level_up_restore: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            exp_per_level: 100.0,
            level_up_restore: 20.0,
        }
    }
}

/// Configuration for skill training odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Success chance when improving a level-1 skill.
    pub improve_base: f64,
    /// Chance lost per level above 1.
    pub improve_step: f64,
    /// Success chance when learning a new skill at pet level 1.
    pub learn_base: f64,
    /// Bonus per pet level above 1 when learning a new skill.
    pub learn_bonus_per_level: f64,
    /// Cap on the pet-level bonus.
    pub learn_bonus_cap: f64,
    /// Chance that playing a game bumps the matching known skill.
    pub play_bump_chance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            improve_base: 0.8,
            improve_step: 0.1,
            learn_base: 0.7,
            learn_bonus_per_level: 0.05,
            learn_bonus_cap: 0.2,
            play_bump_chance: 0.3,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub decay: DecayConfig,
    pub growth: GrowthConfig,
    pub progression: ProgressionConfig,
    pub training: TrainingConfig,
}

impl SimConfig {
    /// Parse a (possibly partial) JSON override document.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
