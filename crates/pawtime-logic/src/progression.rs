//! Experience accumulation and leveling.
//!
//! Experience is uncapped. Leaving level `n` costs `n * exp_per_level`,
//! and the remainder carries over. A single large award can cross several
//! levels at once; each level crossed grants a flat restoration to every
//! core attribute.

use crate::config::ProgressionConfig;
use crate::pet::Pet;

/// Experience required to leave `level`.
pub fn required_for(level: u32, cfg: &ProgressionConfig) -> f64 {
    f64::from(level.max(1)) * cfg.exp_per_level
}

/// Add experience and resolve any level-ups. Returns the number of levels
/// gained. Negative or non-finite amounts are ignored.
pub fn add_experience(pet: &mut Pet, amount: f64, cfg: &ProgressionConfig) -> u32 {
    if amount.is_finite() && amount > 0.0 {
        pet.experience += amount;
    }
    check_level_up(pet, cfg)
}

/// Consume experience into levels while the threshold is met.
pub fn check_level_up(pet: &mut Pet, cfg: &ProgressionConfig) -> u32 {
    if cfg.exp_per_level <= 0.0 {
        return 0;
    }

    let mut gained = 0;
    loop {
        let required = required_for(pet.level, cfg);
        if pet.experience < required {
            break;
        }
        pet.experience -= required;
        pet.level += 1;
        pet.attributes.restore_all(cfg.level_up_restore);
        gained += 1;
    }

    if gained > 0 {
        log::info!("{} reached level {} (+{})", pet.name, pet.level, gained);
    }
    gained
}
