//! Elapsed-time decay.
//!
//! A tick converts elapsed seconds into game days and lowers hunger,
//! happiness, cleanliness and energy linearly. Neglect then costs health;
//! a well fed, happy pet slowly heals instead. Age advances and the growth
//! stage is recomputed.
//!
//! The model assumes nothing about tick granularity. A tick is cut into
//! segments at every moment an attribute crosses a health threshold, hits
//! zero, or the pet enters a new growth stage. Inside a segment every
//! shortfall is linear, so the health effect integrates exactly. One tick
//! of `T` seconds and any number of shorter ticks summing to `T` therefore
//! reach the same state, and idle catch-up after hours offline is a single
//! tick.
//!
//! Sleep is evaluated lazily: a pet past its `sleep_until` only wakes the
//! next time a tick runs. Nothing fires on a timer.

use serde::{Deserialize, Serialize};

use crate::attributes::{Attribute, AttributeSet};
use crate::config::DecayConfig;
use crate::environment::{DecayModifiers, Environment};
use crate::growth::{self, GrowthChange};
use crate::pet::Pet;
use crate::progression;
use crate::rules::Ruleset;

/// Shortest segment a tick is cut into, in game days.
const MIN_SEGMENT_DAYS: f64 = 1e-12;
/// An attribute this close above a level counts as already on it.
const LEVEL_EPSILON: f64 = 1e-9;

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// The pet is asleep; no attribute changed.
    Sleeping,
    /// The pet woke this tick and regained energy; no decay was applied.
    WokeUp { energy_gained: f64 },
    /// Normal decay over `days` game days.
    Decayed {
        days: f64,
        growth: Option<GrowthChange>,
        level_ups: u32,
    },
}

/// Convert real seconds into game days.
pub fn game_days(elapsed_seconds: f64, cfg: &DecayConfig) -> f64 {
    if cfg.seconds_per_game_day <= 0.0 || !elapsed_seconds.is_finite() {
        return 0.0;
    }
    elapsed_seconds.max(0.0) / cfg.seconds_per_game_day
}

/// Advance a pet by `elapsed_seconds` in a neutral environment.
pub fn advance(pet: &mut Pet, elapsed_seconds: f64, rules: &Ruleset) -> TickOutcome {
    advance_in(pet, elapsed_seconds, rules, &Environment::default())
}

/// Advance a pet by `elapsed_seconds` under `env`.
///
/// Negative or non-finite elapsed time counts as zero.
pub fn advance_in(
    pet: &mut Pet,
    elapsed_seconds: f64,
    rules: &Ruleset,
    env: &Environment,
) -> TickOutcome {
    let elapsed = if elapsed_seconds.is_finite() {
        elapsed_seconds.max(0.0)
    } else {
        0.0
    };
    advance_to(pet, pet.last_update_time + elapsed, rules, env)
}

/// Advance a pet to the absolute timestamp `now`.
///
/// A `now` earlier than the last tick is treated as the last tick: the
/// pet's clock never runs backwards.
pub fn advance_to(pet: &mut Pet, now: f64, rules: &Ruleset, env: &Environment) -> TickOutcome {
    let now = if now.is_finite() {
        now.max(pet.last_update_time)
    } else {
        pet.last_update_time
    };
    let cfg = &rules.config.decay;

    if pet.is_sleeping {
        let outcome = if now < pet.sleep_until {
            TickOutcome::Sleeping
        } else {
            pet.is_sleeping = false;
            pet.sleep_until = 0.0;
            let energy_gained = pet
                .attributes
                .adjust(Attribute::Energy, cfg.wake_energy_bonus);
            log::debug!("{} woke up (+{:.0} energy)", pet.name, energy_gained);
            TickOutcome::WokeUp { energy_gained }
        };
        pet.last_update_time = now;
        return outcome;
    }

    let days = game_days(now - pet.last_update_time, cfg);
    let rates = DecayRates::for_pet(pet, rules, &env.modifiers());
    let start_age = pet.age;
    let mut growth = growth::recompute(pet, &rules.config.growth);
    let mut remaining = days;

    while remaining > 0.0 {
        let step = next_crossing(pet, &rates, rules).min(remaining);
        decay_segment(&mut pet.attributes, step, &rates, cfg);
        remaining -= step;
        pet.age = start_age + (days - remaining);
        if let Some(change) = growth::recompute(pet, &rules.config.growth) {
            growth = Some(match growth {
                Some(first) => GrowthChange {
                    from: first.from,
                    to: change.to,
                },
                None => change,
            });
        }
    }

    let level_ups = progression::check_level_up(pet, &rules.config.progression);
    pet.last_update_time = now;

    TickOutcome::Decayed {
        days,
        growth,
        level_ups,
    }
}

/// Per-day loss of each decaying attribute for one pet.
#[derive(Debug, Clone, Copy)]
struct DecayRates {
    hunger: f64,
    happiness: f64,
    cleanliness: f64,
    energy: f64,
}

impl DecayRates {
    fn for_pet(pet: &Pet, rules: &Ruleset, m: &DecayModifiers) -> Self {
        let cfg = &rules.config.decay;
        let breed = rules.traits.breed(&pet.breed);
        let personality = rules.traits.personality(&pet.personality);
        Self {
            hunger: (cfg.hunger_per_day * breed.hunger_rate * m.hunger).max(0.0),
            happiness: (cfg.happiness_per_day * personality.happiness_decay * m.happiness)
                .max(0.0),
            cleanliness: (cfg.cleanliness_per_day * m.cleanliness).max(0.0),
            energy: (cfg.energy_per_day * personality.energy_decay * m.energy).max(0.0),
        }
    }
}

/// Days until the next threshold crossing or stage boundary.
fn next_crossing(pet: &Pet, rates: &DecayRates, rules: &Ruleset) -> f64 {
    let cfg = &rules.config.decay;
    let a = pet.attributes();
    let levels = [
        (a.hunger(), rates.hunger, cfg.hunger_threshold),
        (a.hunger(), rates.hunger, cfg.regen_floor),
        (a.hunger(), rates.hunger, 0.0),
        (a.happiness(), rates.happiness, cfg.happiness_threshold),
        (a.happiness(), rates.happiness, cfg.regen_floor),
        (a.happiness(), rates.happiness, 0.0),
        (a.cleanliness(), rates.cleanliness, cfg.cleanliness_threshold),
        (a.cleanliness(), rates.cleanliness, 0.0),
    ];
    let crossing = levels
        .into_iter()
        .filter(|&(value, rate, level)| rate > 0.0 && value > level + LEVEL_EPSILON)
        .map(|(value, rate, level)| (value - level) / rate)
        .fold(f64::INFINITY, f64::min);
    let stage = growth::next_stage_age(pet.growth_stage(), &rules.config.growth)
        .filter(|at| *at > pet.age)
        .map_or(f64::INFINITY, |at| at - pet.age);
    crossing.min(stage).max(MIN_SEGMENT_DAYS)
}

/// Decay over a segment with no crossing inside it, then apply the health
/// effect integrated over the segment.
fn decay_segment(attrs: &mut AttributeSet, days: f64, rates: &DecayRates, cfg: &DecayConfig) {
    let start = *attrs;
    attrs.adjust(Attribute::Hunger, -rates.hunger * days);
    attrs.adjust(Attribute::Happiness, -rates.happiness * days);
    attrs.adjust(Attribute::Cleanliness, -rates.cleanliness * days);
    attrs.adjust(Attribute::Energy, -rates.energy * days);
    let end = *attrs;

    let mid = |attr: Attribute| (start.get(attr) + end.get(attr)) / 2.0;
    let neglected = mid(Attribute::Hunger) < cfg.hunger_threshold
        || mid(Attribute::Cleanliness) < cfg.cleanliness_threshold
        || mid(Attribute::Happiness) < cfg.happiness_threshold;

    if neglected {
        // Shortfalls are linear here, so the trapezoid is exact
        let penalty =
            (health_penalty(&start, days, cfg) + health_penalty(&end, days, cfg)) / 2.0;
        attrs.adjust(Attribute::Health, -penalty);
    } else if mid(Attribute::Hunger) > cfg.regen_floor && mid(Attribute::Happiness) > cfg.regen_floor
    {
        attrs.adjust(Attribute::Health, cfg.health_regen_per_day * days);
    }
}

/// Health lost over `days` if `attrs` held steady: summed across triggered
/// conditions and scaled by how far each attribute sits below its
/// threshold.
pub fn health_penalty(attrs: &AttributeSet, days: f64, cfg: &DecayConfig) -> f64 {
    let below = |value: f64, threshold: f64| (threshold - value).max(0.0);

    below(attrs.hunger(), cfg.hunger_threshold) * cfg.hunger_penalty * days
        + below(attrs.cleanliness(), cfg.cleanliness_threshold) * cfg.cleanliness_penalty * days
        + below(attrs.happiness(), cfg.happiness_threshold) * cfg.happiness_penalty * days
}
