//! Persistence-neutral pet record.
//!
//! [`PetRecord`] is the versioned, flat shape a pet is stored in. Every
//! field has a documented default, so records written by older builds (or
//! edited by hand) still load. Decoding never trusts stored values: numbers
//! are sanitized and clamped, skills outside `[1, 5]` are fixed or dropped,
//! and the growth stage is derived from age rather than read back. Each fix
//! is reported as a [`Correction`] so the caller can log it.
//!
//! The record knows nothing about byte formats; the storage layer picks JSON
//! or a binary encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attributes::{clamp_attr, Attribute, AttributeSet, ATTR_MAX};
use crate::config::GrowthConfig;
use crate::growth::{self, GrowthStage};
use crate::pet::{self, Pet, DEFAULT_AFFECTION};
use crate::skills::{SkillBook, MAX_SKILL_LEVEL};

/// Record schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Stored form of a [`Pet`].
///
/// Defaults for missing fields:
///
/// | Field | Default |
/// |-------|---------|
/// | `version` | [`CURRENT_VERSION`] |
/// | `name` / `breed` / `personality` | 小狗 / 柯基 / 活泼 |
/// | five core attributes | 100 |
/// | `age`, `experience` | 0 |
/// | `level` | 1 |
/// | `affection` | 50 |
/// | `skills` | empty |
/// | `is_sleeping`, `sleep_until` | false, 0 |
/// | `last_update_time`, `created_at` | the decode-time clock |
/// | `last_interaction` | `last_update_time` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetRecord {
    pub version: u32,
    pub name: String,
    pub breed: String,
    pub personality: String,
    pub hunger: f64,
    pub happiness: f64,
    pub health: f64,
    pub cleanliness: f64,
    pub energy: f64,
    pub age: f64,
    pub level: i64,
    pub experience: f64,
    /// Informational only; decoding derives the stage from `age`.
    pub growth_stage: Option<GrowthStage>,
    pub affection: f64,
    pub skills: BTreeMap<String, i64>,
    pub is_sleeping: bool,
    pub sleep_until: f64,
    pub last_update_time: Option<f64>,
    pub last_interaction: Option<f64>,
    pub created_at: Option<f64>,
}

impl Default for PetRecord {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            name: pet::DEFAULT_NAME.to_string(),
            breed: pet::DEFAULT_BREED.to_string(),
            personality: pet::DEFAULT_PERSONALITY.to_string(),
            hunger: ATTR_MAX,
            happiness: ATTR_MAX,
            health: ATTR_MAX,
            cleanliness: ATTR_MAX,
            energy: ATTR_MAX,
            age: 0.0,
            level: 1,
            experience: 0.0,
            growth_stage: None,
            affection: DEFAULT_AFFECTION,
            skills: BTreeMap::new(),
            is_sleeping: false,
            sleep_until: 0.0,
            last_update_time: None,
            last_interaction: None,
            created_at: None,
        }
    }
}

/// A stored value that decoding had to fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Correction {
    /// A numeric field was non-finite or out of range.
    Clamped {
        field: &'static str,
        stored: f64,
        used: f64,
    },
    /// A skill level was out of `[1, 5]`; `used` 0 means it was dropped.
    Skill { skill: String, stored: i64, used: u8 },
    /// The stored stage disagreed with the age.
    Stage { stored: GrowthStage, derived: GrowthStage },
    /// A clock field was missing and the decode-time clock was used.
    MissingClock(&'static str),
    /// The stored name disagreed with the key the record is filed under.
    Renamed { stored: String, used: String },
}

/// Snapshot a pet into its stored form.
pub fn encode(pet: &Pet) -> PetRecord {
    let a = pet.attributes();
    PetRecord {
        version: CURRENT_VERSION,
        name: pet.name.clone(),
        breed: pet.breed.clone(),
        personality: pet.personality.clone(),
        hunger: a.hunger(),
        happiness: a.happiness(),
        health: a.health(),
        cleanliness: a.cleanliness(),
        energy: a.energy(),
        age: pet.age,
        level: i64::from(pet.level),
        experience: pet.experience,
        growth_stage: Some(pet.growth_stage()),
        affection: pet.affection(),
        skills: pet
            .skills
            .iter()
            .map(|(name, level)| (name.to_string(), i64::from(level)))
            .collect(),
        is_sleeping: pet.is_sleeping,
        // JSON has no encoding for inf or NaN
        sleep_until: finite_or_zero(pet.sleep_until),
        last_update_time: Some(pet.last_update_time).filter(|t| t.is_finite()),
        last_interaction: Some(pet.last_interaction).filter(|t| t.is_finite()),
        created_at: Some(pet.created_at).filter(|t| t.is_finite()),
    }
}

/// Rebuild a pet from a record, repairing anything out of range.
///
/// `now` stands in for clock fields the record lacks, so a record without
/// `last_update_time` does not decay from the epoch. The record's `version`
/// is not checked here; the storage layer rejects versions it cannot read.
pub fn decode(record: PetRecord, cfg: &GrowthConfig, now: f64) -> (Pet, Vec<Correction>) {
    let mut fixes = Vec::new();

    let stored = [
        record.hunger,
        record.happiness,
        record.health,
        record.cleanliness,
        record.energy,
    ];
    let (attributes, clamped) = AttributeSet::from_stored(stored);
    for (attr, stored) in Attribute::ALL.into_iter().zip(stored) {
        if clamped.contains(&attr) {
            fixes.push(Correction::Clamped {
                field: field_name(attr),
                stored,
                used: attributes.get(attr),
            });
        }
    }

    let age = non_negative("age", record.age, &mut fixes);
    let experience = non_negative("experience", record.experience, &mut fixes);
    let affection = sanitized("affection", record.affection, clamp_attr, &mut fixes);
    let sleep_until = non_negative("sleep_until", record.sleep_until, &mut fixes);

    let level = u32::try_from(record.level.max(1)).unwrap_or(u32::MAX);
    if i64::from(level) != record.level {
        fixes.push(Correction::Clamped {
            field: "level",
            stored: record.level as f64,
            used: f64::from(level),
        });
    }

    for (skill, &stored) in &record.skills {
        let used = stored.clamp(0, i64::from(MAX_SKILL_LEVEL)) as u8;
        if i64::from(used) != stored || used == 0 {
            fixes.push(Correction::Skill {
                skill: skill.clone(),
                stored,
                used,
            });
        }
    }
    let skills = SkillBook::from_levels(record.skills);

    let derived = growth::stage_for_age(age, cfg);
    if let Some(stored) = record.growth_stage.filter(|s| *s != derived) {
        fixes.push(Correction::Stage { stored, derived });
    }

    let last_update_time = clock("last_update_time", record.last_update_time, now, &mut fixes);
    let created_at = clock("created_at", record.created_at, last_update_time, &mut fixes);
    let last_interaction = match record.last_interaction {
        Some(t) if t.is_finite() => t.min(last_update_time),
        _ => last_update_time,
    };

    let mut pet = Pet::new(record.name, record.breed, record.personality, created_at);
    pet.attributes = attributes;
    pet.age = age;
    pet.level = level;
    pet.experience = experience;
    pet.growth_stage = derived;
    pet.affection = affection;
    pet.skills = skills;
    pet.is_sleeping = record.is_sleeping;
    pet.sleep_until = if record.is_sleeping { sleep_until } else { 0.0 };
    pet.last_update_time = last_update_time;
    pet.last_interaction = last_interaction;

    (pet, fixes)
}

/// Force a decoded pet's name to the key its record was loaded from, so a
/// later save overwrites that same record.
pub fn rekey(pet: &mut Pet, key: &str) -> Option<Correction> {
    if pet.name == key {
        return None;
    }
    let stored = std::mem::replace(&mut pet.name, key.to_string());
    Some(Correction::Renamed {
        stored,
        used: key.to_string(),
    })
}

fn sanitized(
    field: &'static str,
    stored: f64,
    fix: impl Fn(f64) -> f64,
    fixes: &mut Vec<Correction>,
) -> f64 {
    let used = fix(stored);
    // NaN != NaN, so a non-finite value is always reported
    if used != stored {
        fixes.push(Correction::Clamped {
            field,
            stored,
            used,
        });
    }
    used
}

fn non_negative(field: &'static str, stored: f64, fixes: &mut Vec<Correction>) -> f64 {
    sanitized(
        field,
        stored,
        |v| if v.is_finite() { v.max(0.0) } else { 0.0 },
        fixes,
    )
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clock(field: &'static str, stored: Option<f64>, fallback: f64, fixes: &mut Vec<Correction>) -> f64 {
    match stored {
        Some(t) if t.is_finite() => t,
        _ => {
            fixes.push(Correction::MissingClock(field));
            fallback
        }
    }
}

fn field_name(attr: Attribute) -> &'static str {
    match attr {
        Attribute::Hunger => "hunger",
        Attribute::Happiness => "happiness",
        Attribute::Health => "health",
        Attribute::Cleanliness => "cleanliness",
        Attribute::Energy => "energy",
    }
}
