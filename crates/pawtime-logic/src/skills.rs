//! Skill book and probabilistic training.
//!
//! Skills are named tricks with an integer level in `[0, 5]`. A missing
//! entry means level 0 (untrained); the book never stores zeros.
//!
//! # Training odds
//!
//! Learning a new trick succeeds with `learn_base` plus a small bonus per
//! pet level (capped). Improving a known trick at level `L` succeeds with
//! `improve_base - (L - 1) * improve_step`, so every level is strictly
//! harder than the one before. Failed attempts still cost energy and
//! hunger, but less than a success.
//!
//! ```
//! use pawtime_logic::config::TrainingConfig;
//! use pawtime_logic::skills::success_chance;
//!
//! let cfg = TrainingConfig::default();
//! assert!(success_chance(2, 1, &cfg) < success_chance(1, 1, &cfg));
//! ```

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::Refusal;
use crate::attributes::Attribute;
use crate::config::TrainingConfig;
use crate::pet::Pet;
use crate::progression;
use crate::rules::Ruleset;

/// Highest level any skill can reach.
pub const MAX_SKILL_LEVEL: u8 = 5;

pub const SIT: &str = "坐下";
pub const SHAKE: &str = "握手";
pub const ROLL_OVER: &str = "打滚";
pub const CATCH_FRISBEE: &str = "接飞盘";
pub const FETCH_BALL: &str = "捡球";
pub const STAY: &str = "原地等待";
/// Unlocked by the maze minigame and the puzzle game.
pub const PUZZLE: &str = "智力游戏";
/// Unlocked by the race minigame.
pub const AGILITY: &str = "障碍跑";

/// Skills that can be taught directly with a training session.
pub const TRAINABLE_SKILLS: [&str; 6] = [SIT, SHAKE, ROLL_OVER, CATCH_FRISBEE, FETCH_BALL, STAY];

/// Minimum energy, hunger and happiness for a training session.
pub const TRAIN_MIN_ENERGY: f64 = 30.0;
pub const TRAIN_MIN_HUNGER: f64 = 30.0;
pub const TRAIN_MIN_HAPPINESS: f64 = 30.0;

pub fn is_trainable(skill: &str) -> bool {
    TRAINABLE_SKILLS.contains(&skill)
}

/// Per-skill level map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillBook(BTreeMap<String, u8>);

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw levels, clamping to the cap and dropping zeros.
    pub fn from_levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut book = Self::new();
        for (name, level) in levels {
            let clamped = level.clamp(0, i64::from(MAX_SKILL_LEVEL)) as u8;
            book.set(name, clamped);
        }
        book
    }

    /// Level of `skill`, 0 when untrained.
    pub fn level(&self, skill: &str) -> u8 {
        self.0.get(skill).copied().unwrap_or(0)
    }

    pub fn knows(&self, skill: &str) -> bool {
        self.level(skill) > 0
    }

    /// Set a level, clamped to the cap. Level 0 forgets the skill.
    pub fn set(&mut self, skill: impl Into<String>, level: u8) {
        let skill = skill.into();
        let level = level.min(MAX_SKILL_LEVEL);
        if level == 0 {
            self.0.remove(&skill);
        } else {
            self.0.insert(skill, level);
        }
    }

    /// Raise a skill by `by` levels, saturating at the cap. Returns the new
    /// level.
    pub fn raise(&mut self, skill: &str, by: u8) -> u8 {
        let level = self.level(skill).saturating_add(by).min(MAX_SKILL_LEVEL);
        self.set(skill, level);
        level
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn in_bounds(&self) -> bool {
        self.0.values().all(|l| (1..=MAX_SKILL_LEVEL).contains(l))
    }
}

/// Chance that a training session succeeds.
///
/// `current_level` is the skill's level before the attempt; `pet_level` only
/// matters for learning a new skill.
pub fn success_chance(current_level: u8, pet_level: u32, cfg: &TrainingConfig) -> f64 {
    let chance = if current_level == 0 {
        let bonus = f64::from(pet_level.saturating_sub(1)) * cfg.learn_bonus_per_level;
        cfg.learn_base + bonus.min(cfg.learn_bonus_cap)
    } else {
        cfg.improve_base - f64::from(current_level - 1) * cfg.improve_step
    };
    chance.clamp(0.0, 1.0)
}

/// What a training attempt achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingResult {
    /// An untrained skill reached level 1.
    Learned,
    /// A known skill gained a level.
    Improved,
    /// The attempt was made but the skill did not advance.
    NoProgress,
}

/// Outcome of an attempted (not refused) training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub skill: String,
    pub result: TrainingResult,
    /// Skill level after the attempt.
    pub level: u8,
    pub level_ups: u32,
}

struct SessionEffect {
    energy: f64,
    hunger: f64,
    happiness: f64,
    exp: f64,
    affection: f64,
}

const LEARN_SUCCESS: SessionEffect = SessionEffect {
    energy: 25.0,
    hunger: 15.0,
    happiness: 15.0,
    exp: 50.0,
    affection: 5.0,
};
const LEARN_FAILURE: SessionEffect = SessionEffect {
    energy: 20.0,
    hunger: 10.0,
    happiness: 0.0,
    exp: 0.0,
    affection: 2.0,
};
const IMPROVE_SUCCESS: SessionEffect = SessionEffect {
    energy: 20.0,
    hunger: 10.0,
    happiness: 10.0,
    exp: 25.0,
    affection: 5.0,
};
const IMPROVE_FAILURE: SessionEffect = SessionEffect {
    energy: 15.0,
    hunger: 5.0,
    happiness: 0.0,
    exp: 0.0,
    affection: 2.0,
};

/// Run one training session.
///
/// Refusals leave the pet untouched. An attempted session always costs
/// energy and hunger; only a success raises the skill, happiness and
/// experience.
pub fn train(
    pet: &mut Pet,
    skill: &str,
    rules: &Ruleset,
    rng: &mut impl Rng,
) -> Result<TrainingOutcome, Refusal> {
    if pet.is_sleeping {
        return Err(Refusal::Sleeping);
    }
    if pet.attributes.energy() < TRAIN_MIN_ENERGY {
        return Err(Refusal::TooTired);
    }
    if pet.attributes.hunger() < TRAIN_MIN_HUNGER {
        return Err(Refusal::TooHungry);
    }
    if pet.attributes.happiness() < TRAIN_MIN_HAPPINESS {
        return Err(Refusal::Unhappy);
    }
    if !is_trainable(skill) {
        return Err(Refusal::UnknownSkill(skill.to_string()));
    }

    let current = pet.skills.level(skill);
    if current >= MAX_SKILL_LEVEL {
        return Err(Refusal::SkillMaxed(skill.to_string()));
    }

    let chance = success_chance(current, pet.level, &rules.config.training);
    let success = rng.gen::<f64>() < chance;

    let (effect, result) = match (current, success) {
        (0, true) => (&LEARN_SUCCESS, TrainingResult::Learned),
        (0, false) => (&LEARN_FAILURE, TrainingResult::NoProgress),
        (_, true) => (&IMPROVE_SUCCESS, TrainingResult::Improved),
        (_, false) => (&IMPROVE_FAILURE, TrainingResult::NoProgress),
    };

    if success {
        pet.skills.raise(skill, 1);
    }
    pet.attributes.adjust(Attribute::Energy, -effect.energy);
    pet.attributes.adjust(Attribute::Hunger, -effect.hunger);
    pet.attributes.adjust(Attribute::Happiness, effect.happiness);
    pet.adjust_affection(effect.affection);
    let level_ups = progression::add_experience(pet, effect.exp, &rules.config.progression);

    log::debug!(
        "{} trained {} ({:?}, chance {:.2})",
        pet.name,
        skill,
        result,
        chance
    );

    Ok(TrainingOutcome {
        skill: skill.to_string(),
        result,
        level: pet.skills.level(skill),
        level_ups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    /// Every `gen::<f64>()` draw is 0.0: all rolls succeed.
    fn always_succeed() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every `gen::<f64>()` draw is just below 1.0: all rolls fail.
    fn always_fail() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn fresh() -> Pet {
        Pet::new("旺财", "柯基", "活泼", 0.0)
    }

    #[test]
    fn book_clamps_and_drops_zeros() {
        let book = SkillBook::from_levels([("坐下", 9), ("握手", 0), ("打滚", -2), ("捡球", 3)]);
        assert_eq!(book.level("坐下"), 5);
        assert_eq!(book.level("捡球"), 3);
        assert!(!book.knows("握手"));
        assert!(!book.knows("打滚"));
        assert_eq!(book.len(), 2);
        assert!(book.in_bounds());
    }

    #[test]
    fn raise_saturates_at_cap() {
        let mut book = SkillBook::new();
        assert_eq!(book.raise(SIT, 3), 3);
        assert_eq!(book.raise(SIT, 4), 5);
        assert_eq!(book.level(SIT), MAX_SKILL_LEVEL);
    }

    #[test]
    fn improve_chance_strictly_decreasing() {
        let cfg = TrainingConfig::default();
        for level in 1..MAX_SKILL_LEVEL - 1 {
            assert!(
                success_chance(level + 1, 1, &cfg) < success_chance(level, 1, &cfg),
                "chance did not drop from level {level}"
            );
        }
        assert!((success_chance(1, 1, &cfg) - 0.8).abs() < 1e-9);
        assert!((success_chance(4, 1, &cfg) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn learn_chance_bonus_is_capped() {
        let cfg = TrainingConfig::default();
        assert!((success_chance(0, 1, &cfg) - 0.7).abs() < 1e-9);
        assert!((success_chance(0, 3, &cfg) - 0.8).abs() < 1e-9);
        assert!((success_chance(0, 50, &cfg) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn learning_success_on_fresh_pet() {
        let rules = Ruleset::standard();
        let mut pet = fresh();
        let outcome = train(&mut pet, SIT, &rules, &mut always_succeed()).unwrap();
        assert_eq!(outcome.result, TrainingResult::Learned);
        assert_eq!(outcome.level, 1);
        assert_eq!(pet.skills.level(SIT), 1);
        assert_eq!(pet.attributes.energy(), 75.0);
        assert_eq!(pet.attributes.hunger(), 85.0);
        assert_eq!(pet.attributes.happiness(), 100.0);
        assert!((pet.experience - 50.0).abs() < f64::EPSILON);
        assert_eq!(pet.affection, 55.0);
    }

    #[test]
    fn learning_failure_costs_less_and_leaves_book() {
        let rules = Ruleset::standard();
        let mut pet = fresh();
        let outcome = train(&mut pet, SIT, &rules, &mut always_fail()).unwrap();
        assert_eq!(outcome.result, TrainingResult::NoProgress);
        assert!(pet.skills.is_empty());
        assert_eq!(pet.attributes.energy(), 80.0);
        assert_eq!(pet.attributes.hunger(), 90.0);
        assert_eq!(pet.experience, 0.0);
    }

    #[test]
    fn improving_known_skill() {
        let rules = Ruleset::standard();
        let mut pet = fresh();
        pet.skills.set(SHAKE, 2);
        let outcome = train(&mut pet, SHAKE, &rules, &mut always_succeed()).unwrap();
        assert_eq!(outcome.result, TrainingResult::Improved);
        assert_eq!(pet.skills.level(SHAKE), 3);
        assert_eq!(pet.attributes.energy(), 80.0);
        assert_eq!(pet.attributes.hunger(), 90.0);
        assert!((pet.experience - 25.0).abs() < f64::EPSILON);

        let outcome = train(&mut pet, SHAKE, &rules, &mut always_fail()).unwrap();
        assert_eq!(outcome.result, TrainingResult::NoProgress);
        assert_eq!(pet.skills.level(SHAKE), 3);
        assert_eq!(pet.attributes.energy(), 65.0);
        assert_eq!(pet.attributes.hunger(), 85.0);
    }

    #[test]
    fn refusals_do_not_mutate() {
        let rules = Ruleset::standard();
        let mut rng = always_succeed();

        let mut tired = fresh();
        tired.attributes.set(Attribute::Energy, 29.0);
        let before = tired.clone();
        assert_eq!(train(&mut tired, SIT, &rules, &mut rng), Err(Refusal::TooTired));
        assert_eq!(tired, before);

        let mut hungry = fresh();
        hungry.attributes.set(Attribute::Hunger, 10.0);
        assert_eq!(train(&mut hungry, SIT, &rules, &mut rng), Err(Refusal::TooHungry));

        let mut sad = fresh();
        sad.attributes.set(Attribute::Happiness, 5.0);
        assert_eq!(train(&mut sad, SIT, &rules, &mut rng), Err(Refusal::Unhappy));

        let mut asleep = fresh();
        asleep.is_sleeping = true;
        assert_eq!(train(&mut asleep, SIT, &rules, &mut rng), Err(Refusal::Sleeping));

        let mut pet = fresh();
        assert_eq!(
            train(&mut pet, "飞行", &rules, &mut rng),
            Err(Refusal::UnknownSkill("飞行".into()))
        );
        pet.skills.set(STAY, MAX_SKILL_LEVEL);
        let before = pet.clone();
        assert_eq!(
            train(&mut pet, STAY, &rules, &mut rng),
            Err(Refusal::SkillMaxed(STAY.into()))
        );
        assert_eq!(pet, before);
    }

    #[test]
    fn minigame_skills_are_not_trainable() {
        assert!(!is_trainable(PUZZLE));
        assert!(!is_trainable(AGILITY));
        assert!(is_trainable(CATCH_FRISBEE));
    }
}
