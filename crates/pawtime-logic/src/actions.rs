//! Player actions: the public behavior surface of a pet.
//!
//! Each action checks whether the pet is asleep, then a resource
//! precondition, then applies its attribute deltas, awards experience and
//! returns a human-readable [`ActionReport`].
//!
//! Refusing an action is a normal outcome, not an error: the report
//! carries the [`Refusal`] and the pet is left untouched. Unknown food or
//! game names are not errors either; they fall back to the default variant
//! (plain kibble, casual play).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::pet::Pet;
use crate::progression;
use crate::rules::Ruleset;
use crate::skills::{self, TrainingResult, MAX_SKILL_LEVEL};

/// Minimum energy to eat.
pub const FEED_MIN_ENERGY: f64 = 10.0;
/// Hunger at or above which the pet refuses food.
pub const FULL_THRESHOLD: f64 = 95.0;
/// Energy spent eating.
pub const FEED_ENERGY_COST: f64 = 5.0;
/// Minimum energy and hunger to play.
pub const PLAY_MIN_ENERGY: f64 = 20.0;
pub const PLAY_MIN_HUNGER: f64 = 20.0;
/// Cleanliness lost per play session.
pub const PLAY_DIRT: f64 = 5.0;
/// Minimum energy to take a bath.
pub const BATH_MIN_ENERGY: f64 = 10.0;
/// Cleanliness at or above which a bath is skipped.
pub const CLEAN_THRESHOLD: f64 = 90.0;
pub const BATH_ENERGY_COST: f64 = 10.0;
pub const BATH_EXP: f64 = 10.0;
/// Chance the pet dislikes its bath.
pub const BATH_DISLIKE_CHANCE: f64 = 0.3;
pub const BATH_MOOD_SWING: f64 = 10.0;
/// Energy above which the pet will not go to sleep.
pub const SLEEP_MAX_ENERGY: f64 = 80.0;
pub const DEFAULT_SLEEP_HOURS: f64 = 8.0;
/// Longest nap a single sleep request can schedule.
pub const MAX_SLEEP_HOURS: f64 = 24.0;
pub const PET_EXP: f64 = 5.0;
pub const PET_AFFECTION: f64 = 3.0;
pub const PERFORM_HAPPINESS: f64 = 5.0;
pub const PERFORM_AFFECTION: f64 = 1.0;

/// Food tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Food {
    #[default]
    Regular,
    Premium,
    Treat,
    Chicken,
    Beef,
}

/// Gains from one serving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodEffect {
    pub hunger: f64,
    pub happiness: f64,
    pub health: f64,
    pub exp: f64,
}

impl Food {
    pub const ALL: [Food; 5] = [
        Food::Regular,
        Food::Premium,
        Food::Treat,
        Food::Chicken,
        Food::Beef,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Food::Regular => "普通狗粮",
            Food::Premium => "高级狗粮",
            Food::Treat => "狗狗零食",
            Food::Chicken => "鸡肉",
            Food::Beef => "牛肉",
        }
    }

    /// Parse a food name. Unknown names fall back to regular kibble.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .unwrap_or_default()
    }

    pub fn effect(self) -> FoodEffect {
        let (hunger, happiness, health, exp) = match self {
            Food::Regular => (20.0, 5.0, 5.0, 10.0),
            Food::Premium => (30.0, 10.0, 15.0, 15.0),
            Food::Treat => (10.0, 15.0, 0.0, 5.0),
            Food::Chicken => (25.0, 20.0, 10.0, 20.0),
            Food::Beef => (35.0, 25.0, 15.0, 25.0),
        };
        FoodEffect {
            hunger,
            happiness,
            health,
            exp,
        }
    }
}

/// Play session types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    #[default]
    Casual,
    Frisbee,
    ChaseBall,
    TugOfWar,
    Puzzle,
}

/// Gains and costs of one play session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameEffect {
    pub happiness: f64,
    pub energy_cost: f64,
    pub hunger_cost: f64,
    pub exp: f64,
}

impl Game {
    pub const ALL: [Game; 5] = [
        Game::Casual,
        Game::Frisbee,
        Game::ChaseBall,
        Game::TugOfWar,
        Game::Puzzle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Game::Casual => "普通玩耍",
            Game::Frisbee => skills::CATCH_FRISBEE,
            Game::ChaseBall => "追球",
            Game::TugOfWar => "拔河",
            Game::Puzzle => skills::PUZZLE,
        }
    }

    /// Parse a game name. Unknown names fall back to casual play.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|g| g.name() == name)
            .unwrap_or_default()
    }

    pub fn effect(self) -> GameEffect {
        let (happiness, energy_cost, hunger_cost, exp) = match self {
            Game::Casual => (20.0, 15.0, 10.0, 15.0),
            Game::Frisbee => (25.0, 25.0, 15.0, 25.0),
            Game::ChaseBall => (30.0, 30.0, 20.0, 20.0),
            Game::TugOfWar => (35.0, 35.0, 20.0, 30.0),
            Game::Puzzle => (25.0, 15.0, 10.0, 35.0),
        };
        GameEffect {
            happiness,
            energy_cost,
            hunger_cost,
            exp,
        }
    }
}

/// A player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Feed(Food),
    Play(Game),
    Bath,
    Sleep { hours: f64 },
    Train(String),
    Pet,
    /// Ask the pet to show a trick it already knows.
    Perform(String),
}

impl Action {
    /// Build an action from a request name and optional parameter, the
    /// shape front-ends send. Returns `None` for unknown action names.
    pub fn from_request(kind: &str, param: Option<&str>) -> Option<Self> {
        let action = match kind {
            "feed" => Action::Feed(param.map(Food::from_name).unwrap_or_default()),
            "play" => Action::Play(param.map(Game::from_name).unwrap_or_default()),
            "bath" | "clean" => Action::Bath,
            "sleep" => Action::Sleep {
                hours: param
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(DEFAULT_SLEEP_HOURS),
            },
            "train" => Action::Train(param.unwrap_or(skills::SIT).to_string()),
            "pet" => Action::Pet,
            "perform" => Action::Perform(param.unwrap_or_default().to_string()),
            _ => return None,
        };
        Some(action)
    }

    /// Verb used in refusal messages.
    fn verb(&self) -> &'static str {
        match self {
            Action::Feed(_) => "喂食",
            Action::Play(_) => "玩耍",
            Action::Bath => "洗澡",
            Action::Sleep { .. } => "睡觉",
            Action::Train(_) => "训练",
            Action::Pet => "抚摸",
            Action::Perform(_) => "表演",
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refusal {
    Sleeping,
    TooTired,
    TooHungry,
    Unhappy,
    AlreadyFull,
    AlreadyClean,
    AlreadySleeping,
    NotSleepy,
    UnknownSkill(String),
    SkillMaxed(String),
    UnknownTrick(String),
}

impl Refusal {
    fn describe(&self, name: &str, verb: &str) -> String {
        match self {
            Refusal::Sleeping => format!("{name}正在睡觉，不能{verb}。"),
            Refusal::TooTired => format!("{name}太累了，没力气{verb}。"),
            Refusal::TooHungry => format!("{name}太饿了，没心情{verb}。"),
            Refusal::Unhappy => format!("{name}心情不好，不想{verb}。"),
            Refusal::AlreadyFull => format!("{name}已经吃饱了，不想再吃了。"),
            Refusal::AlreadyClean => format!("{name}已经很干净了，不需要洗澡。"),
            Refusal::AlreadySleeping => format!("{name}已经在睡觉了。"),
            Refusal::NotSleepy => format!("{name}现在精力充沛，不想睡觉。"),
            Refusal::UnknownSkill(skill) => format!("不能教{name}「{skill}」，请选择基本技能。"),
            Refusal::SkillMaxed(skill) => format!("{name}的「{skill}」已经达到最高级了！"),
            Refusal::UnknownTrick(skill) => {
                format!("{name}似乎不理解「{skill}」，也许需要先训练这个技能？")
            }
        }
    }
}

/// Whether an action took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied,
    /// Accepted but had no effect (petting a sleeping pet).
    Muted,
    Refused(Refusal),
}

/// Result of resolving one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub outcome: Outcome,
    pub message: String,
    /// Levels gained from the experience this action awarded.
    pub level_ups: u32,
    /// Skill whose level changed, with its new level.
    pub skill_change: Option<(String, u8)>,
}

impl ActionReport {
    fn applied(message: String, level_ups: u32) -> Self {
        Self {
            outcome: Outcome::Applied,
            message,
            level_ups,
            skill_change: None,
        }
    }

    fn refused(pet: &Pet, action: &Action, refusal: Refusal) -> Self {
        log::debug!("{} refused {:?}: {:?}", pet.name, action, refusal);
        Self {
            message: refusal.describe(&pet.name, action.verb()),
            outcome: Outcome::Refused(refusal),
            level_ups: 0,
            skill_change: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == Outcome::Applied
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match &self.outcome {
            Outcome::Refused(r) => Some(r),
            _ => None,
        }
    }
}

/// Resolve any action against a pet.
///
/// An applied action also stamps `last_interaction` with the pet's clock.
pub fn resolve(pet: &mut Pet, action: Action, rules: &Ruleset, rng: &mut impl Rng) -> ActionReport {
    let report = match action {
        Action::Feed(food) => feed(pet, food, rules),
        Action::Play(game) => play(pet, game, rules, rng),
        Action::Bath => bath(pet, rules, rng),
        Action::Sleep { hours } => sleep(pet, hours),
        Action::Train(skill) => train(pet, &skill, rules, rng),
        Action::Pet => pet_pet(pet, rules),
        Action::Perform(skill) => perform(pet, &skill),
    };
    if report.is_applied() {
        pet.last_interaction = pet.last_update_time;
    }
    report
}

pub fn feed(pet: &mut Pet, food: Food, rules: &Ruleset) -> ActionReport {
    let action = Action::Feed(food);
    if pet.is_sleeping {
        return ActionReport::refused(pet, &action, Refusal::Sleeping);
    }
    if pet.attributes.energy() < FEED_MIN_ENERGY {
        return ActionReport::refused(pet, &action, Refusal::TooTired);
    }
    if pet.attributes.hunger() >= FULL_THRESHOLD {
        return ActionReport::refused(pet, &action, Refusal::AlreadyFull);
    }

    let effect = food.effect();
    let attrs = &mut pet.attributes;
    attrs.adjust(Attribute::Hunger, effect.hunger);
    attrs.adjust(Attribute::Happiness, effect.happiness);
    attrs.adjust(Attribute::Health, effect.health);
    attrs.adjust(Attribute::Energy, -FEED_ENERGY_COST);
    let level_ups = progression::add_experience(pet, effect.exp, &rules.config.progression);

    ActionReport::applied(
        format!("{}吃了{}，看起来很满足！", pet.name, food.name()),
        level_ups,
    )
}

pub fn play(pet: &mut Pet, game: Game, rules: &Ruleset, rng: &mut impl Rng) -> ActionReport {
    let action = Action::Play(game);
    if pet.is_sleeping {
        return ActionReport::refused(pet, &action, Refusal::Sleeping);
    }
    if pet.attributes.energy() < PLAY_MIN_ENERGY {
        return ActionReport::refused(pet, &action, Refusal::TooTired);
    }
    if pet.attributes.hunger() < PLAY_MIN_HUNGER {
        return ActionReport::refused(pet, &action, Refusal::TooHungry);
    }

    let effect = game.effect();
    let attrs = &mut pet.attributes;
    attrs.adjust(Attribute::Happiness, effect.happiness);
    attrs.adjust(Attribute::Energy, -effect.energy_cost);
    attrs.adjust(Attribute::Hunger, -effect.hunger_cost);
    attrs.adjust(Attribute::Cleanliness, -PLAY_DIRT);
    let level_ups = progression::add_experience(pet, effect.exp, &rules.config.progression);

    // Practising a known trick through play can sharpen it
    let skill = game.name();
    let mut skill_change = None;
    let current = pet.skills.level(skill);
    if current > 0
        && current < MAX_SKILL_LEVEL
        && rng.gen::<f64>() < rules.config.training.play_bump_chance
    {
        let level = pet.skills.raise(skill, 1);
        skill_change = Some((skill.to_string(), level));
    }

    let mut message = format!("{}和你玩了{}，非常开心", pet.name, skill);
    if let Some((_, level)) = &skill_change {
        message.push_str(&format!("，{skill}技能提升到了{level}级！"));
    } else {
        message.push('！');
    }

    ActionReport {
        outcome: Outcome::Applied,
        message,
        level_ups,
        skill_change,
    }
}

pub fn bath(pet: &mut Pet, rules: &Ruleset, rng: &mut impl Rng) -> ActionReport {
    let action = Action::Bath;
    if pet.is_sleeping {
        return ActionReport::refused(pet, &action, Refusal::Sleeping);
    }
    if pet.attributes.energy() < BATH_MIN_ENERGY {
        return ActionReport::refused(pet, &action, Refusal::TooTired);
    }
    if pet.attributes.cleanliness() >= CLEAN_THRESHOLD {
        return ActionReport::refused(pet, &action, Refusal::AlreadyClean);
    }

    let disliked = rng.gen::<f64>() < BATH_DISLIKE_CHANCE;
    let mood = if disliked {
        -BATH_MOOD_SWING
    } else {
        BATH_MOOD_SWING
    };

    let attrs = &mut pet.attributes;
    attrs.set(Attribute::Cleanliness, crate::attributes::ATTR_MAX);
    attrs.adjust(Attribute::Happiness, mood);
    attrs.adjust(Attribute::Energy, -BATH_ENERGY_COST);
    let level_ups = progression::add_experience(pet, BATH_EXP, &rules.config.progression);

    let message = if disliked {
        format!("{}洗完澡了，虽然不太喜欢洗澡的过程，但现在很干净了！", pet.name)
    } else {
        format!("{}洗完澡了，看起来很享受，现在非常干净！", pet.name)
    };
    ActionReport::applied(message, level_ups)
}

/// Put the pet to sleep for `hours`, stamped at the pet's own clock.
///
/// Hosts tick the pet to wall time before acting, so `last_update_time`
/// is "now". Non-positive or non-finite durations fall back to the default;
/// longer ones are capped at [`MAX_SLEEP_HOURS`].
pub fn sleep(pet: &mut Pet, hours: f64) -> ActionReport {
    let hours = if hours.is_finite() && hours > 0.0 {
        hours.min(MAX_SLEEP_HOURS)
    } else {
        DEFAULT_SLEEP_HOURS
    };
    let action = Action::Sleep { hours };
    if pet.is_sleeping {
        return ActionReport::refused(pet, &action, Refusal::AlreadySleeping);
    }
    if pet.attributes.energy() > SLEEP_MAX_ENERGY {
        return ActionReport::refused(pet, &action, Refusal::NotSleepy);
    }

    pet.is_sleeping = true;
    pet.sleep_until = pet.last_update_time + hours * 3600.0;
    log::debug!("{} sleeps until {:.0}", pet.name, pet.sleep_until);

    ActionReport::applied(
        format!("{}开始睡觉了，预计{}小时后醒来。", pet.name, hours),
        0,
    )
}

pub fn train(pet: &mut Pet, skill: &str, rules: &Ruleset, rng: &mut impl Rng) -> ActionReport {
    match skills::train(pet, skill, rules, rng) {
        Err(refusal) => ActionReport::refused(pet, &Action::Train(skill.to_string()), refusal),
        Ok(outcome) => {
            let message = match outcome.result {
                TrainingResult::Learned => format!("{}学会了新技能：{}！", pet.name, skill),
                TrainingResult::Improved => {
                    format!("{}的{}技能提升到了{}级！", pet.name, skill, outcome.level)
                }
                TrainingResult::NoProgress if outcome.level == 0 => {
                    format!("{}还没有理解{}是什么，需要更多训练。", pet.name, skill)
                }
                TrainingResult::NoProgress => {
                    format!("{}尝试学习{}，但这次没有进步。", pet.name, skill)
                }
            };
            let skill_change = (outcome.result != TrainingResult::NoProgress)
                .then(|| (outcome.skill.clone(), outcome.level));
            ActionReport {
                outcome: Outcome::Applied,
                message,
                level_ups: outcome.level_ups,
                skill_change,
            }
        }
    }
}

/// Stroke the pet. Allowed while asleep, where it has no effect.
pub fn pet_pet(pet: &mut Pet, rules: &Ruleset) -> ActionReport {
    if pet.is_sleeping {
        return ActionReport {
            outcome: Outcome::Muted,
            message: format!("{}正在睡觉，轻轻抚摸了一下，它看起来很安心。", pet.name),
            level_ups: 0,
            skill_change: None,
        };
    }

    let bonus = rules.traits.personality(&pet.personality).pet_bonus;
    pet.attributes.adjust(Attribute::Happiness, bonus);
    pet.adjust_affection(PET_AFFECTION);
    let level_ups = progression::add_experience(pet, PET_EXP, &rules.config.progression);

    let message = match pet.personality.as_str() {
        "粘人" => format!("{}非常享受你的抚摸，蹭来蹭去，尾巴摇个不停！", pet.name),
        "独立" => format!("{}接受了你的抚摸，但保持着一定的距离。", pet.name),
        _ => format!("{}开心地享受着你的抚摸，尾巴轻轻摇摆。", pet.name),
    };
    ActionReport::applied(message, level_ups)
}

/// Ask the pet to show a trick it already knows.
pub fn perform(pet: &mut Pet, skill: &str) -> ActionReport {
    let action = Action::Perform(skill.to_string());
    if pet.is_sleeping {
        return ActionReport::refused(pet, &action, Refusal::Sleeping);
    }
    if !pet.skills.knows(skill) {
        return ActionReport::refused(pet, &action, Refusal::UnknownTrick(skill.to_string()));
    }

    pet.attributes.adjust(Attribute::Happiness, PERFORM_HAPPINESS);
    pet.adjust_affection(PERFORM_AFFECTION);
    ActionReport::applied(format!("{}听到你的命令，表演了{}！", pet.name, skill), 0)
}
