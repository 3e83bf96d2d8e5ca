//! End-of-round rewards handed back by minigames.
//!
//! The minigames themselves (fetch, maze, race) live outside the
//! simulation. When a round ends they report a score, and the reward is
//! applied here under the same clamping rules as every other mutation.

use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::pet::Pet;
use crate::progression;
use crate::rules::Ruleset;
use crate::skills::{self, MAX_SKILL_LEVEL};

/// Experience cap for one round.
pub const MAX_ROUND_EXP: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Minigame {
    Fetch,
    Maze,
    Race,
}

/// Per-game reward curve.
struct RewardCurve {
    skill: &'static str,
    /// Minimum score to unlock the skill at level 1.
    unlock_score: u32,
}

impl Minigame {
    pub fn name(self) -> &'static str {
        match self {
            Minigame::Fetch => "接飞盘游戏",
            Minigame::Maze => "迷宫游戏",
            Minigame::Race => "赛跑游戏",
        }
    }

    fn curve(self) -> RewardCurve {
        match self {
            Minigame::Fetch => RewardCurve {
                skill: skills::CATCH_FRISBEE,
                unlock_score: 3,
            },
            Minigame::Maze => RewardCurve {
                skill: skills::PUZZLE,
                unlock_score: 10,
            },
            Minigame::Race => RewardCurve {
                skill: skills::AGILITY,
                unlock_score: 10,
            },
        }
    }

    /// Levels a known skill gains for `score`.
    fn skill_gain(self, score: u32) -> u32 {
        match self {
            Minigame::Fetch => score / 5,
            // Maze insight saturates at 10 points, three per level
            Minigame::Maze => (score / 5).min(10) / 3,
            Minigame::Race => score / 20,
        }
    }

    /// (happiness gain, energy cost, affection gain) for `score`.
    fn gains(self, score: u32) -> (u32, u32, u32) {
        let double = score.saturating_mul(2);
        match self {
            Minigame::Fetch => (double.min(30), double.saturating_add(20).min(40), score.min(15)),
            Minigame::Maze => (score.min(20), score.saturating_add(15).min(30), (score / 2).min(10)),
            Minigame::Race => ((score / 5).min(20), (score / 5 + 10).min(30), 0),
        }
    }
}

/// Payload a minigame hands back when a round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinigameReward {
    pub game: Minigame,
    pub score: u32,
}

/// What a reward changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardReport {
    pub game: Minigame,
    pub score: u32,
    pub happiness_gained: f64,
    pub energy_spent: f64,
    /// Skill whose level changed, with its new level.
    pub skill_change: Option<(String, u8)>,
    pub level_ups: u32,
    pub message: String,
}

/// Apply a finished round to the pet.
pub fn apply_reward(pet: &mut Pet, reward: MinigameReward, rules: &Ruleset) -> RewardReport {
    let MinigameReward { game, score } = reward;
    let curve = game.curve();
    let (happiness, energy, affection) = game.gains(score);

    let current = pet.skills.level(curve.skill);
    let skill_change = if current == 0 {
        (score >= curve.unlock_score).then(|| {
            pet.skills.set(curve.skill, 1);
            (curve.skill.to_string(), 1)
        })
    } else {
        let gain = game.skill_gain(score);
        let target = (u32::from(current) + gain).min(u32::from(MAX_SKILL_LEVEL));
        (target > u32::from(current)).then(|| {
            let level = pet.skills.raise(curve.skill, (target - u32::from(current)) as u8);
            (curve.skill.to_string(), level)
        })
    };

    let happiness_gained = pet
        .attributes
        .adjust(Attribute::Happiness, f64::from(happiness));
    let energy_spent = -pet.attributes.adjust(Attribute::Energy, -f64::from(energy));
    pet.adjust_affection(f64::from(affection));
    let exp = score.saturating_mul(2).min(MAX_ROUND_EXP);
    let level_ups = progression::add_experience(pet, f64::from(exp), &rules.config.progression);
    pet.last_interaction = pet.last_update_time;

    let mut message = format!("{}玩了{}，得分{}！", pet.name, game.name(), score);
    if let Some((skill, level)) = &skill_change {
        message.push_str(&format!("{skill}技能达到{level}级。"));
    }
    log::debug!("{} finished {:?} with score {}", pet.name, game, score);

    RewardReport {
        game,
        score,
        happiness_gained,
        energy_spent,
        skill_change,
        level_ups,
        message,
    }
}
