//! Read-only status snapshot for display layers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::attributes::{Attribute, AttributeSet};
use crate::growth::GrowthStage;
use crate::pet::Pet;
use crate::progression;
use crate::rules::Ruleset;

/// Coarse band for one attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    Terrible,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Rating {
    pub fn for_value(value: f64) -> Self {
        match value {
            v if v >= 80.0 => Rating::Excellent,
            v if v >= 60.0 => Rating::Good,
            v if v >= 40.0 => Rating::Fair,
            v if v >= 20.0 => Rating::Poor,
            _ => Rating::Terrible,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "优秀",
            Rating::Good => "良好",
            Rating::Fair => "一般",
            Rating::Poor => "较差",
            Rating::Terrible => "糟糕",
        }
    }
}

/// Dominant mood, derived from attributes in a fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mood {
    Sleeping,
    Hungry,
    Tired,
    Sad,
    Angry,
    Excited,
    Happy,
    Calm,
}

/// Hours without interaction before a pet starts to miss its owner.
pub const LONELY_AFTER_HOURS: f64 = 1.0;
/// Hours without interaction after which a pet is simply sad.
pub const ABANDONED_AFTER_HOURS: f64 = 24.0;
/// A resentful pet (affection below this) sulks instead of moping.
const RESENTFUL_AFFECTION: f64 = 30.0;

impl Mood {
    pub fn of(pet: &Pet) -> Self {
        Emotion::of(pet).mood
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Sleeping => "睡觉中",
            Mood::Hungry => "饥饿",
            Mood::Tired => "疲惫",
            Mood::Sad => "难过",
            Mood::Angry => "生气",
            Mood::Excited => "兴奋",
            Mood::Happy => "开心",
            Mood::Calm => "平静",
        }
    }
}

/// A mood with its intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Emotion {
    pub mood: Mood,
    pub intensity: f64,
}

impl Emotion {
    /// Read the pet's emotion at its own clock.
    ///
    /// Neglect outranks the attribute ladder: after an hour alone the pet
    /// misses its owner, and past a day it is sad whatever its needs.
    /// Personality tints the result.
    pub fn of(pet: &Pet) -> Self {
        let a = pet.attributes();
        let hours = pet.hours_alone();

        let emotion = if pet.is_sleeping {
            Self::new(Mood::Sleeping, 0.5)
        } else if hours > ABANDONED_AFTER_HOURS {
            Self::new(Mood::Sad, hours / (2.0 * ABANDONED_AFTER_HOURS))
        } else if hours > LONELY_AFTER_HOURS {
            Self::new(sulk_or_mope(pet), hours / ABANDONED_AFTER_HOURS)
        } else if a.hunger() < 30.0 {
            Self::new(Mood::Hungry, (30.0 - a.hunger()) / 30.0)
        } else if a.energy() < 20.0 {
            Self::new(Mood::Tired, (20.0 - a.energy()) / 20.0)
        } else if a.happiness() < 30.0 {
            Self::new(sulk_or_mope(pet), (30.0 - a.happiness()) / 30.0)
        } else if a.happiness() > 80.0 {
            let intensity = (a.happiness() - 80.0) / 20.0;
            let mood = if intensity > 0.5 { Mood::Excited } else { Mood::Happy };
            Self::new(mood, intensity)
        } else {
            Self::new(Mood::Calm, 0.5)
        };
        emotion.tinted(&pet.personality)
    }

    fn new(mood: Mood, intensity: f64) -> Self {
        Self {
            mood,
            intensity: intensity.clamp(0.0, 1.0),
        }
    }

    fn tinted(self, personality: &str) -> Self {
        let mood = match (personality, self.mood) {
            ("温顺", Mood::Angry) => Mood::Sad,
            ("顽皮", Mood::Happy) => Mood::Excited,
            ("独立", Mood::Excited) => Mood::Happy,
            (_, mood) => mood,
        };
        Self { mood, ..self }
    }

    /// Label with an intensity qualifier, e.g. "非常开心".
    pub fn describe(&self) -> String {
        let qualifier = match self.intensity {
            i if i > 0.8 => "非常",
            i if i > 0.5 => "比较",
            i if i > 0.3 => "有点",
            _ => "",
        };
        format!("{qualifier}{}", self.mood.label())
    }
}

fn sulk_or_mope(pet: &Pet) -> Mood {
    if pet.affection() < RESENTFUL_AFFECTION {
        Mood::Angry
    } else {
        Mood::Sad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetStatus {
    pub name: String,
    pub breed: String,
    pub personality: String,
    pub attributes: AttributeSet,
    pub ratings: BTreeMap<&'static str, Rating>,
    pub age_days: f64,
    pub level: u32,
    pub experience: f64,
    pub next_level_at: f64,
    pub growth_stage: GrowthStage,
    pub affection: f64,
    pub skills: BTreeMap<String, u8>,
    pub is_sleeping: bool,
    pub sleep_until: Option<f64>,
    pub mood: Mood,
    pub mood_intensity: f64,
    /// Mood label with its intensity qualifier.
    pub mood_text: String,
    pub hours_alone: f64,
}

/// Snapshot a pet for display.
pub fn status(pet: &Pet, rules: &Ruleset) -> PetStatus {
    let ratings = Attribute::ALL
        .into_iter()
        .map(|attr| (attr.label(), Rating::for_value(pet.attributes().get(attr))))
        .collect();
    let emotion = Emotion::of(pet);

    PetStatus {
        name: pet.name.clone(),
        breed: pet.breed.clone(),
        personality: pet.personality.clone(),
        attributes: *pet.attributes(),
        ratings,
        age_days: pet.age,
        level: pet.level,
        experience: pet.experience,
        next_level_at: progression::required_for(pet.level, &rules.config.progression),
        growth_stage: pet.growth_stage(),
        affection: pet.affection(),
        skills: pet
            .skills
            .iter()
            .map(|(name, level)| (name.to_string(), level))
            .collect(),
        is_sleeping: pet.is_sleeping,
        sleep_until: pet.is_sleeping.then_some(pet.sleep_until),
        mood: emotion.mood,
        mood_intensity: emotion.intensity,
        mood_text: emotion.describe(),
        hours_alone: pet.hours_alone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands() {
        assert_eq!(Rating::for_value(100.0), Rating::Excellent);
        assert_eq!(Rating::for_value(80.0), Rating::Excellent);
        assert_eq!(Rating::for_value(79.9), Rating::Good);
        assert_eq!(Rating::for_value(40.0), Rating::Fair);
        assert_eq!(Rating::for_value(20.0), Rating::Poor);
        assert_eq!(Rating::for_value(0.0), Rating::Terrible);
        assert_eq!(Rating::Poor.label(), "较差");
    }

    #[test]
    fn mood_priority() {
        let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        assert_eq!(Mood::of(&pet), Mood::Excited);

        pet.attributes.set(Attribute::Happiness, 85.0);
        assert_eq!(Mood::of(&pet), Mood::Happy);

        pet.attributes.set(Attribute::Happiness, 50.0);
        assert_eq!(Mood::of(&pet), Mood::Calm);

        pet.attributes.set(Attribute::Happiness, 10.0);
        pet.attributes.set(Attribute::Energy, 10.0);
        assert_eq!(Mood::of(&pet), Mood::Tired);

        pet.attributes.set(Attribute::Hunger, 10.0);
        assert_eq!(Mood::of(&pet), Mood::Hungry);

        pet.is_sleeping = true;
        assert_eq!(Mood::of(&pet), Mood::Sleeping);
    }

    #[test]
    fn intensity_scales_with_need() {
        let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        pet.attributes.set(Attribute::Hunger, 3.0);
        let e = Emotion::of(&pet);
        assert_eq!(e.mood, Mood::Hungry);
        assert!((e.intensity - 0.9).abs() < 1e-9);
        assert_eq!(e.describe(), "非常饥饿");

        pet.attributes.set(Attribute::Hunger, 50.0);
        pet.attributes.set(Attribute::Happiness, 50.0);
        assert_eq!(Emotion::of(&pet).describe(), "平静");
    }

    #[test]
    fn low_affection_turns_sadness_to_anger() {
        let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        pet.attributes.set(Attribute::Happiness, 10.0);
        assert_eq!(Mood::of(&pet), Mood::Sad);
        pet.set_affection(10.0);
        assert_eq!(Mood::of(&pet), Mood::Angry);

        // Gentle dogs do not get angry
        pet.personality = "温顺".to_string();
        assert_eq!(Mood::of(&pet), Mood::Sad);
    }

    #[test]
    fn personality_tints_joy() {
        let mut playful = Pet::new("皮皮", "柯基", "顽皮", 0.0);
        playful.attributes.set(Attribute::Happiness, 85.0);
        assert_eq!(Mood::of(&playful), Mood::Excited);

        let mut loner = Pet::new("孤孤", "柯基", "独立", 0.0);
        loner.attributes.set(Attribute::Happiness, 100.0);
        assert_eq!(Mood::of(&loner), Mood::Happy);
    }

    #[test]
    fn neglect_outranks_needs() {
        let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        pet.attributes.set(Attribute::Hunger, 10.0);

        // Six hours alone: missing the owner, a quarter intensity
        pet.last_update_time = 6.0 * 3600.0;
        let e = Emotion::of(&pet);
        assert_eq!(e.mood, Mood::Sad);
        assert!((e.intensity - 0.25).abs() < 1e-9);

        pet.set_affection(0.0);
        assert_eq!(Mood::of(&pet), Mood::Angry);

        // Three days alone: sad at full intensity regardless of affection
        pet.last_update_time = 72.0 * 3600.0;
        let e = Emotion::of(&pet);
        assert_eq!(e.mood, Mood::Sad);
        assert_eq!(e.intensity, 1.0);

        // Attention resets the clock
        pet.last_interaction = pet.last_update_time;
        assert_eq!(Mood::of(&pet), Mood::Hungry);
    }

    #[test]
    fn snapshot_reflects_pet() {
        let rules = Ruleset::standard();
        let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        pet.level = 3;
        pet.attributes.set(Attribute::Cleanliness, 35.0);
        pet.skills.set("坐下", 2);

        let s = status(&pet, &rules);
        assert_eq!(s.next_level_at, 300.0);
        assert_eq!(s.skills.get("坐下"), Some(&2));
        assert_eq!(s.ratings.get(Attribute::Cleanliness.label()), Some(&Rating::Poor));
        assert_eq!(s.growth_stage, GrowthStage::Puppy);
        assert_eq!(s.sleep_until, None);
    }
}
