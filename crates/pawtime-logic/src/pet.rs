//! The pet aggregate root.

use crate::attributes::{clamp_attr, AttributeSet};
use crate::growth::GrowthStage;
use crate::skills::SkillBook;

/// Affection a freshly adopted pet starts with.
pub const DEFAULT_AFFECTION: f64 = 50.0;

/// Identity given to a pet adopted without one (first launch, lost save).
pub const DEFAULT_NAME: &str = "小狗";
pub const DEFAULT_BREED: &str = "柯基";
pub const DEFAULT_PERSONALITY: &str = "活泼";

/// Full simulation state of one pet.
///
/// A pet is owned by whichever host holds its name as identity key. It is
/// mutated only through [`crate::actions`], [`crate::decay`],
/// [`crate::minigame`] and [`crate::progression`]; `growth_stage` is
/// written only by [`crate::growth::recompute`]. Attributes and affection
/// are bounded, so outside the crate they are written only through the
/// clamping setters.
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub name: String,
    pub breed: String,
    pub personality: String,
    pub(crate) attributes: AttributeSet,
    /// Game days since adoption. Never decreases.
    pub age: f64,
    pub level: u32,
    /// Experience toward the next level; holds only the remainder after a
    /// level-up.
    pub experience: f64,
    pub(crate) growth_stage: GrowthStage,
    /// Slow-moving relationship score in `[0, 100]`.
    pub(crate) affection: f64,
    pub skills: SkillBook,
    pub is_sleeping: bool,
    /// Absolute timestamp (seconds) at which a sleeping pet wakes.
    pub sleep_until: f64,
    /// Timestamp (seconds) of the last applied tick. Doubles as the pet's
    /// clock for actions that need "now".
    pub last_update_time: f64,
    /// Timestamp (seconds) of the last applied interaction: an action, a
    /// minigame reward, or adoption.
    pub last_interaction: f64,
    /// Timestamp (seconds) of adoption.
    pub created_at: f64,
}

impl Pet {
    /// Adopt a new pet at timestamp `now` with default attributes.
    pub fn new(
        name: impl Into<String>,
        breed: impl Into<String>,
        personality: impl Into<String>,
        now: f64,
    ) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
            personality: personality.into(),
            attributes: AttributeSet::full(),
            age: 0.0,
            level: 1,
            experience: 0.0,
            growth_stage: GrowthStage::Puppy,
            affection: DEFAULT_AFFECTION,
            skills: SkillBook::new(),
            is_sleeping: false,
            sleep_until: 0.0,
            last_update_time: now,
            last_interaction: now,
            created_at: now,
        }
    }

    /// Adopt the default pet at `now`.
    pub fn adopt_default(now: f64) -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_BREED, DEFAULT_PERSONALITY, now)
    }

    pub fn growth_stage(&self) -> GrowthStage {
        self.growth_stage
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Mutable access for clamped writes via [`AttributeSet::set`] and
    /// [`AttributeSet::adjust`].
    pub fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.attributes
    }

    pub fn affection(&self) -> f64 {
        self.affection
    }

    /// Adjust affection, clamped to `[0, 100]`.
    pub fn adjust_affection(&mut self, delta: f64) {
        self.affection = clamp_attr(self.affection + delta);
    }

    /// Set affection, clamped to `[0, 100]`.
    pub fn set_affection(&mut self, value: f64) {
        self.affection = clamp_attr(value);
    }

    /// Real hours since the last interaction, measured on the pet's clock.
    pub fn hours_alone(&self) -> f64 {
        ((self.last_update_time - self.last_interaction) / 3600.0).max(0.0)
    }

    /// True when every invariant of the aggregate holds.
    pub fn is_consistent(&self) -> bool {
        self.attributes.in_bounds()
            && (0.0..=100.0).contains(&self.affection)
            && self.skills.in_bounds()
            && self.level >= 1
            && self.experience >= 0.0
            && self.age >= 0.0
            && self.sleep_until.is_finite()
            && self.last_update_time.is_finite()
    }
}
