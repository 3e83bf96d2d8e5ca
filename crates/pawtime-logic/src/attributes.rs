//! The five core attributes of a pet.
//!
//! All values live in `[0, 100]` and "worse" is always toward 0: a hunger
//! of 0 means starving, a cleanliness of 0 means filthy. Every mutation
//! goes through [`AttributeSet::adjust`] or [`AttributeSet::set`], which
//! clamp, so no caller can push a value out of range.

use serde::{Deserialize, Serialize};

/// Lower bound of every core attribute.
pub const ATTR_MIN: f64 = 0.0;
/// Upper bound of every core attribute.
pub const ATTR_MAX: f64 = 100.0;

/// Core attribute identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Hunger,
    Happiness,
    Health,
    Cleanliness,
    Energy,
}

impl Attribute {
    /// All core attributes in display order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Hunger,
        Attribute::Happiness,
        Attribute::Health,
        Attribute::Cleanliness,
        Attribute::Energy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Attribute::Hunger => "饱食度",
            Attribute::Happiness => "快乐度",
            Attribute::Health => "健康值",
            Attribute::Cleanliness => "清洁度",
            Attribute::Energy => "精力值",
        }
    }
}

/// Clamp a value into the attribute range. Non-finite input becomes 0.
pub fn clamp_attr(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(ATTR_MIN, ATTR_MAX)
    } else {
        ATTR_MIN
    }
}

/// Mutable numeric state of one pet.
///
/// Fields are private: reads go through the accessors, writes through
/// [`AttributeSet::set`] and [`AttributeSet::adjust`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributeSet {
    hunger: f64,
    happiness: f64,
    health: f64,
    cleanliness: f64,
    energy: f64,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::full()
    }
}

impl AttributeSet {
    /// Every attribute at its maximum.
    pub fn full() -> Self {
        Self {
            hunger: ATTR_MAX,
            happiness: ATTR_MAX,
            health: ATTR_MAX,
            cleanliness: ATTR_MAX,
            energy: ATTR_MAX,
        }
    }

    /// Build a set from stored values in [`Attribute::ALL`] order, clamping
    /// each one. Also returns the attributes that needed clamping.
    pub fn from_stored(values: [f64; 5]) -> (Self, Vec<Attribute>) {
        let [hunger, happiness, health, cleanliness, energy] = values;
        let mut attrs = Self {
            hunger,
            happiness,
            health,
            cleanliness,
            energy,
        };
        let corrected = attrs.clamp_all();
        (attrs, corrected)
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn cleanliness(&self) -> f64 {
        self.cleanliness
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn get(&self, attr: Attribute) -> f64 {
        match attr {
            Attribute::Hunger => self.hunger,
            Attribute::Happiness => self.happiness,
            Attribute::Health => self.health,
            Attribute::Cleanliness => self.cleanliness,
            Attribute::Energy => self.energy,
        }
    }

    fn slot(&mut self, attr: Attribute) -> &mut f64 {
        match attr {
            Attribute::Hunger => &mut self.hunger,
            Attribute::Happiness => &mut self.happiness,
            Attribute::Health => &mut self.health,
            Attribute::Cleanliness => &mut self.cleanliness,
            Attribute::Energy => &mut self.energy,
        }
    }

    /// Set an attribute (clamped to 0–100).
    pub fn set(&mut self, attr: Attribute, value: f64) {
        *self.slot(attr) = clamp_attr(value);
    }

    /// Add `delta` to an attribute and clamp. Returns the applied change,
    /// which may be smaller than `delta` when the value saturates.
    pub fn adjust(&mut self, attr: Attribute, delta: f64) -> f64 {
        let slot = self.slot(attr);
        let before = *slot;
        *slot = clamp_attr(before + delta);
        *slot - before
    }

    /// Raise every attribute by `amount`, clamped at the maximum.
    pub fn restore_all(&mut self, amount: f64) {
        for attr in Attribute::ALL {
            self.adjust(attr, amount);
        }
    }

    /// Force every attribute back into range. Returns the attributes that
    /// had to be corrected.
    pub fn clamp_all(&mut self) -> Vec<Attribute> {
        let mut corrected = Vec::new();
        for attr in Attribute::ALL {
            let value = self.get(attr);
            let clamped = clamp_attr(value);
            if value != clamped {
                self.set(attr, clamped);
                corrected.push(attr);
            }
        }
        corrected
    }

    /// True when every attribute is inside `[0, 100]`.
    pub fn in_bounds(&self) -> bool {
        Attribute::ALL
            .iter()
            .all(|a| (ATTR_MIN..=ATTR_MAX).contains(&self.get(*a)))
    }
}
