//! Breed and personality modifiers.
//!
//! Traits are plain data looked up by name. Unknown breeds or personalities
//! resolve to neutral modifiers instead of failing, so a pet created with an
//! unrecognised breed still simulates with the base rates.
//!
//! Decay convention: every rate here MULTIPLIES the base decay. A
//! `hunger_rate` of 1.5 makes a pet get hungry 50% faster.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Modifiers contributed by a breed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreedTraits {
    /// Multiplier on hunger decay.
    pub hunger_rate: f64,
}

impl Default for BreedTraits {
    fn default() -> Self {
        Self { hunger_rate: 1.0 }
    }
}

/// Modifiers contributed by a personality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    /// Multiplier on happiness decay.
    pub happiness_decay: f64,
    /// Multiplier on energy decay.
    pub energy_decay: f64,
    /// Happiness gained from being petted.
    pub pet_bonus: f64,
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self {
            happiness_decay: 1.0,
            energy_decay: 1.0,
            pet_bonus: 10.0,
        }
    }
}

/// Data-driven lookup from breed/personality name to modifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitTable {
    breeds: HashMap<String, BreedTraits>,
    personalities: HashMap<String, PersonalityTraits>,
    #[serde(default)]
    fallback_breed: BreedTraits,
    #[serde(default)]
    fallback_personality: PersonalityTraits,
}

/// Standard breeds and their hunger multiplier.
const STANDARD_BREEDS: [(&str, f64); 6] = [
    ("拉布拉多", 1.2),
    ("柯基", 0.8),
    ("哈士奇", 1.5),
    ("金毛", 1.3),
    ("边牧", 1.1),
    ("柴犬", 1.0),
];

/// Standard personalities: (name, happiness_decay, energy_decay, pet_bonus).
const STANDARD_PERSONALITIES: [(&str, f64, f64, f64); 6] = [
    ("活泼", 0.8, 1.2, 10.0),
    ("温顺", 1.0, 0.8, 10.0),
    ("机警", 1.1, 1.0, 10.0),
    ("粘人", 1.2, 1.0, 15.0),
    ("独立", 0.7, 0.9, 5.0),
    ("顽皮", 0.9, 1.3, 10.0),
];

impl TraitTable {
    /// Empty table: every lookup returns the neutral fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in breed and personality set.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (name, hunger_rate) in STANDARD_BREEDS {
            table.insert_breed(name, BreedTraits { hunger_rate });
        }
        for (name, happiness_decay, energy_decay, pet_bonus) in STANDARD_PERSONALITIES {
            table.insert_personality(
                name,
                PersonalityTraits {
                    happiness_decay,
                    energy_decay,
                    pet_bonus,
                },
            );
        }
        table
    }

    pub fn insert_breed(&mut self, name: impl Into<String>, traits: BreedTraits) {
        self.breeds.insert(name.into(), traits);
    }

    pub fn insert_personality(&mut self, name: impl Into<String>, traits: PersonalityTraits) {
        self.personalities.insert(name.into(), traits);
    }

    /// Look up a breed, falling back to neutral modifiers.
    pub fn breed(&self, name: &str) -> &BreedTraits {
        self.breeds.get(name).unwrap_or(&self.fallback_breed)
    }

    /// Look up a personality, falling back to neutral modifiers.
    pub fn personality(&self, name: &str) -> &PersonalityTraits {
        self.personalities
            .get(name)
            .unwrap_or(&self.fallback_personality)
    }

    pub fn has_breed(&self, name: &str) -> bool {
        self.breeds.contains_key(name)
    }

    pub fn has_personality(&self, name: &str) -> bool {
        self.personalities.contains_key(name)
    }

    /// Breed names, sorted.
    pub fn breed_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.breeds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Personality names, sorted.
    pub fn personality_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.personalities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_lookups() {
        let table = TraitTable::standard();
        assert!((table.breed("哈士奇").hunger_rate - 1.5).abs() < f64::EPSILON);
        assert!((table.personality("粘人").pet_bonus - 15.0).abs() < f64::EPSILON);
        assert!((table.personality("独立").happiness_decay - 0.7).abs() < f64::EPSILON);
        assert_eq!(table.breed_names().len(), 6);
        assert_eq!(table.personality_names().len(), 6);
    }

    #[test]
    fn unknown_names_fall_back_to_neutral() {
        let table = TraitTable::standard();
        assert_eq!(*table.breed("狼"), BreedTraits::default());
        assert_eq!(*table.personality("暴躁"), PersonalityTraits::default());
        assert!(!table.has_breed("狼"));
    }

    #[test]
    fn table_is_open_to_extension() {
        let mut table = TraitTable::standard();
        table.insert_breed("萨摩耶", BreedTraits { hunger_rate: 1.25 });
        assert!(table.has_breed("萨摩耶"));
        assert!((table.breed("萨摩耶").hunger_rate - 1.25).abs() < f64::EPSILON);
    }
}
