//! Read-only environment modifiers.
//!
//! Weather, season and time of day are owned by an outside subsystem. The
//! simulation only reads them as multipliers on decay; the default
//! environment is neutral, so decay is fully defined without one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl Weather {
    /// Parse a weather name; unknown names fall back to sunny.
    pub fn from_name(name: &str) -> Self {
        match name {
            "cloudy" => Weather::Cloudy,
            "rainy" => Weather::Rainy,
            "snowy" => Weather::Snowy,
            _ => Weather::Sunny,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Parse a season name; unknown names fall back to spring.
    pub fn from_name(name: &str) -> Self {
        match name {
            "summer" => Season::Summer,
            "autumn" => Season::Autumn,
            "winter" => Season::Winter,
            _ => Season::Spring,
        }
    }
}

/// Snapshot of the outside world as seen by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub weather: Weather,
    pub season: Season,
    pub is_day: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            weather: Weather::Sunny,
            season: Season::Spring,
            is_day: true,
        }
    }
}

/// Multipliers applied on top of breed and personality decay rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayModifiers {
    pub hunger: f64,
    pub happiness: f64,
    pub cleanliness: f64,
    pub energy: f64,
}

impl Default for DecayModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl DecayModifiers {
    pub const NEUTRAL: DecayModifiers = DecayModifiers {
        hunger: 1.0,
        happiness: 1.0,
        cleanliness: 1.0,
        energy: 1.0,
    };
}

impl Environment {
    pub fn modifiers(&self) -> DecayModifiers {
        let mut m = DecayModifiers::NEUTRAL;

        // Wet weather muddies the coat
        if matches!(self.weather, Weather::Rainy | Weather::Snowy) {
            m.cleanliness *= 1.5;
        }
        // Cold drains energy
        if self.weather == Weather::Snowy || self.season == Season::Winter {
            m.energy *= 1.2;
        }
        if self.season == Season::Summer {
            m.hunger *= 1.1;
        }
        // Nights are quiet: boredom sets in slower
        if !self.is_day {
            m.happiness *= 0.8;
        }
        m
    }
}
