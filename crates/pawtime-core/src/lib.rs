//! Pawtime Core - pet storage and host engine
//!
//! Wraps the pure rules in `pawtime-logic` with everything a long-running
//! host needs: durable records, a keyed store of live pets, and an engine
//! that ticks pets to wall time before routing each action.
//!
//! # Architecture
//!
//! - **Persistence**: `PetRecord` to and from JSON or bincode bytes, with a
//!   schema version check
//! - **Repository**: where records live (one file per pet, or memory)
//! - **Registry**: live pets keyed by name, one lock per pet
//! - **Engine**: tick, act, reward and persist, in that order
//!
//! # Example
//!
//! ```rust,no_run
//! use pawtime_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let repo = FilePetRepository::new("data/saves", Format::Json).unwrap();
//! let engine = PetEngine::new(Ruleset::standard(), Box::new(repo), rand::rngs::StdRng::from_entropy());
//!
//! engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
//! let report = engine.act("旺财", Action::Feed(Food::Premium), 600.0).unwrap();
//! println!("{}", report.message);
//! ```

pub mod engine;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod repository;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::PetEngine;
    pub use crate::error::{PersistError, Result};
    pub use crate::persistence::Format;
    pub use crate::repository::{FilePetRepository, MemoryPetRepository, PetRepository};
    pub use pawtime_logic::actions::{Action, ActionReport, Food, Game};
    pub use pawtime_logic::environment::Environment;
    pub use pawtime_logic::minigame::{Minigame, MinigameReward};
    pub use pawtime_logic::pet::Pet;
    pub use pawtime_logic::rules::Ruleset;
    pub use pawtime_logic::status::PetStatus;
}
