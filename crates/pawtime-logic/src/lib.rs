//! Pure simulation logic for Pawtime.
//!
//! This crate contains all pet logic that is independent of any storage,
//! transport, or rendering layer. Functions take plain data plus a
//! [`Ruleset`](rules::Ruleset) and mutate a single [`Pet`](pet::Pet), making
//! them unit-testable and usable from a web handler, a desktop loop, or the
//! headless harness alike.
//!
//! Every operation is synchronous and all-or-nothing for one pet. Callers
//! own the locking discipline: one writer per pet at a time.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actions`] | Feed / play / bath / sleep / train / pet / perform resolution |
//! | [`attributes`] | The five clamped core attributes |
//! | [`codec`] | Versioned `PetRecord` and validating encode / decode |
//! | [`config`] | Tunable rate table (decay, growth, progression, training) |
//! | [`decay`] | Elapsed-time decay, secondary health effects, lazy wake-up |
//! | [`environment`] | Read-only weather/season multipliers on decay |
//! | [`growth`] | Age → growth stage and one-time stage bonuses |
//! | [`minigame`] | End-of-round reward payloads from fetch / maze / race |
//! | [`pet`] | The pet aggregate and its defaults |
//! | [`progression`] | Experience accumulation and multi-level level-ups |
//! | [`rules`] | Config + trait table bundle passed into every operation |
//! | [`skills`] | Skill book, trainable set, probabilistic training |
//! | [`status`] | Read-only status snapshot, rating bands, mood |
//! | [`traits`] | Breed and personality modifier lookup |
//!
//! # Example
//!
//! ```
//! use pawtime_logic::actions::{resolve, Action, Food};
//! use pawtime_logic::decay::advance;
//! use pawtime_logic::pet::Pet;
//! use pawtime_logic::rules::Ruleset;
//!
//! let rules = Ruleset::standard();
//! let mut rng = rand::thread_rng();
//! let mut pet = Pet::new("旺财", "柯基", "活泼", 0.0);
//!
//! advance(&mut pet, 600.0, &rules);
//! let report = resolve(&mut pet, Action::Feed(Food::Regular), &rules, &mut rng);
//! println!("{}", report.message);
//! ```

pub mod actions;
pub mod attributes;
pub mod codec;
pub mod config;
pub mod decay;
pub mod environment;
pub mod growth;
pub mod minigame;
pub mod pet;
pub mod progression;
pub mod rules;
pub mod skills;
pub mod status;
pub mod traits;
