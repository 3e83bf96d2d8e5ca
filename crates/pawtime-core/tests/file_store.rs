//! Integration tests for file-backed persistence and the engine on top.
//!
//! Exercises: FilePetRepository (JSON and bincode) → load_or_adopt →
//! PetEngine restart recovery.

use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use pawtime_core::prelude::*;
use pawtime_core::repository::{load_or_adopt, load_pet, save_pet};
use pawtime_logic::attributes::Attribute;
use pawtime_logic::pet::DEFAULT_BREED;

// ── Helpers ────────────────────────────────────────────────────────────

fn seasoned_pet() -> Pet {
    let mut pet = Pet::new("旺财", "边牧", "机警", 1_000.0);
    pet.attributes_mut().set(Attribute::Hunger, 61.5);
    pet.attributes_mut().set(Attribute::Energy, 12.25);
    pet.experience = 42.0;
    pet.skills.set("坐下", 4);
    pet.is_sleeping = true;
    pet.sleep_until = 9_000.0;
    pet
}

fn engine_at(dir: &TempDir, format: Format) -> PetEngine<StdRng> {
    let repo = FilePetRepository::new(dir.path(), format).unwrap();
    PetEngine::new(Ruleset::standard(), Box::new(repo), StdRng::seed_from_u64(1))
}

// ── Repository ─────────────────────────────────────────────────────────

#[test]
fn file_round_trip_in_both_formats() {
    let rules = Ruleset::standard();
    for format in [Format::Json, Format::Binary] {
        let dir = TempDir::new().unwrap();
        let repo = FilePetRepository::new(dir.path(), format).unwrap();
        let pet = seasoned_pet();

        save_pet(&repo, &pet).unwrap();
        assert!(repo.exists("旺财"));
        assert_eq!(repo.list().unwrap(), vec!["旺财".to_string()]);

        let loaded = load_pet(&repo, "旺财", &rules, 0.0).unwrap();
        assert_eq!(loaded, Some(pet), "{format:?}");
    }
}

#[test]
fn save_replaces_without_leaving_temp_files() {
    let dir = TempDir::new().unwrap();
    let repo = FilePetRepository::new(dir.path(), Format::Json).unwrap();
    let mut pet = seasoned_pet();
    save_pet(&repo, &pet).unwrap();
    pet.level = 9;
    save_pet(&repo, &pet).unwrap();

    let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
    let loaded = load_pet(&repo, "旺财", &Ruleset::standard(), 0.0)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.level, 9);
}

#[test]
fn hand_edited_json_is_repaired() {
    let dir = TempDir::new().unwrap();
    let repo = FilePetRepository::new(dir.path(), Format::Json).unwrap();
    fs::write(
        dir.path().join("豆豆.json"),
        r#"{"name": "豆豆", "hunger": 250, "skills": {"握手": 7}, "last_update_time": 5}"#,
    )
    .unwrap();

    let pet = load_pet(&repo, "豆豆", &Ruleset::standard(), 0.0)
        .unwrap()
        .unwrap();
    assert_eq!(pet.attributes().hunger(), 100.0);
    assert_eq!(pet.skills.level("握手"), 5);
    assert_eq!(pet.last_update_time, 5.0);
}

#[test]
fn corrupt_record_degrades_to_default_pet() {
    let dir = TempDir::new().unwrap();
    let repo = FilePetRepository::new(dir.path(), Format::Json).unwrap();
    fs::write(dir.path().join("旺财.json"), "{ definitely not json").unwrap();

    assert!(load_pet(&repo, "旺财", &Ruleset::standard(), 0.0).is_err());
    let pet = load_or_adopt(&repo, "旺财", &Ruleset::standard(), 77.0);
    assert_eq!(pet.breed, DEFAULT_BREED);
    assert_eq!(pet.last_update_time, 77.0);
}

#[test]
fn future_record_is_rejected() {
    let dir = TempDir::new().unwrap();
    let repo = FilePetRepository::new(dir.path(), Format::Json).unwrap();
    fs::write(dir.path().join("旺财.json"), r#"{"version": 99}"#).unwrap();
    assert!(matches!(
        repo.load("旺财"),
        Err(PersistError::VersionMismatch { found: 99, .. })
    ));
}

// ── Engine restart ─────────────────────────────────────────────────────

#[test]
fn engine_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let engine = engine_at(&dir, Format::Binary);
        engine.adopt("旺财", "金毛", "粘人", 0.0).unwrap();
        engine.act("旺财", Action::Play(Game::ChaseBall), 60.0).unwrap();
    }

    let engine = engine_at(&dir, Format::Binary);
    assert_eq!(engine.names().unwrap(), vec!["旺财".to_string()]);
    let pet = engine.snapshot("旺财", 0.0).unwrap();
    assert_eq!(pet.breed, "金毛");
    assert_eq!(pet.last_update_time, 60.0);
    assert!(pet.attributes().energy() < 100.0);

    // Catch-up after a long absence is one tick
    engine.tick("旺财", 60.0 + 40.0 * 300.0).unwrap();
    assert!((engine.snapshot("旺财", 0.0).unwrap().age - 40.2).abs() < 1e-9);
}

#[test]
fn engine_replaces_unreadable_record() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("旺财.json"), "{ definitely not json").unwrap();
    fs::write(dir.path().join("阿黄.json"), r#"{"version": 99}"#).unwrap();
    let engine = engine_at(&dir, Format::Json);

    engine.act("旺财", Action::Pet, 50.0).unwrap();
    let pet = engine.snapshot("旺财", 50.0).unwrap();
    assert_eq!(pet.breed, DEFAULT_BREED);
    assert_eq!(pet.last_update_time, 50.0);

    // The default pet was written over the garbage
    let repo = FilePetRepository::new(dir.path(), Format::Json).unwrap();
    let loaded = load_pet(&repo, "旺财", &Ruleset::standard(), 0.0).unwrap();
    assert_eq!(loaded.map(|p| p.breed).as_deref(), Some(DEFAULT_BREED));

    // A record from a newer build is left alone
    assert!(matches!(
        engine.tick("阿黄", 50.0),
        Err(PersistError::VersionMismatch { found: 99, .. })
    ));
}

#[test]
fn release_deletes_the_file() {
    let dir = TempDir::new().unwrap();
    let engine = engine_at(&dir, Format::Json);
    engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
    assert!(dir.path().join("旺财.json").exists());
    engine.release("旺财").unwrap();
    assert!(!dir.path().join("旺财.json").exists());
}
