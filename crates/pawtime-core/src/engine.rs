//! Host engine - ticks, routes and persists pets

use std::sync::{Mutex, PoisonError, RwLock};

use rand::Rng;

use pawtime_logic::actions::{self, Action, ActionReport};
use pawtime_logic::decay::{self, TickOutcome};
use pawtime_logic::environment::Environment;
use pawtime_logic::minigame::{self, MinigameReward, RewardReport};
use pawtime_logic::pet::Pet;
use pawtime_logic::rules::Ruleset;
use pawtime_logic::status::{self, PetStatus};

use crate::error::{PersistError, Result};
use crate::registry::{self, PetHandle, PetRegistry};
use crate::repository::{self, PetRepository};

/// Owns the rules, the live pets and their storage.
///
/// Every operation takes the caller's wall clock `now` (seconds). Before an
/// action runs, the pet is advanced to `now`, so actions see fresh state
/// and sleep timers resolve lazily. After any change the pet is saved; if
/// the save fails the pet is put back as it was and the error returned.
///
/// Lock order is always pet, then random source.
pub struct PetEngine<R: Rng> {
    rules: Ruleset,
    environment: RwLock<Environment>,
    registry: PetRegistry,
    repository: Box<dyn PetRepository>,
    rng: Mutex<R>,
}

impl<R: Rng> PetEngine<R> {
    pub fn new(rules: Ruleset, repository: Box<dyn PetRepository>, rng: R) -> Self {
        Self {
            rules,
            environment: RwLock::new(Environment::default()),
            registry: PetRegistry::new(),
            repository,
            rng: Mutex::new(rng),
        }
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn environment(&self) -> Environment {
        *self.environment.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the environment used by subsequent ticks.
    pub fn set_environment(&self, env: Environment) {
        *self.environment.write().unwrap_or_else(PoisonError::into_inner) = env;
    }

    /// Adopt a new pet and save it. Fails if the name is taken, live or
    /// stored.
    pub fn adopt(&self, name: &str, breed: &str, personality: &str, now: f64) -> Result<PetStatus> {
        let duplicate = || PersistError::DuplicatePet(name.to_string());
        if self.repository.exists(name) {
            return Err(duplicate());
        }
        if !self.rules.traits.has_breed(breed) {
            log::debug!("unknown breed {breed:?}, using neutral traits");
        }
        if !self.rules.traits.has_personality(personality) {
            log::debug!("unknown personality {personality:?}, using neutral traits");
        }

        let pet = Pet::new(name, breed, personality, now);
        let snapshot = status::status(&pet, &self.rules);
        let handle = self.registry.insert_new(pet).ok_or_else(duplicate)?;

        let saved = repository::save_pet(self.repository.as_ref(), &registry::lock(&handle));
        if let Err(e) = saved {
            self.registry.remove(name);
            return Err(e);
        }
        log::info!("adopted {name} ({breed}, {personality})");
        Ok(snapshot)
    }

    /// Bring a pet into memory, adopting a default one when its record is
    /// missing or unreadable. The desktop front-end starts this way.
    pub fn open(&self, name: &str, now: f64) -> Result<PetStatus> {
        let handle = self.registry.get_or_try_insert_with::<PersistError>(name, || {
            Ok(repository::load_or_adopt(
                self.repository.as_ref(),
                name,
                &self.rules,
                now,
            ))
        })?;
        let pet = registry::lock(&handle);
        Ok(status::status(&pet, &self.rules))
    }

    /// Advance a pet to `now`, resolve an action, then save.
    pub fn act(&self, name: &str, action: Action, now: f64) -> Result<ActionReport> {
        let handle = self.handle(name, now)?;
        let mut pet = registry::lock(&handle);

        let before = pet.clone();

        decay::advance_to(&mut pet, now, &self.rules, &self.environment());
        let report = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            actions::resolve(&mut pet, action, &self.rules, &mut *rng)
        };
        self.commit(&mut pet, before, report)
    }

    /// Apply a minigame's end-of-round reward.
    pub fn reward(&self, name: &str, reward: MinigameReward, now: f64) -> Result<RewardReport> {
        let handle = self.handle(name, now)?;
        let mut pet = registry::lock(&handle);

        let before = pet.clone();

        decay::advance_to(&mut pet, now, &self.rules, &self.environment());
        let report = minigame::apply_reward(&mut pet, reward, &self.rules);
        self.commit(&mut pet, before, report)
    }

    /// Advance one pet to `now` and save it.
    pub fn tick(&self, name: &str, now: f64) -> Result<TickOutcome> {
        let handle = self.handle(name, now)?;
        let mut pet = registry::lock(&handle);
        let before = pet.clone();
        let outcome = decay::advance_to(&mut pet, now, &self.rules, &self.environment());
        self.commit(&mut pet, before, outcome)
    }

    /// Advance every live pet to `now`. A pet whose save fails keeps its
    /// previous state; its error is reported alongside the others.
    pub fn tick_all(&self, now: f64) -> Vec<(String, Result<TickOutcome>)> {
        let env = self.environment();
        self.registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let handle = self.registry.get(&name)?;
                let mut pet = registry::lock(&handle);
                let before = pet.clone();
                let outcome = decay::advance_to(&mut pet, now, &self.rules, &env);
                let result = self.commit(&mut pet, before, outcome);
                if let Err(e) = &result {
                    log::warn!("failed to save {name} after tick: {e}");
                }
                drop(pet);
                Some((name, result))
            })
            .collect()
    }

    /// Read-only snapshot. Does not advance the pet; `now` only seeds the
    /// clock of a pet loaded cold from a record that lacks one.
    pub fn status(&self, name: &str, now: f64) -> Result<PetStatus> {
        let handle = self.handle(name, now)?;
        let pet = registry::lock(&handle);
        Ok(status::status(&pet, &self.rules))
    }

    /// A copy of the pet's full state. `now` is used as in [`Self::status`].
    pub fn snapshot(&self, name: &str, now: f64) -> Result<Pet> {
        let handle = self.handle(name, now)?;
        let pet = registry::lock(&handle);
        Ok(pet.clone())
    }

    /// Persist every live pet.
    pub fn save_all(&self) -> Result<()> {
        for name in self.registry.names() {
            if let Some(handle) = self.registry.get(&name) {
                let pet = registry::lock(&handle);
                repository::save_pet(self.repository.as_ref(), &pet)?;
            }
        }
        Ok(())
    }

    /// Forget a pet and delete its record.
    pub fn release(&self, name: &str) -> Result<()> {
        let live = self.registry.remove(name).is_some();
        if !live && !self.repository.exists(name) {
            return Err(PersistError::UnknownPet(name.to_string()));
        }
        self.repository.delete(name)?;
        log::info!("released {name}");
        Ok(())
    }

    /// Names of every pet, live or stored.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = self.repository.list()?;
        names.extend(self.registry.names());
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Save `pet`, or restore `before` and return the error.
    fn commit<T>(&self, pet: &mut Pet, before: Pet, value: T) -> Result<T> {
        match repository::save_pet(self.repository.as_ref(), pet) {
            Ok(()) => Ok(value),
            Err(e) => {
                log::warn!("failed to save {}, change rolled back: {e}", pet.name);
                *pet = before;
                Err(e)
            }
        }
    }

    /// The live handle for `name`, loading its record on first use.
    ///
    /// A record that exists but cannot be decoded is replaced by a default
    /// pet, as [`Self::open`] does. A missing record is an error, and so is
    /// one written by a newer build.
    fn handle(&self, name: &str, now: f64) -> Result<PetHandle> {
        self.registry.get_or_try_insert_with(name, || {
            match repository::load_pet(self.repository.as_ref(), name, &self.rules, now) {
                Ok(Some(pet)) => Ok(pet),
                Ok(None) => Err(PersistError::UnknownPet(name.to_string())),
                Err(e @ (PersistError::Json(_) | PersistError::Binary(_))) => {
                    log::warn!("record for {name:?} is unreadable, adopting a new one: {e}");
                    Ok(repository::adopt_default(name, now))
                }
                Err(e) => Err(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryPetRepository;
    use pawtime_logic::actions::{Food, Game, Outcome, Refusal};
    use pawtime_logic::codec::{self, PetRecord};
    use pawtime_logic::minigame::Minigame;
    use rand::rngs::mock::StepRng;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn engine() -> PetEngine<StepRng> {
        engine_over(MemoryPetRepository::new())
    }

    fn engine_over(repo: impl PetRepository + 'static) -> PetEngine<StepRng> {
        PetEngine::new(Ruleset::standard(), Box::new(repo), StepRng::new(0, 0))
    }

    /// Accepts a fixed number of saves, then fails every later one.
    struct FailingRepository {
        inner: MemoryPetRepository,
        saves_left: AtomicUsize,
    }

    impl FailingRepository {
        fn after(saves: usize) -> Self {
            Self {
                inner: MemoryPetRepository::new(),
                saves_left: AtomicUsize::new(saves),
            }
        }
    }

    impl PetRepository for FailingRepository {
        fn save(&self, name: &str, record: &PetRecord) -> Result<()> {
            let left = self
                .saves_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if left.is_err() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.save(name, record)
        }

        fn load(&self, name: &str) -> Result<Option<PetRecord>> {
            self.inner.load(name)
        }

        fn exists(&self, name: &str) -> bool {
            self.inner.exists(name)
        }

        fn delete(&self, name: &str) -> Result<()> {
            self.inner.delete(name)
        }

        fn list(&self) -> Result<Vec<String>> {
            self.inner.list()
        }
    }

    #[test]
    fn adopt_then_act() {
        let engine = engine();
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();

        // Still full right after adoption
        let report = engine.act("旺财", Action::Feed(Food::Regular), 0.0).unwrap();
        assert_eq!(report.outcome, Outcome::Refused(Refusal::AlreadyFull));

        // Ten game days later: hunger 92, energy 94
        let report = engine.act("旺财", Action::Feed(Food::Regular), 3_000.0).unwrap();
        assert_eq!(report.outcome, Outcome::Applied);
        let pet = engine.snapshot("旺财", 0.0).unwrap();
        assert_eq!(pet.attributes().hunger(), 100.0);
        assert!((pet.attributes().energy() - 89.0).abs() < 1e-9);
        assert_eq!(pet.last_update_time, 3_000.0);
    }

    #[test]
    fn duplicate_and_unknown_names() {
        let engine = engine();
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
        assert!(matches!(
            engine.adopt("旺财", "柴犬", "温顺", 0.0),
            Err(PersistError::DuplicatePet(_))
        ));
        assert!(matches!(
            engine.act("无名", Action::Pet, 0.0),
            Err(PersistError::UnknownPet(_))
        ));
        assert!(matches!(engine.release("无名"), Err(PersistError::UnknownPet(_))));
    }

    #[test]
    fn sleeping_pet_wakes_on_later_action() {
        let engine = engine();
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
        engine.act("旺财", Action::Play(Game::TugOfWar), 0.0).unwrap();
        engine.act("旺财", Action::Play(Game::TugOfWar), 0.0).unwrap();
        let report = engine.act("旺财", Action::Sleep { hours: 1.0 }, 0.0).unwrap();
        assert_eq!(report.outcome, Outcome::Applied);

        let report = engine.act("旺财", Action::Pet, 1_800.0).unwrap();
        assert_eq!(report.outcome, Outcome::Muted);

        let report = engine.act("旺财", Action::Pet, 3_601.0).unwrap();
        assert_eq!(report.outcome, Outcome::Applied);
        assert!(!engine.snapshot("旺财", 0.0).unwrap().is_sleeping);
    }

    #[test]
    fn reward_and_status() {
        let engine = engine();
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
        engine
            .reward("旺财", MinigameReward { game: Minigame::Fetch, score: 5 }, 0.0)
            .unwrap();
        let status = engine.status("旺财", 0.0).unwrap();
        assert_eq!(status.skills.get("接飞盘"), Some(&1));
        assert_eq!(status.affection, 55.0);
    }

    #[test]
    fn tick_all_advances_every_pet() {
        let engine = engine();
        engine.adopt("甲", "柯基", "活泼", 0.0).unwrap();
        engine.adopt("乙", "哈士奇", "活泼", 0.0).unwrap();
        let results = engine.tick_all(300.0);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(engine.snapshot("甲", 0.0).unwrap().age, 1.0);
        assert_eq!(engine.snapshot("乙", 0.0).unwrap().age, 1.0);
    }

    #[test]
    fn open_adopts_default_when_missing() {
        let engine = engine();
        let status = engine.open("豆豆", 10.0).unwrap();
        assert_eq!(status.name, "豆豆");
        assert_eq!(engine.names().unwrap(), vec!["豆豆".to_string()]);
    }

    #[test]
    fn release_forgets_pet() {
        let engine = engine();
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
        engine.release("旺财").unwrap();
        assert!(engine.names().unwrap().is_empty());
        assert!(matches!(engine.status("旺财", 0.0), Err(PersistError::UnknownPet(_))));
    }

    #[test]
    fn cold_status_uses_caller_clock() {
        let repo = MemoryPetRepository::new();
        let record: PetRecord = serde_json::from_str(r#"{"name": "旺财"}"#).unwrap();
        repo.save("旺财", &record).unwrap();
        let engine = engine_over(repo);

        let status = engine.status("旺财", 6_000.0).unwrap();
        assert_eq!(status.attributes.hunger(), 100.0);

        // The clock was seeded at 6000, so acting then decays nothing
        engine.act("旺财", Action::Pet, 6_000.0).unwrap();
        let pet = engine.snapshot("旺财", 6_000.0).unwrap();
        assert_eq!(pet.attributes().hunger(), 100.0);
        assert_eq!(pet.age, 0.0);
    }

    #[test]
    fn record_name_follows_its_key() {
        let repo = MemoryPetRepository::new();
        repo.save("旺财", &codec::encode(&Pet::new("阿黄", "柴犬", "温顺", 0.0)))
            .unwrap();
        let engine = engine_over(repo);

        engine.act("旺财", Action::Pet, 3_000.0).unwrap();
        assert_eq!(engine.names().unwrap(), vec!["旺财".to_string()]);

        let pet = engine.snapshot("旺财", 3_000.0).unwrap();
        assert_eq!(pet.name, "旺财");
        assert_eq!(pet.breed, "柴犬");
        assert!(pet.attributes().hunger() < 100.0);
    }

    #[test]
    fn failed_save_rolls_back() {
        let engine = engine_over(FailingRepository::after(1));
        engine.adopt("旺财", "柯基", "活泼", 0.0).unwrap();
        let before = engine.snapshot("旺财", 0.0).unwrap();

        assert!(matches!(
            engine.act("旺财", Action::Play(Game::Frisbee), 3_000.0),
            Err(PersistError::Io(_))
        ));
        assert_eq!(engine.snapshot("旺财", 0.0).unwrap(), before);

        let reward = MinigameReward { game: Minigame::Fetch, score: 5 };
        assert!(engine.reward("旺财", reward, 3_000.0).is_err());
        assert!(engine.tick("旺财", 3_000.0).is_err());
        let results = engine.tick_all(3_000.0);
        assert!(results[0].1.is_err());
        assert_eq!(engine.snapshot("旺财", 0.0).unwrap(), before);
    }

    #[test]
    fn failed_adoption_leaves_no_pet() {
        let engine = engine_over(FailingRepository::after(0));
        assert!(engine.adopt("旺财", "柯基", "活泼", 0.0).is_err());
        assert!(engine.names().unwrap().is_empty());
        assert!(matches!(engine.status("旺财", 0.0), Err(PersistError::UnknownPet(_))));
    }

    #[test]
    fn racing_adoptions_admit_one() {
        let engine = engine();
        let wins = AtomicUsize::new(0);
        thread::scope(|scope| {
            for breed in ["柯基", "柴犬", "金毛", "边牧", "哈士奇", "拉布拉多"] {
                let (engine, wins) = (&engine, &wins);
                scope.spawn(move || match engine.adopt("旺财", breed, "活泼", 0.0) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => assert!(matches!(e, PersistError::DuplicatePet(_)), "{e}"),
                });
            }
        });
        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert_eq!(engine.names().unwrap(), vec!["旺财".to_string()]);
    }
}
