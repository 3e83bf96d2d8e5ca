//! Live pets keyed by name.
//!
//! Each pet sits behind its own mutex, so one writer per pet at a time while
//! different pets proceed in parallel. The map itself is only locked long
//! enough to find or insert a handle.
//!
//! Poisoned locks are recovered rather than propagated: every operation on
//! a pet is all-or-nothing, so a panic mid-call cannot leave it half
//! updated.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use pawtime_logic::pet::Pet;

pub type PetHandle = Arc<Mutex<Pet>>;

/// Lock a pet handle, recovering from poisoning.
pub fn lock(handle: &PetHandle) -> MutexGuard<'_, Pet> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct PetRegistry {
    pets: RwLock<HashMap<String, PetHandle>>,
}

impl PetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pet under its name, replacing any live pet with that name.
    pub fn insert(&self, pet: Pet) -> PetHandle {
        let name = pet.name.clone();
        let handle = Arc::new(Mutex::new(pet));
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        pets.insert(name, Arc::clone(&handle));
        handle
    }

    /// Insert a pet only if no live pet has its name. The check and the
    /// insert happen under one write lock.
    pub fn insert_new(&self, pet: Pet) -> Option<PetHandle> {
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        match pets.entry(pet.name.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(Arc::clone(slot.insert(Arc::new(Mutex::new(pet))))),
        }
    }

    pub fn get(&self, name: &str) -> Option<PetHandle> {
        let pets = self.pets.read().unwrap_or_else(PoisonError::into_inner);
        pets.get(name).cloned()
    }

    /// Return the live pet, or build one with `load` and insert it.
    ///
    /// The map stays write-locked while `load` runs, so two callers racing
    /// on the same name never both load it.
    pub fn get_or_try_insert_with<E>(
        &self,
        name: &str,
        load: impl FnOnce() -> Result<Pet, E>,
    ) -> Result<PetHandle, E> {
        if let Some(handle) = self.get(name) {
            return Ok(handle);
        }
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pets.get(name) {
            return Ok(Arc::clone(handle));
        }
        let handle = Arc::new(Mutex::new(load()?));
        pets.insert(name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    pub fn remove(&self, name: &str) -> Option<PetHandle> {
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        pets.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        let pets = self.pets.read().unwrap_or_else(PoisonError::into_inner);
        pets.contains_key(name)
    }

    /// Names of all live pets, sorted.
    pub fn names(&self) -> Vec<String> {
        let pets = self.pets.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = pets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.pets.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with exclusive access to one pet. Returns `None` if no live
    /// pet has that name.
    pub fn with_pet<T>(&self, name: &str, f: impl FnOnce(&mut Pet) -> T) -> Option<T> {
        let handle = self.get(name)?;
        let mut pet = lock(&handle);
        Some(f(&mut pet))
    }
}
