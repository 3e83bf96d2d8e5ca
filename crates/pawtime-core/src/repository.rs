//! Where pet records live.
//!
//! A [`PetRepository`] stores one [`PetRecord`] per pet name. Saving
//! replaces the whole record; a failed save must leave the previous record
//! readable, which the file store guarantees by writing a temp file and
//! renaming it over the old one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use pawtime_logic::codec::{self, PetRecord};
use pawtime_logic::pet::{self, Pet};
use pawtime_logic::rules::Ruleset;

use crate::error::Result;
use crate::persistence::{self, Format};

/// Keyed storage for pet records.
pub trait PetRepository: Send + Sync {
    /// Store a record under `name`, replacing any previous one.
    fn save(&self, name: &str, record: &PetRecord) -> Result<()>;

    /// Fetch the record for `name`, or `None` if there is none.
    fn load(&self, name: &str) -> Result<Option<PetRecord>>;

    fn exists(&self, name: &str) -> bool;

    /// Remove the record. Deleting a missing record is not an error.
    fn delete(&self, name: &str) -> Result<()>;

    /// Names of all stored pets, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// Encode and store a pet under its own name.
pub fn save_pet(repo: &dyn PetRepository, pet: &Pet) -> Result<()> {
    repo.save(&pet.name, &codec::encode(pet))
}

/// Load and validate a pet. Fixes applied while decoding are logged.
pub fn load_pet(
    repo: &dyn PetRepository,
    name: &str,
    rules: &Ruleset,
    now: f64,
) -> Result<Option<Pet>> {
    let Some(record) = repo.load(name)? else {
        return Ok(None);
    };
    let (mut pet, mut fixes) = codec::decode(record, &rules.config.growth, now);
    fixes.extend(codec::rekey(&mut pet, name));
    for fix in &fixes {
        log::warn!("record for {name:?} corrected on load: {fix:?}");
    }
    Ok(Some(pet))
}

/// Load a pet, or adopt a default one when the record is missing or
/// unreadable. Never fails: persistence trouble degrades to a fresh pet.
pub fn load_or_adopt(repo: &dyn PetRepository, name: &str, rules: &Ruleset, now: f64) -> Pet {
    match load_pet(repo, name, rules, now) {
        Ok(Some(pet)) => pet,
        Ok(None) => {
            log::info!("no saved pet named {name:?}, adopting a new one");
            adopt_default(name, now)
        }
        Err(e) => {
            log::warn!("failed to load pet {name:?}, adopting a new one: {e}");
            adopt_default(name, now)
        }
    }
}

/// A fresh pet of the default breed and personality named `name`.
pub fn adopt_default(name: &str, now: f64) -> Pet {
    if name.is_empty() {
        Pet::adopt_default(now)
    } else {
        Pet::new(name, pet::DEFAULT_BREED, pet::DEFAULT_PERSONALITY, now)
    }
}

/// One file per pet under a base directory.
///
/// Files are named after the pet, with characters that are unsafe in file
/// names percent-escaped, so `list` can recover the pet names.
pub struct FilePetRepository {
    base_dir: PathBuf,
    format: Format,
}

impl FilePetRepository {
    pub fn new(base_dir: impl AsRef<Path>, format: Format) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir, format })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", escape_name(name), self.format.extension()))
    }
}

impl PetRepository for FilePetRepository {
    fn save(&self, name: &str, record: &PetRecord) -> Result<()> {
        let path = self.record_path(name);
        let temp_path = path.with_extension(format!("{}.tmp", self.format.extension()));

        let bytes = persistence::to_bytes(record, self.format)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("saved {name:?} to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<PetRecord>> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let record = persistence::from_bytes(&bytes, self.format)?;
        log::debug!("loaded {name:?} from {}", path.display());
        Ok(Some(record))
    }

    fn exists(&self, name: &str) -> bool {
        self.record_path(name).exists()
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.record_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
            log::debug!("deleted {name:?}");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let suffix = format!(".{}", self.format.extension());
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(&suffix).and_then(unescape_name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Records held in memory. Useful for tests and hosts that persist
/// elsewhere.
#[derive(Default)]
pub struct MemoryPetRepository {
    records: RwLock<BTreeMap<String, PetRecord>>,
}

impl MemoryPetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PetRepository for MemoryPetRepository {
    fn save(&self, name: &str, record: &PetRecord) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<PetRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.contains_key(name)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.keys().cloned().collect())
    }
}

fn is_safe(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Percent-escape every byte of characters that are not safe in a file
/// name. The empty name maps to `%`, which no escaped name produces.
fn escape_name(name: &str) -> String {
    if name.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_safe(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

fn unescape_name(stem: &str) -> Option<String> {
    if stem == "%" {
        return Some(String::new());
    }
    let mut bytes = Vec::with_capacity(stem.len());
    let mut rest = stem.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'%' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_escape_reversibly() {
        for name in ["旺财", "Rex", "a/b", "..", "dog 1", "", "%41"] {
            let escaped = escape_name(name);
            assert!(!escaped.contains('/'), "{escaped}");
            assert!(!escaped.contains('.'), "{escaped}");
            assert_eq!(unescape_name(&escaped).as_deref(), Some(name));
        }
        assert_eq!(escape_name("旺财"), "旺财");
    }

    #[test]
    fn bad_escapes_are_skipped() {
        assert_eq!(unescape_name("%G1"), None);
        assert_eq!(unescape_name("abc%4"), None);
    }

    #[test]
    fn memory_repository_basics() {
        let repo = MemoryPetRepository::new();
        let pet = Pet::new("旺财", "柯基", "活泼", 0.0);
        assert!(!repo.exists("旺财"));
        save_pet(&repo, &pet).unwrap();
        assert!(repo.exists("旺财"));
        assert_eq!(repo.list().unwrap(), vec!["旺财".to_string()]);

        let loaded = load_pet(&repo, "旺财", &Ruleset::standard(), 0.0).unwrap();
        assert_eq!(loaded, Some(pet));

        repo.delete("旺财").unwrap();
        assert!(repo.load("旺财").unwrap().is_none());
    }

    #[test]
    fn loaded_pet_takes_its_key() {
        let repo = MemoryPetRepository::new();
        repo.save("旺财", &codec::encode(&Pet::new("阿黄", "柴犬", "温顺", 0.0)))
            .unwrap();
        let pet = load_pet(&repo, "旺财", &Ruleset::standard(), 0.0).unwrap().unwrap();
        assert_eq!(pet.name, "旺财");

        save_pet(&repo, &pet).unwrap();
        assert_eq!(repo.list().unwrap(), vec!["旺财".to_string()]);
    }

    #[test]
    fn load_or_adopt_falls_back_to_default() {
        let repo = MemoryPetRepository::new();
        let pet = load_or_adopt(&repo, "豆豆", &Ruleset::standard(), 42.0);
        assert_eq!(pet.name, "豆豆");
        assert_eq!(pet.breed, pet::DEFAULT_BREED);
        assert_eq!(pet.last_update_time, 42.0);

        let unnamed = load_or_adopt(&repo, "", &Ruleset::standard(), 0.0);
        assert_eq!(unnamed.name, pet::DEFAULT_NAME);
    }
}
