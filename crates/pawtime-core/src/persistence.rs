//! Byte encodings for pet records.
//!
//! JSON is the human-editable form the desktop and web front-ends have
//! always written. Bincode is the compact form for hosts that keep many
//! pets. Both carry the same versioned [`PetRecord`]; a record from a newer
//! build is rejected rather than silently misread.

use std::path::Path;

use pawtime_logic::codec::{PetRecord, CURRENT_VERSION};
use pawtime_logic::config::SimConfig;

use crate::error::{PersistError, Result};

/// On-disk encoding of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Binary,
}

impl Format {
    /// File extension used for records in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Binary => "bin",
        }
    }
}

/// Serialize a record.
pub fn to_bytes(record: &PetRecord, format: Format) -> Result<Vec<u8>> {
    let bytes = match format {
        Format::Json => serde_json::to_vec_pretty(record)?,
        Format::Binary => bincode::serialize(record)?,
    };
    Ok(bytes)
}

/// Deserialize a record and check its schema version.
pub fn from_bytes(bytes: &[u8], format: Format) -> Result<PetRecord> {
    let record: PetRecord = match format {
        Format::Json => serde_json::from_slice(bytes)?,
        Format::Binary => bincode::deserialize(bytes)?,
    };

    if record.version > CURRENT_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: record.version,
        });
    }
    Ok(record)
}

/// Load rate-table overrides from a JSON file. Missing keys keep their
/// defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(SimConfig::from_json_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtime_logic::attributes::Attribute;
    use pawtime_logic::codec::encode;
    use pawtime_logic::pet::Pet;

    fn record() -> PetRecord {
        let mut pet = Pet::new("旺财", "金毛", "粘人", 100.0);
        pet.attributes_mut().set(Attribute::Hunger, 33.3);
        pet.skills.set("握手", 2);
        encode(&pet)
    }

    #[test]
    fn both_formats_round_trip() {
        let stored = record();
        for format in [Format::Json, Format::Binary] {
            let bytes = to_bytes(&stored, format).unwrap();
            assert_eq!(from_bytes(&bytes, format).unwrap(), stored, "{format:?}");
        }
    }

    #[test]
    fn binary_is_smaller_than_json() {
        let r = record();
        let json = to_bytes(&r, Format::Json).unwrap();
        let bin = to_bytes(&r, Format::Binary).unwrap();
        assert!(bin.len() < json.len());
    }

    #[test]
    fn future_version_rejected() {
        let mut r = record();
        r.version = CURRENT_VERSION + 1;
        let bytes = to_bytes(&r, Format::Json).unwrap();
        match from_bytes(&bytes, Format::Json) {
            Err(PersistError::VersionMismatch { found, .. }) => assert_eq!(found, CURRENT_VERSION + 1),
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(
            from_bytes(b"{not json", Format::Json),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(
            from_bytes(&[0xff, 0x01], Format::Binary),
            Err(PersistError::Binary(_))
        ));
    }
}
