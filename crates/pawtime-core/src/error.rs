use thiserror::Error;

/// Errors from storing, loading or routing to a pet.
///
/// Gameplay refusals are not errors; they come back inside an
/// `ActionReport`.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("record version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("no pet named {0:?}")]
    UnknownPet(String),

    #[error("a pet named {0:?} already exists")]
    DuplicatePet(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
