// File: src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A vocabulary snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Two identities claimed the same canonical form under `CollisionPolicy::Reject`.
    #[error("Vocabulary collision on '{form}': already mapped to '{existing}', refused '{incoming}'")]
    VocabularyCollision {
        form: String,
        existing: String,
        incoming: String,
    },

    #[error("Clock score {0} is outside 0..=5")]
    InvalidClockScore(u8),

    #[error("No phase is active")]
    NoActivePhase,

    #[error("Phase mismatch: expected {expected}, active phase is {actual}")]
    PhaseMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
