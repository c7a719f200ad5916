use std::io;
use thiserror::Error;

/// Failures from the storage and configuration boundaries.
///
/// The simulation itself never produces these: denied interactions and
/// unreachable wander targets are ordinary outcomes, not errors.
#[derive(Error, Debug)]
pub enum PetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PetResult<T> = std::result::Result<T, PetError>;
