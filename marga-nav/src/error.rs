//! Error types for MargaNav

use thiserror::Error;

/// MargaNav error type
#[derive(Error, Debug)]
pub enum MargaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Goal coordinates cannot be represented on the search lattice.
    #[error("Malformed goal ({x}, {z}): not representable on the search lattice")]
    MalformedGoal { x: f64, z: f64 },

    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("World error: {0}")]
    World(String),
}

impl From<toml::de::Error> for MargaError {
    fn from(e: toml::de::Error) -> Self {
        MargaError::Config(e.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MargaError>;
