use std::io;
use std::path::PathBuf;

/// The preference store could not be read.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceReadError {
    #[error("Failed to read preference '{key}' from {}: {source}", .path.display())]
    Io {
        key: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("Invalid preference key '{0}'")]
    InvalidKey(String),
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}

/// The preference store could not be written.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceWriteError {
    #[error("Failed to write preference '{key}' to {}: {source}", .path.display())]
    Io {
        key: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("Invalid preference key '{0}'")]
    InvalidKey(String),
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}
