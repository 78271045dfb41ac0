use thiserror::Error;

/// Errors that can occur in the shared core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration file unreadable/unparseable, or a required key is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
