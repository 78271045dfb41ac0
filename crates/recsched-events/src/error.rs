use thiserror::Error;

/// Errors that can occur within the event-store subsystem.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// `add` was called with a tag already present. Overwriting an existing
    /// record is an explicit caller decision (`update`), never implicit.
    #[error("Duplicate tag: {tag}")]
    DuplicateTag { tag: String },

    /// `update` was called with a tag not present in the store.
    #[error("Event not found: {tag}")]
    EventNotFound { tag: String },

    /// The persisted file exists but cannot be decoded. Never degraded to an
    /// empty store — a first run with no file is the only silent case.
    #[error("Corrupt event file: {0}")]
    CorruptStore(String),

    /// An existing file could not be read for reasons other than absence.
    #[error("Could not read event file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The event file could not be created or written.
    #[error("Could not create event file {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EventStoreError>;
