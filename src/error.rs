use thiserror::Error;

/// Errors raised by the vertex ring and the two routines that touch it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Vertex ring capacity must be between 2 and 1048576, got {0}")]
    Capacity(usize),

    #[error("Sample ingest needs at least one channel, got {0}")]
    Channels(usize),

    #[error("Vertex ring lock poisoned")]
    LockPoisoned,
}
