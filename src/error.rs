//! Error taxonomy for the navigator core.
//!
//! Malformed external data is normally recovered at the boundary where it
//! enters (defaults, fallbacks). These variants are what remains visible to
//! callers.

use thiserror::Error;

use crate::directions::DirectionsStatus;

/// Failures raised by a [`RouteStorage`](crate::traits::RouteStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage quota exceeded: {needed} bytes needed, {limit} bytes allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Stored, submitted or AI-provided data failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("route id {0:?} already exists")]
    DuplicateId(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("directions unavailable: {0}")]
    DirectionsUnavailable(DirectionsStatus),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
