//! Error types for veil-core

use thiserror::Error;

pub use crate::service::ServiceError;

/// Result type alias using veil-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in veil-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote account service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Cached state could not be produced
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A password mutation did not go through
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors surfaced by [`crate::StateStore::refresh`].
///
/// Plain `reload()` calls never report these; subscribers simply keep the
/// last value they saw.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
    #[error("State has not been loaded yet")]
    NotLoaded,
}

/// Failures of the cloud password edit/remove flows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Password state is unavailable: {0}")]
    Unavailable(String),
    #[error("Password change failed: {0}")]
    Failed(String),
}
