use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] veil_core::Error),
    #[error(transparent)]
    Service(#[from] veil_core::service::ServiceError),
    #[error(transparent)]
    Store(#[from] veil_core::error::StoreError),
    #[error(transparent)]
    Mutation(#[from] veil_core::error::MutationError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Account service is not configured. Set VEIL_API_URL and VEIL_ACCESS_TOKEN, or pass --demo."
    )]
    ServiceNotConfigured,
    #[error("Auto-lock delay must be at least one minute")]
    InvalidAutoLock,
}
