//! Remote account service interface.
//!
//! The core treats the service as an opaque request/response collaborator;
//! [`HttpAccountService`] talks to a JSON API and
//! [`crate::memory::InMemoryAccountService`] keeps everything in process.

mod http;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AlgoDescriptor, PasswordRequest, PasswordState, PrivacyKey, PrivacyRule};

pub use http::{normalize_base_url, AccessToken, HttpAccountService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Account service is not configured")]
    NotConfigured,
    #[error("Invalid service configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Account API error: {0}")]
    Api(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Account service unavailable: {0}")]
    Unavailable(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Server verdict for an accepted password mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The new password (or its removal) is in effect.
    Success,
    /// The server state moved on; the client must refetch it.
    ReloadNeeded,
}

/// Password text that never shows up in logs.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("[REDACTED]")
    }
}

/// Parameters for setting or changing the cloud password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    /// Verification parameters of the password being replaced, if any.
    pub request: Option<PasswordRequest>,
    pub current_password: Secret,
    pub new_password: Secret,
    pub new_algo: AlgoDescriptor,
    pub new_secure_secret_algo: AlgoDescriptor,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub recovery_email: Option<String>,
}

/// Parameters for removing the cloud password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRemoval {
    pub request: PasswordRequest,
    pub current_password: Secret,
}

/// Remote operations the settings core depends on.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn fetch_password_state(&self) -> ServiceResult<PasswordState>;

    async fn fetch_privacy_rule(&self, key: PrivacyKey) -> ServiceResult<PrivacyRule>;

    async fn submit_password_change(&self, params: PasswordChange)
        -> ServiceResult<MutationOutcome>;

    async fn submit_password_removal(
        &self,
        params: PasswordRemoval,
    ) -> ServiceResult<MutationOutcome>;

    /// Drop a pending, unconfirmed password without a server round trip.
    fn clear_unconfirmed_password(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_is_redacted() {
        let change = PasswordRemoval {
            request: PasswordRequest {
                algo: AlgoDescriptor {
                    name: "pbkdf2".to_string(),
                    salt: String::new(),
                },
                srp_id: 1,
                srp_b: String::new(),
            },
            current_password: Secret::new("hunter2"),
        };
        let rendered = format!("{change:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn outcome_uses_snake_case_wire_names() {
        let outcome: MutationOutcome = serde_json::from_str("\"reload_needed\"").unwrap();
        assert_eq!(outcome, MutationOutcome::ReloadNeeded);
    }
}
