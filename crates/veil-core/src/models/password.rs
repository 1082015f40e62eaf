//! Cloud password state as reported by the account service.

use serde::{Deserialize, Serialize};

/// Opaque key-derivation parameters advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoDescriptor {
    pub name: String,
    #[serde(default)]
    pub salt: String,
}

/// Verification parameters for the current password.
///
/// Present only while a password is set on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub algo: AlgoDescriptor,
    pub srp_id: u64,
    #[serde(default)]
    pub srp_b: String,
}

/// Server-known cloud password status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordState {
    #[serde(default)]
    pub request: Option<PasswordRequest>,
    /// Masked recovery contact, non-empty while confirmation is pending.
    #[serde(default)]
    pub unconfirmed_pattern: String,
    #[serde(default)]
    pub has_recovery: bool,
    #[serde(default)]
    pub not_empty_passport: bool,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub unknown_algorithm: bool,
    #[serde(default)]
    pub new_password_algo: Option<AlgoDescriptor>,
    #[serde(default)]
    pub new_secure_secret_algo: Option<AlgoDescriptor>,
}

/// The three mutually exclusive password situations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStatus {
    NoPassword,
    Unconfirmed,
    Confirmed,
}

/// Identity of a password state, used to key the single active mutation flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateIdentity {
    srp_id: Option<u64>,
    unconfirmed_pattern: String,
}

impl PasswordState {
    /// A pending confirmation takes precedence over the request check.
    #[must_use]
    pub fn status(&self) -> PasswordStatus {
        if self.is_unconfirmed() {
            PasswordStatus::Unconfirmed
        } else if self.request.is_some() {
            PasswordStatus::Confirmed
        } else {
            PasswordStatus::NoPassword
        }
    }

    #[must_use]
    pub fn is_unconfirmed(&self) -> bool {
        !self.unconfirmed_pattern.is_empty()
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.request.is_some() && self.unconfirmed_pattern.is_empty()
    }

    #[must_use]
    pub fn is_without_password(&self) -> bool {
        self.request.is_none() && self.unconfirmed_pattern.is_empty()
    }

    #[must_use]
    pub fn identity(&self) -> StateIdentity {
        StateIdentity {
            srp_id: self.request.as_ref().map(|request| request.srp_id),
            unconfirmed_pattern: self.unconfirmed_pattern.clone(),
        }
    }
}
