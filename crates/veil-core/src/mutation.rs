//! Cloud password edit/remove flows.
//!
//! Every flow goes through the [`CapabilityGate`] first. Only one flow may be
//! open per password state: a second request for the same state attaches to
//! the open one, a request for a newer state supersedes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::AccountContext;
use crate::error::MutationError;
use crate::gate::{CapabilityGate, GateDecision};
use crate::models::{AlgoDescriptor, PasswordRequest, PasswordState, StateIdentity};
use crate::service::{MutationOutcome, PasswordChange, PasswordRemoval, Secret};
use crate::util::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Set,
    Change,
    Remove,
}

/// What the password entry dialog is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordForm {
    pub mode: EntryMode,
    pub request: Option<PasswordRequest>,
    pub new_password_algo: Option<AlgoDescriptor>,
    pub new_secure_secret_algo: Option<AlgoDescriptor>,
    pub has_recovery: bool,
    pub not_empty_passport: bool,
    pub hint: String,
}

impl PasswordForm {
    pub fn from_state(state: &PasswordState, mode: EntryMode) -> Self {
        Self {
            mode,
            request: state.request.clone(),
            new_password_algo: state.new_password_algo.clone(),
            new_secure_secret_algo: state.new_secure_secret_algo.clone(),
            has_recovery: state.has_recovery,
            not_empty_passport: state.not_empty_passport,
            hint: state.hint.clone(),
        }
    }
}

/// What the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordInput {
    pub current_password: Secret,
    pub new_password: Secret,
    pub hint: String,
    pub recovery_email: Option<String>,
}

/// Password entry dialog.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// Collect input; `None` when the user cancels.
    async fn request_input(&self, form: &PasswordForm) -> Option<PasswordInput>;

    /// Show a rejected mutation inside the open dialog.
    fn show_failure(&self, form: &PasswordForm, reason: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The server accepted the mutation and a reload was issued.
    Completed(MutationOutcome),
    /// A pending unconfirmed password was dropped locally.
    ClearedUnconfirmed,
    Cancelled,
    /// The capability gate stopped the flow.
    Blocked,
    /// A flow for the same state is already open.
    Attached,
    /// A newer flow replaced this one before it submitted.
    Superseded,
}

#[derive(Debug)]
struct ActiveFlow {
    identity: StateIdentity,
    generation: u64,
}

pub struct MutationCoordinator {
    context: Arc<AccountContext>,
    gate: CapabilityGate,
    prompt: Arc<dyn PasswordPrompt>,
    active: Mutex<Option<ActiveFlow>>,
    generation: AtomicU64,
}

impl MutationCoordinator {
    pub fn new(
        context: Arc<AccountContext>,
        gate: CapabilityGate,
        prompt: Arc<dyn PasswordPrompt>,
    ) -> Self {
        Self {
            context,
            gate,
            prompt,
            active: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Set a new cloud password or change the current one.
    pub async fn edit_password(&self) -> Result<FlowOutcome, MutationError> {
        let state = self.current_state().await?;
        if self.gate.admit(&state).await == GateDecision::Blocked {
            return Ok(FlowOutcome::Blocked);
        }
        let mode = if state.request.is_some() {
            EntryMode::Change
        } else {
            EntryMode::Set
        };
        self.run_flow(&state, mode).await
    }

    /// Remove the cloud password, or drop an unconfirmed one locally.
    pub async fn remove_password(&self) -> Result<FlowOutcome, MutationError> {
        let state = self.current_state().await?;
        if self.gate.admit(&state).await == GateDecision::Blocked {
            return Ok(FlowOutcome::Blocked);
        }
        if state.request.is_none() {
            self.context.service().clear_unconfirmed_password();
            self.context
                .password_store()
                .amend(|state| state.unconfirmed_pattern.clear());
            tracing::info!("Cleared unconfirmed cloud password");
            return Ok(FlowOutcome::ClearedUnconfirmed);
        }
        self.run_flow(&state, EntryMode::Remove).await
    }

    pub fn has_open_flow(&self) -> bool {
        lock(&self.active).is_some()
    }

    async fn current_state(&self) -> Result<PasswordState, MutationError> {
        let store = self.context.password_store();
        if let Some(state) = store.get_current() {
            return Ok(state);
        }
        store
            .refresh()
            .await
            .map_err(|error| MutationError::Unavailable(error.to_string()))
    }

    async fn run_flow(
        &self,
        state: &PasswordState,
        mode: EntryMode,
    ) -> Result<FlowOutcome, MutationError> {
        let identity = state.identity();
        let generation = {
            let mut active = lock(&self.active);
            if let Some(open) = active.as_ref() {
                if open.identity == identity {
                    tracing::debug!(?mode, "Password flow already open, attaching");
                    return Ok(FlowOutcome::Attached);
                }
                tracing::info!(
                    ?mode,
                    superseded = open.generation,
                    "Superseding stale password flow"
                );
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *active = Some(ActiveFlow {
                identity,
                generation,
            });
            generation
        };

        let result = self.drive(state, mode, generation).await;

        let mut active = lock(&self.active);
        if active
            .as_ref()
            .is_some_and(|open| open.generation == generation)
        {
            *active = None;
        }
        result
    }

    async fn drive(
        &self,
        state: &PasswordState,
        mode: EntryMode,
        generation: u64,
    ) -> Result<FlowOutcome, MutationError> {
        let form = PasswordForm::from_state(state, mode);
        let Some(input) = self.prompt.request_input(&form).await else {
            return Ok(FlowOutcome::Cancelled);
        };
        if !self.is_current(generation) {
            return Ok(FlowOutcome::Superseded);
        }

        let service = self.context.service();
        let submitted = match mode {
            EntryMode::Remove => {
                let Some(request) = form.request.clone() else {
                    return Err(MutationError::Unavailable(
                        "no password to remove".to_string(),
                    ));
                };
                service
                    .submit_password_removal(PasswordRemoval {
                        request,
                        current_password: input.current_password,
                    })
                    .await
            }
            EntryMode::Set | EntryMode::Change => {
                let (Some(new_algo), Some(new_secure_secret_algo)) = (
                    form.new_password_algo.clone(),
                    form.new_secure_secret_algo.clone(),
                ) else {
                    return Err(MutationError::Unavailable(
                        "server did not advertise password algorithms".to_string(),
                    ));
                };
                service
                    .submit_password_change(PasswordChange {
                        request: form.request.clone(),
                        current_password: input.current_password,
                        new_password: input.new_password,
                        new_algo,
                        new_secure_secret_algo,
                        hint: input.hint,
                        recovery_email: input.recovery_email,
                    })
                    .await
            }
        };

        match submitted {
            Ok(outcome) => {
                tracing::info!(?mode, ?outcome, "Password mutation accepted");
                self.context.password_store().reload();
                Ok(FlowOutcome::Completed(outcome))
            }
            Err(error) => {
                let reason = error.to_string();
                tracing::warn!(?mode, "Password mutation failed: {}", reason);
                self.prompt.show_failure(&form, &reason);
                Err(MutationError::Failed(reason))
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|open| open.generation == generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_passes_state_fields_through() {
        let algo = AlgoDescriptor {
            name: "pbkdf2".to_string(),
            salt: "01".to_string(),
        };
        let state = PasswordState {
            has_recovery: true,
            not_empty_passport: true,
            hint: "first pet".to_string(),
            new_password_algo: Some(algo.clone()),
            new_secure_secret_algo: Some(algo),
            ..PasswordState::default()
        };
        let form = PasswordForm::from_state(&state, EntryMode::Set);
        assert_eq!(form.mode, EntryMode::Set);
        assert!(form.has_recovery);
        assert!(form.not_empty_passport);
        assert_eq!(form.hint, "first pet");
        assert!(form.request.is_none());
        assert_eq!(form.new_password_algo, state.new_password_algo);
    }
}
