//! Client capability check for cloud password mutations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::AccountContext;
use crate::models::PasswordState;

/// Fire-and-forget application updater.
pub trait UpdateChecker: Send + Sync {
    fn trigger_update_and_restart(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChoice {
    Update,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotice {
    pub message: String,
    pub action: String,
}

/// Blocking "update the app" prompt.
#[async_trait]
pub trait UpdatePrompt: Send + Sync {
    async fn offer_update(&self, notice: &UpdateNotice) -> UpdateChoice;

    fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// The client cannot handle the server's algorithms; nothing was changed.
    Blocked,
}

/// Whether this client can safely create or read secrets for `state`.
pub fn can_mutate_password(state: &PasswordState) -> bool {
    !state.unknown_algorithm
        && state.new_password_algo.is_some()
        && state.new_secure_secret_algo.is_some()
}

pub struct CapabilityGate {
    context: Arc<AccountContext>,
    updater: Arc<dyn UpdateChecker>,
    prompt: Arc<dyn UpdatePrompt>,
}

impl CapabilityGate {
    pub fn new(
        context: Arc<AccountContext>,
        updater: Arc<dyn UpdateChecker>,
        prompt: Arc<dyn UpdatePrompt>,
    ) -> Self {
        Self {
            context,
            updater,
            prompt,
        }
    }

    /// Allow the mutation, or offer an update and report `Blocked`.
    pub async fn admit(&self, state: &PasswordState) -> GateDecision {
        if can_mutate_password(state) {
            return GateDecision::Allowed;
        }

        tracing::info!(
            unknown_algorithm = state.unknown_algorithm,
            "Password change blocked until the app is updated"
        );
        let labels = &self.context.config().labels;
        let notice = UpdateNotice {
            message: labels.update_required.clone(),
            action: labels.update_action.clone(),
        };
        if self.prompt.offer_update(&notice).await == UpdateChoice::Update {
            self.updater.trigger_update_and_restart();
            self.prompt.close();
        }
        GateDecision::Blocked
    }
}
