#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use veil_core::config::SettingsConfig;
use veil_core::context::AccountContext;
use veil_core::gate::{CapabilityGate, UpdateChecker, UpdateChoice, UpdateNotice, UpdatePrompt};
use veil_core::memory::InMemoryAccountService;
use veil_core::mutation::{MutationCoordinator, PasswordForm, PasswordInput, PasswordPrompt};

/// Let spawned fetch and binder tasks run to completion.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Password dialog that answers every request with the same input.
pub struct ScriptedPrompt {
    answer: Option<PasswordInput>,
    gate: Semaphore,
    forms: Mutex<Vec<PasswordForm>>,
    failures: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: Option<PasswordInput>) -> Arc<Self> {
        Self::build(answer, Semaphore::MAX_PERMITS)
    }

    /// Holds every dialog open until [`Self::release`].
    pub fn blocking(answer: Option<PasswordInput>) -> Arc<Self> {
        Self::build(answer, 0)
    }

    fn build(answer: Option<PasswordInput>, permits: usize) -> Arc<Self> {
        Arc::new(Self {
            answer,
            gate: Semaphore::new(permits),
            forms: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        })
    }

    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn forms(&self) -> Vec<PasswordForm> {
        self.forms.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

#[async_trait]
impl PasswordPrompt for ScriptedPrompt {
    async fn request_input(&self, form: &PasswordForm) -> Option<PasswordInput> {
        self.forms.lock().unwrap().push(form.clone());
        self.gate.acquire().await.unwrap().forget();
        self.answer.clone()
    }

    fn show_failure(&self, _form: &PasswordForm, reason: &str) {
        self.failures.lock().unwrap().push(reason.to_string());
    }
}

#[derive(Default)]
pub struct RecordingUpdater {
    pub offers: AtomicUsize,
    pub updates: AtomicUsize,
}

impl RecordingUpdater {
    pub fn offers(&self) -> usize {
        self.offers.load(Ordering::SeqCst)
    }
}

impl UpdateChecker for RecordingUpdater {
    fn trigger_update_and_restart(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpdatePrompt for RecordingUpdater {
    async fn offer_update(&self, _notice: &UpdateNotice) -> UpdateChoice {
        self.offers.fetch_add(1, Ordering::SeqCst);
        UpdateChoice::Dismiss
    }

    fn close(&self) {}
}

pub struct Harness {
    pub service: Arc<InMemoryAccountService>,
    pub context: Arc<AccountContext>,
    pub prompt: Arc<ScriptedPrompt>,
    pub updater: Arc<RecordingUpdater>,
    pub coordinator: Arc<MutationCoordinator>,
}

pub fn harness(service: InMemoryAccountService, prompt: Arc<ScriptedPrompt>) -> Harness {
    let service = Arc::new(service);
    let context = AccountContext::new(service.clone(), SettingsConfig::default());
    let updater = Arc::new(RecordingUpdater::default());
    let gate = CapabilityGate::new(context.clone(), updater.clone(), updater.clone());
    let coordinator = Arc::new(MutationCoordinator::new(
        context.clone(),
        gate,
        prompt.clone(),
    ));
    Harness {
        service,
        context,
        prompt,
        updater,
        coordinator,
    }
}
