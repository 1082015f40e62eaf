//! In-process account service.
//!
//! Backs the CLI's offline demo mode and the test suites. It keeps a password
//! and privacy rules in memory, counts every call that would have been a
//! network round trip, and can hold or fail fetches on demand.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::{
    AlgoDescriptor, PasswordRequest, PasswordState, PrivacyKey, PrivacyOption, PrivacyRule,
};
use crate::service::{
    AccountService, MutationOutcome, PasswordChange, PasswordRemoval, Secret, ServiceError,
    ServiceResult,
};
use crate::util::lock;

pub struct InMemoryAccountService {
    account: Mutex<Account>,
    next_srp_id: AtomicU64,
    password_fetches: AtomicUsize,
    privacy_fetches: AtomicUsize,
    mutations: AtomicUsize,
    cleared_unconfirmed: AtomicUsize,
    failing_fetches: AtomicUsize,
    fetches_open: watch::Sender<bool>,
}

#[derive(Debug, Default)]
struct Account {
    state: PasswordState,
    password: Option<Secret>,
    pending: Option<PendingPassword>,
    privacy: BTreeMap<PrivacyKey, PrivacyRule>,
}

#[derive(Debug)]
struct PendingPassword {
    password: Secret,
    hint: String,
}

impl Default for InMemoryAccountService {
    fn default() -> Self {
        Self::new(PasswordState {
            new_password_algo: Some(default_password_algo()),
            new_secure_secret_algo: Some(default_secret_algo()),
            ..PasswordState::default()
        })
    }
}

impl InMemoryAccountService {
    pub fn new(state: PasswordState) -> Self {
        let (fetches_open, _) = watch::channel(true);
        Self {
            account: Mutex::new(Account {
                state,
                ..Account::default()
            }),
            next_srp_id: AtomicU64::new(1),
            password_fetches: AtomicUsize::new(0),
            privacy_fetches: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
            cleared_unconfirmed: AtomicUsize::new(0),
            failing_fetches: AtomicUsize::new(0),
            fetches_open,
        }
    }

    /// Account that already has a confirmed password.
    pub fn with_password(password: &str, hint: &str) -> Self {
        let service = Self::default();
        {
            let mut account = lock(&service.account);
            account.state.request = Some(service.issue_request());
            account.state.hint = hint.to_string();
            account.password = Some(Secret::new(password));
        }
        service
    }

    /// Replace the server-side password state, e.g. to simulate another device.
    pub fn set_password_state(&self, state: PasswordState) {
        lock(&self.account).state = state;
    }

    pub fn password_state(&self) -> PasswordState {
        lock(&self.account).state.clone()
    }

    pub fn set_privacy_rule(&self, key: PrivacyKey, rule: PrivacyRule) {
        lock(&self.account).privacy.insert(key, rule);
    }

    /// Out-of-band confirmation of the pending recovery email.
    pub fn confirm_recovery_email(&self) -> bool {
        let mut account = lock(&self.account);
        let Some(pending) = account.pending.take() else {
            return false;
        };
        account.state.request = Some(self.issue_request());
        account.state.unconfirmed_pattern.clear();
        account.state.has_recovery = true;
        account.state.hint = pending.hint;
        account.password = Some(pending.password);
        true
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    /// Park fetches until [`Self::release_fetches`].
    pub fn hold_fetches(&self) {
        self.fetches_open.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.fetches_open.send_replace(true);
    }

    pub fn password_fetches(&self) -> usize {
        self.password_fetches.load(Ordering::SeqCst)
    }

    pub fn privacy_fetches(&self) -> usize {
        self.privacy_fetches.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn cleared_unconfirmed(&self) -> usize {
        self.cleared_unconfirmed.load(Ordering::SeqCst)
    }

    /// Every call that would have reached the server.
    pub fn network_calls(&self) -> usize {
        self.password_fetches() + self.privacy_fetches() + self.mutation_calls()
    }

    fn issue_request(&self) -> PasswordRequest {
        PasswordRequest {
            algo: default_password_algo(),
            srp_id: self.next_srp_id.fetch_add(1, Ordering::SeqCst),
            srp_b: String::new(),
        }
    }

    async fn before_fetch(&self) -> ServiceResult<()> {
        let mut open = self.fetches_open.subscribe();
        while !*open.borrow_and_update() {
            if open.changed().await.is_err() {
                break;
            }
        }
        let failing = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if failing.is_ok() {
            return Err(ServiceError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    fn verify_current(
        account: &Account,
        request: Option<&PasswordRequest>,
        current: &Secret,
    ) -> ServiceResult<()> {
        let Some(stored) = &account.password else {
            return Ok(());
        };
        if request != account.state.request.as_ref() {
            return Err(ServiceError::Api(
                "Password state changed, reload needed (409)".to_string(),
            ));
        }
        if stored != current {
            return Err(ServiceError::Api("Invalid password (400)".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for InMemoryAccountService {
    async fn fetch_password_state(&self) -> ServiceResult<PasswordState> {
        self.password_fetches.fetch_add(1, Ordering::SeqCst);
        self.before_fetch().await?;
        Ok(lock(&self.account).state.clone())
    }

    async fn fetch_privacy_rule(&self, key: PrivacyKey) -> ServiceResult<PrivacyRule> {
        self.privacy_fetches.fetch_add(1, Ordering::SeqCst);
        self.before_fetch().await?;
        Ok(lock(&self.account)
            .privacy
            .get(&key)
            .cloned()
            .unwrap_or_else(|| PrivacyRule::new(PrivacyOption::Everyone)))
    }

    async fn submit_password_change(
        &self,
        params: PasswordChange,
    ) -> ServiceResult<MutationOutcome> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if params.new_password.is_empty() {
            return Err(ServiceError::Api(
                "New password must not be empty (400)".to_string(),
            ));
        }

        let mut account = lock(&self.account);
        if let Err(error) =
            Self::verify_current(&account, params.request.as_ref(), &params.current_password)
        {
            return match error {
                ServiceError::Api(message) if message.contains("409") => {
                    Ok(MutationOutcome::ReloadNeeded)
                }
                other => Err(other),
            };
        }

        if let Some(email) = params.recovery_email.filter(|email| !email.trim().is_empty()) {
            account.state.unconfirmed_pattern = mask_email(&email);
            account.pending = Some(PendingPassword {
                password: params.new_password,
                hint: params.hint,
            });
            return Ok(MutationOutcome::ReloadNeeded);
        }

        account.state.request = Some(self.issue_request());
        account.state.hint = params.hint;
        account.state.unconfirmed_pattern.clear();
        account.password = Some(params.new_password);
        account.pending = None;
        Ok(MutationOutcome::Success)
    }

    async fn submit_password_removal(
        &self,
        params: PasswordRemoval,
    ) -> ServiceResult<MutationOutcome> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut account = lock(&self.account);
        Self::verify_current(&account, Some(&params.request), &params.current_password)?;

        account.state.request = None;
        account.state.hint.clear();
        account.state.has_recovery = false;
        account.state.unconfirmed_pattern.clear();
        account.password = None;
        account.pending = None;
        Ok(MutationOutcome::Success)
    }

    fn clear_unconfirmed_password(&self) {
        self.cleared_unconfirmed.fetch_add(1, Ordering::SeqCst);
        let mut account = lock(&self.account);
        account.pending = None;
        account.state.unconfirmed_pattern.clear();
    }
}

fn default_password_algo() -> AlgoDescriptor {
    AlgoDescriptor {
        name: "pbkdf2-sha512".to_string(),
        salt: "6d656d6f7279".to_string(),
    }
}

fn default_secret_algo() -> AlgoDescriptor {
    AlgoDescriptor {
        name: "sha512".to_string(),
        salt: "7365637265740a".to_string(),
    }
}

/// `alice@example.com` -> `a***@example.com`
fn mask_email(email: &str) -> String {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
