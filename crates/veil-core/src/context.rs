//! Per-account context handle.
//!
//! `AccountContext` bundles the remote service, configuration, and the
//! process-lifetime state stores. It is passed explicitly to every component
//! that needs account state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::SettingsConfig;
use crate::models::{PasswordState, PrivacyKey, PrivacyRule};
use crate::service::{AccountService, ServiceResult};
use crate::store::{StateSource, StateStore};
use crate::util::lock;

pub struct AccountContext {
    service: Arc<dyn AccountService>,
    config: SettingsConfig,
    password: StateStore<PasswordState>,
    privacy: Mutex<BTreeMap<PrivacyKey, StateStore<PrivacyRule>>>,
}

impl AccountContext {
    pub fn new(service: Arc<dyn AccountService>, config: SettingsConfig) -> Arc<Self> {
        let password = StateStore::new(
            "password_state",
            Arc::new(PasswordStateSource {
                service: Arc::clone(&service),
            }),
        );
        Arc::new(Self {
            service,
            config,
            password,
            privacy: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn service(&self) -> &Arc<dyn AccountService> {
        &self.service
    }

    pub const fn config(&self) -> &SettingsConfig {
        &self.config
    }

    pub const fn password_store(&self) -> &StateStore<PasswordState> {
        &self.password
    }

    /// Store for one privacy category, created on first use.
    pub fn privacy_store(&self, key: PrivacyKey) -> StateStore<PrivacyRule> {
        lock(&self.privacy)
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(%key, "Creating privacy rule store");
                StateStore::new(
                    format!("privacy.{key}"),
                    Arc::new(PrivacyRuleSource {
                        service: Arc::clone(&self.service),
                        key,
                    }),
                )
            })
            .clone()
    }
}

struct PasswordStateSource {
    service: Arc<dyn AccountService>,
}

#[async_trait]
impl StateSource<PasswordState> for PasswordStateSource {
    async fn fetch(&self) -> ServiceResult<PasswordState> {
        self.service.fetch_password_state().await
    }
}

struct PrivacyRuleSource {
    service: Arc<dyn AccountService>,
    key: PrivacyKey,
}

#[async_trait]
impl StateSource<PrivacyRule> for PrivacyRuleSource {
    async fn fetch(&self) -> ServiceResult<PrivacyRule> {
        self.service.fetch_privacy_rule(self.key).await
    }
}
