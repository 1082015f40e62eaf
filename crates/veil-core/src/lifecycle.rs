//! Decides when cached state must be refetched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::context::AccountContext;
use crate::passcode::LocalPasscodeStore;
use crate::signal::{Listeners, Subscription};
use crate::util::lock;
use crate::views::ScreenViews;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Foregrounded,
    Backgrounded,
}

/// Publisher for application foreground/background transitions.
#[derive(Debug, Default)]
pub struct AppLifecycle {
    listeners: Mutex<Listeners<AppState>>,
}

impl AppLifecycle {
    pub fn emit(&self, state: AppState) {
        lock(&self.listeners).publish(&state);
    }

    pub fn subscribe(&self) -> Subscription<AppState> {
        lock(&self.listeners).subscribe(None)
    }
}

pub struct LifecycleReloadTrigger {
    context: Arc<AccountContext>,
    passcode: Arc<dyn LocalPasscodeStore>,
    views: ScreenViews,
    privacy_mounted: AtomicBool,
}

impl LifecycleReloadTrigger {
    pub fn new(
        context: Arc<AccountContext>,
        passcode: Arc<dyn LocalPasscodeStore>,
        views: ScreenViews,
    ) -> Self {
        Self {
            context,
            passcode,
            views,
            privacy_mounted: AtomicBool::new(false),
        }
    }

    /// Reload the password state when the app comes back while the
    /// unconfirmed label is showing. Returns whether a reload was issued.
    pub fn on_app_state(&self, state: AppState) -> bool {
        if state != AppState::Foregrounded || !self.views.unconfirmed_visible() {
            return false;
        }
        tracing::debug!("Foregrounded with unconfirmed password, reloading");
        self.context.password_store().reload();
        true
    }

    /// Re-derive passcode views from the local store; no network involved.
    pub fn on_passcode_changed(&self) {
        self.views.apply_passcode(&self.passcode.state());
    }

    /// Reload every tracked privacy rule once. Later calls do nothing.
    pub fn mount_privacy_section(&self) -> usize {
        if self.privacy_mounted.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let keys = &self.context.config().privacy_keys;
        for key in keys {
            self.context.privacy_store(*key).reload();
        }
        tracing::debug!(count = keys.len(), "Privacy section mounted");
        keys.len()
    }

    /// Dispatch events until both sources are closed.
    pub async fn run(
        self: Arc<Self>,
        mut lifecycle: Subscription<AppState>,
        mut passcode_changes: Subscription<()>,
    ) {
        let mut lifecycle_open = true;
        let mut passcode_open = true;
        loop {
            tokio::select! {
                event = lifecycle.next(), if lifecycle_open => match event {
                    Some(state) => {
                        self.on_app_state(state);
                    }
                    None => lifecycle_open = false,
                },
                change = passcode_changes.next(), if passcode_open => match change {
                    Some(()) => self.on_passcode_changed(),
                    None => passcode_open = false,
                },
                else => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsConfig;
    use crate::memory::InMemoryAccountService;
    use crate::models::{LocalPasscodeState, PrivacyKey};
    use crate::passcode::FilePasscodeStore;
    use crate::views::DerivedViewBuilder;

    fn trigger(
        service: &Arc<InMemoryAccountService>,
        passcode: &Arc<FilePasscodeStore>,
    ) -> LifecycleReloadTrigger {
        let config = SettingsConfig {
            privacy_keys: vec![PrivacyKey::LastSeen, PrivacyKey::Calls],
            ..SettingsConfig::default()
        };
        let views = ScreenViews::new(
            DerivedViewBuilder::from_config(&config),
            &config.privacy_keys,
            &passcode.state(),
        );
        let context = AccountContext::new(service.clone(), config);
        LifecycleReloadTrigger::new(context, passcode.clone(), views)
    }

    #[tokio::test]
    async fn privacy_rules_reload_once_per_mount() {
        let service = Arc::new(InMemoryAccountService::default());
        let passcode = Arc::new(FilePasscodeStore::in_memory(LocalPasscodeState::default()));
        let trigger = trigger(&service, &passcode);

        assert_eq!(trigger.mount_privacy_section(), 2);
        assert_eq!(trigger.mount_privacy_section(), 0);
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(service.privacy_fetches(), 2);
    }

    #[tokio::test]
    async fn background_events_never_reload() {
        let service = Arc::new(InMemoryAccountService::default());
        let passcode = Arc::new(FilePasscodeStore::in_memory(LocalPasscodeState::default()));
        let trigger = trigger(&service, &passcode);

        assert!(!trigger.on_app_state(AppState::Backgrounded));
        assert!(trigger.on_app_state(AppState::Foregrounded));
    }

    #[test]
    fn passcode_changes_rederive_views_synchronously() {
        let service = Arc::new(InMemoryAccountService::default());
        let passcode = Arc::new(FilePasscodeStore::in_memory(LocalPasscodeState::default()));
        let trigger = trigger(&service, &passcode);

        passcode.enable().unwrap();
        trigger.on_passcode_changed();
        assert!(trigger.views.passcode().get().enabled);
        assert!(trigger.views.separators().get().after_passcode);
        assert_eq!(service.network_calls(), 0);
    }
}
