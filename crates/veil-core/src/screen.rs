//! The mounted privacy & security screen.
//!
//! Mounting wires store subscriptions into [`ScreenViews`], issues the
//! initial reloads, and starts the lifecycle trigger. Dropping the screen
//! stops all of it; the stores and their cached values outlive it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::context::AccountContext;
use crate::lifecycle::{AppState, LifecycleReloadTrigger};
use crate::passcode::LocalPasscodeStore;
use crate::signal::Subscription;
use crate::views::{DerivedViewBuilder, ScreenViews};

pub struct PrivacySecurityScreen {
    views: ScreenViews,
    trigger: Arc<LifecycleReloadTrigger>,
    tasks: Vec<JoinHandle<()>>,
}

impl PrivacySecurityScreen {
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        context: &Arc<AccountContext>,
        passcode: Arc<dyn LocalPasscodeStore>,
        lifecycle: Subscription<AppState>,
    ) -> Self {
        let config = context.config();
        let views = ScreenViews::new(
            DerivedViewBuilder::from_config(config),
            &config.privacy_keys,
            &passcode.state(),
        );
        let mut tasks = Vec::with_capacity(config.privacy_keys.len() + 2);

        let password = context.password_store();
        let mut updates = password.subscribe();
        let password_views = views.clone();
        password_views.apply_password_state(password.get_current().as_ref());
        tasks.push(tokio::spawn(async move {
            while let Some(state) = updates.next().await {
                password_views.apply_password_state(Some(&state));
            }
        }));

        for key in &config.privacy_keys {
            let key = *key;
            let mut updates = context.privacy_store(key).subscribe();
            let privacy_views = views.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(rule) = updates.next().await {
                    privacy_views.apply_privacy_rule(key, &rule);
                }
            }));
        }

        let passcode_changes = passcode.changes();
        let trigger = Arc::new(LifecycleReloadTrigger::new(
            Arc::clone(context),
            passcode,
            views.clone(),
        ));
        trigger.mount_privacy_section();
        password.reload();
        tasks.push(tokio::spawn(
            Arc::clone(&trigger).run(lifecycle, passcode_changes),
        ));

        tracing::debug!(tasks = tasks.len(), "Privacy & security screen mounted");
        Self {
            views,
            trigger,
            tasks,
        }
    }

    pub const fn views(&self) -> &ScreenViews {
        &self.views
    }

    pub fn trigger(&self) -> &LifecycleReloadTrigger {
        &self.trigger
    }
}

impl Drop for PrivacySecurityScreen {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
