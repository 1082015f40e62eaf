use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use veil_core::context::AccountContext;
use veil_core::passcode::FilePasscodeStore;
use veil_core::views::ScreenViews;
use veil_core::PrivacyKey;

use crate::error::CliError;
use crate::settings::{
    config_dir, load_settings, resolve_config_path, resolve_passcode_path, Backend,
};

/// Everything a command needs to reach account and local state.
pub struct Session {
    pub backend: Backend,
    pub context: Arc<AccountContext>,
    pub passcode: Arc<FilePasscodeStore>,
}

impl Session {
    pub fn open(
        config_path: Option<PathBuf>,
        passcode_path: Option<PathBuf>,
        demo: bool,
    ) -> Result<Self, CliError> {
        let dir = config_dir()?;
        let config_path = resolve_config_path(config_path, &dir);
        let config = load_settings(config_path.as_deref(), |name| std::env::var(name).ok())?;
        let backend = Backend::connect(demo, &config, |name| std::env::var(name).ok())?;
        let passcode = FilePasscodeStore::open(resolve_passcode_path(passcode_path, &dir))?;
        let context = AccountContext::new(backend.service(), config);
        Ok(Self {
            backend,
            context,
            passcode: Arc::new(passcode),
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PrivacyRowItem {
    pub key: PrivacyKey,
    pub title: String,
    pub value: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CloudPasswordItem {
    pub has_password: bool,
    pub unconfirmed: bool,
    pub label: Option<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PasscodeItem {
    pub enabled: bool,
    pub auto_lock: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScreenSnapshot {
    pub privacy: Vec<PrivacyRowItem>,
    pub passcode: PasscodeItem,
    pub cloud_password: CloudPasswordItem,
}

pub fn privacy_items(views: &ScreenViews) -> Vec<PrivacyRowItem> {
    views
        .privacy_keys()
        .filter_map(|key| views.privacy_row(key))
        .map(|cell| {
            let row = cell.get();
            PrivacyRowItem {
                key: row.key,
                title: row.title,
                value: row.value,
            }
        })
        .collect()
}

pub fn snapshot(views: &ScreenViews) -> ScreenSnapshot {
    let cloud = views.cloud_password().get();
    let passcode = views.passcode().get();
    let mut actions = Vec::new();
    if cloud.change_button.visible {
        actions.push(cloud.change_text);
    }
    if cloud.disable_button.visible {
        actions.push(cloud.disable_text);
    }
    ScreenSnapshot {
        privacy: privacy_items(views),
        passcode: PasscodeItem {
            enabled: passcode.enabled,
            auto_lock: passcode.enabled.then_some(passcode.auto_lock_value),
        },
        cloud_password: CloudPasswordItem {
            has_password: cloud.has_password,
            unconfirmed: cloud.unconfirmed.visible,
            label: cloud.unconfirmed.visible.then_some(cloud.confirmation_text),
            actions,
        },
    }
}

pub fn format_privacy_lines(items: &[PrivacyRowItem], loading: &str) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{}: {}", item.title, item.value.as_deref().unwrap_or(loading)))
        .collect()
}

pub fn format_screen_lines(views: &ScreenViews) -> Vec<String> {
    let labels = views.builder().labels();
    let snapshot = snapshot(views);
    let passcode = views.passcode().get();

    let mut lines = vec!["Privacy".to_string()];
    lines.extend(
        format_privacy_lines(&snapshot.privacy, &labels.loading)
            .into_iter()
            .map(|line| format!("  {line}")),
    );

    lines.push("Local passcode".to_string());
    lines.push(format!("  {}", passcode.toggle_text));
    if let Some(auto_lock) = &snapshot.passcode.auto_lock {
        lines.push(format!("  {}", passcode.disable_text));
        lines.push(format!("  {}: {auto_lock}", passcode.auto_lock_title));
    }

    lines.push("Cloud password".to_string());
    if let Some(label) = &snapshot.cloud_password.label {
        lines.push(format!("  {label}"));
    }
    lines.extend(
        snapshot
            .cloud_password
            .actions
            .iter()
            .map(|action| format!("  {action}")),
    );
    lines
}
