//! Derived view values.
//!
//! Everything here is a pure function of the cached state. [`ScreenViews`]
//! holds the results in [`crate::signal::ViewCell`]s so consecutive identical
//! values never reach the UI twice.

mod cells;

use crate::config::{Labels, SettingsConfig};
use crate::models::{LocalPasscodeState, PasswordState, PrivacyKey, PrivacyOption, PrivacyRule};

pub use cells::ScreenViews;

/// Whether the account has, or is about to have, a cloud password.
pub fn has_cloud_password(state: &PasswordState) -> bool {
    state.request.is_some() || state.unknown_algorithm || !state.unconfirmed_pattern.is_empty()
}

pub fn is_unconfirmed(state: &PasswordState) -> bool {
    !state.unconfirmed_pattern.is_empty()
}

pub fn option_label(labels: &Labels, option: PrivacyOption) -> &str {
    match option {
        PrivacyOption::Everyone => &labels.privacy_everyone,
        PrivacyOption::Contacts => &labels.privacy_contacts,
        PrivacyOption::Nobody => &labels.privacy_nobody,
    }
}

pub fn privacy_title(labels: &Labels, key: PrivacyKey) -> &str {
    match key {
        PrivacyKey::LastSeen => &labels.last_seen,
        PrivacyKey::Calls => &labels.calls,
        PrivacyKey::Invites => &labels.group_invites,
    }
}

/// Rule label with a `(-never, +always)` suffix; zero counts are left out.
pub fn display_label(
    labels: &Labels,
    option: PrivacyOption,
    never_count: usize,
    always_count: usize,
) -> String {
    let base = option_label(labels, option);
    let mut counts = Vec::with_capacity(2);
    if never_count > 0 {
        counts.push(format!("-{never_count}"));
    }
    if always_count > 0 {
        counts.push(format!("+{always_count}"));
    }
    if counts.is_empty() {
        base.to_string()
    } else {
        format!("{base} ({})", counts.join(", "))
    }
}

/// Auto-lock delay text: whole hours when divisible by 3600, else minutes.
pub fn passcode_label(labels: &Labels, auto_lock_seconds: u32) -> String {
    if auto_lock_seconds % 3600 == 0 {
        labels.hours(auto_lock_seconds / 3600)
    } else {
        labels.minutes(auto_lock_seconds / 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
    pub animated: bool,
}

impl Visibility {
    pub const fn animated(visible: bool) -> Self {
        Self {
            visible,
            animated: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudPasswordView {
    pub has_password: bool,
    /// Loading/waiting label shown above the buttons.
    pub confirmation_text: String,
    pub unconfirmed: Visibility,
    pub change_text: String,
    pub change_button: Visibility,
    pub disable_text: String,
    pub disable_button: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeView {
    pub enabled: bool,
    pub toggle_text: String,
    /// Disable and auto-lock rows.
    pub settings_rows: Visibility,
    pub disable_text: String,
    pub auto_lock_title: String,
    pub auto_lock_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyRowView {
    pub key: PrivacyKey,
    pub title: String,
    /// `None` until the rule has been fetched.
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeparatorView {
    pub after_passcode: bool,
    pub after_cloud_password: bool,
}

/// Maps cached state to view values.
#[derive(Debug, Clone)]
pub struct DerivedViewBuilder {
    labels: Labels,
    instant_unconfirmed_toggle: bool,
    idle_supported: bool,
}

impl Default for DerivedViewBuilder {
    fn default() -> Self {
        Self::from_config(&SettingsConfig::default())
    }
}

impl DerivedViewBuilder {
    pub fn from_config(config: &SettingsConfig) -> Self {
        Self {
            labels: config.labels.clone(),
            instant_unconfirmed_toggle: config.instant_unconfirmed_toggle,
            idle_supported: config.idle_supported,
        }
    }

    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Cloud password rows.
    ///
    /// Before the first fetch the section shows the loading label with the
    /// buttons hidden. An empty pattern keeps `previous_confirmation` so the
    /// label does not flash while it slides out.
    pub fn cloud_password(
        &self,
        state: Option<&PasswordState>,
        previous_confirmation: Option<&str>,
    ) -> CloudPasswordView {
        let has_password = state.is_some_and(has_cloud_password);
        let unconfirmed = state.map_or(true, is_unconfirmed);
        let confirmation_text = match state {
            Some(state) if is_unconfirmed(state) => {
                self.labels.waiting_for(&state.unconfirmed_pattern)
            }
            _ => previous_confirmation.map_or_else(|| self.labels.loading.clone(), str::to_string),
        };
        let animated = !self.instant_unconfirmed_toggle;

        CloudPasswordView {
            has_password,
            confirmation_text,
            unconfirmed: Visibility {
                visible: unconfirmed,
                animated,
            },
            change_text: if has_password {
                self.labels.cloud_password_edit.clone()
            } else {
                self.labels.cloud_password_set.clone()
            },
            change_button: Visibility {
                visible: !unconfirmed,
                animated,
            },
            disable_text: self.labels.cloud_password_disable.clone(),
            disable_button: Visibility::animated(has_password),
        }
    }

    pub fn passcode(&self, state: &LocalPasscodeState) -> PasscodeView {
        PasscodeView {
            enabled: state.enabled,
            toggle_text: if state.enabled {
                self.labels.passcode_change.clone()
            } else {
                self.labels.passcode_turn_on.clone()
            },
            settings_rows: Visibility::animated(state.enabled),
            disable_text: self.labels.passcode_disable.clone(),
            auto_lock_title: if self.idle_supported {
                self.labels.autolock_away.clone()
            } else {
                self.labels.autolock_inactive.clone()
            },
            auto_lock_value: passcode_label(&self.labels, state.auto_lock_seconds),
        }
    }

    pub fn privacy_row(&self, key: PrivacyKey, rule: Option<&PrivacyRule>) -> PrivacyRowView {
        PrivacyRowView {
            key,
            title: privacy_title(&self.labels, key).to_string(),
            value: rule.map(|rule| {
                display_label(
                    &self.labels,
                    rule.option(),
                    rule.never().len(),
                    rule.always().len(),
                )
            }),
        }
    }

    pub const fn separators(passcode_enabled: bool, has_password: bool) -> SeparatorView {
        SeparatorView {
            after_passcode: passcode_enabled || has_password,
            after_cloud_password: has_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::models::{AlgoDescriptor, PasswordRequest, PeerId};

    fn english() -> Labels {
        let mut labels = Labels::default();
        labels.privacy_contacts = "Contacts".to_string();
        labels
    }

    fn request() -> PasswordRequest {
        PasswordRequest {
            algo: AlgoDescriptor {
                name: "pbkdf2".to_string(),
                salt: String::new(),
            },
            srp_id: 1,
            srp_b: String::new(),
        }
    }

    #[test]
    fn display_label_omits_zero_counts() {
        let labels = english();
        assert_eq!(display_label(&labels, PrivacyOption::Everyone, 0, 0), "Everyone");
        assert_eq!(display_label(&labels, PrivacyOption::Contacts, 3, 0), "Contacts (-3)");
        assert_eq!(display_label(&labels, PrivacyOption::Nobody, 0, 5), "Nobody (+5)");
        assert_eq!(
            display_label(&labels, PrivacyOption::Contacts, 2, 4),
            "Contacts (-2, +4)"
        );
    }

    #[test]
    fn passcode_label_uses_hour_modulus() {
        let labels = Labels::default();
        assert_eq!(passcode_label(&labels, 90), "1 minute");
        assert_eq!(passcode_label(&labels, 300), "5 minutes");
        assert_eq!(passcode_label(&labels, 3600), "1 hour");
        assert_eq!(passcode_label(&labels, 18_000), "5 hours");
        assert_eq!(passcode_label(&labels, 5400), "90 minutes");
    }

    #[test]
    fn has_cloud_password_covers_unknown_algorithm() {
        let unknown = PasswordState {
            unknown_algorithm: true,
            ..PasswordState::default()
        };
        assert!(has_cloud_password(&unknown));
        assert!(!has_cloud_password(&PasswordState::default()));
    }

    #[test]
    fn cloud_password_before_first_fetch_shows_loading() {
        let view = DerivedViewBuilder::default().cloud_password(None, None);
        assert!(!view.has_password);
        assert_eq!(view.confirmation_text, "Loading...");
        assert!(view.unconfirmed.visible);
        assert!(!view.change_button.visible);
        assert!(!view.disable_button.visible);
    }

    #[test]
    fn unconfirmed_state_shows_waiting_text() {
        let state = PasswordState {
            unconfirmed_pattern: "a***@b.com".to_string(),
            ..PasswordState::default()
        };
        let view = DerivedViewBuilder::default().cloud_password(Some(&state), None);
        assert!(view.has_password);
        assert!(view.unconfirmed.visible);
        assert!(!view.unconfirmed.animated);
        assert_eq!(view.confirmation_text, "Waiting for confirmation (a***@b.com)");
    }

    #[test]
    fn confirmed_state_keeps_previous_confirmation_text() {
        let state = PasswordState {
            request: Some(request()),
            ..PasswordState::default()
        };
        let view = DerivedViewBuilder::default()
            .cloud_password(Some(&state), Some("Waiting for confirmation (x)"));
        assert_eq!(view.confirmation_text, "Waiting for confirmation (x)");
        assert!(!view.unconfirmed.visible);
        assert!(view.change_button.visible);
        assert_eq!(view.change_text, "Change cloud password");
        assert!(view.disable_button.visible);
    }

    #[test]
    fn animated_toggle_is_configurable() {
        let config = SettingsConfig {
            instant_unconfirmed_toggle: false,
            ..SettingsConfig::default()
        };
        let view = DerivedViewBuilder::from_config(&config).cloud_password(None, None);
        assert!(view.unconfirmed.animated);
        assert!(view.change_button.animated);
    }

    #[test]
    fn passcode_view_follows_idle_support() {
        let config = SettingsConfig {
            idle_supported: false,
            ..SettingsConfig::default()
        };
        let state = LocalPasscodeState {
            enabled: true,
            auto_lock_seconds: 60,
        };
        let view = DerivedViewBuilder::from_config(&config).passcode(&state);
        assert_eq!(view.toggle_text, "Change local passcode");
        assert_eq!(view.auto_lock_title, "Auto-lock after inactivity");
        assert_eq!(view.auto_lock_value, "1 minute");
        assert!(view.settings_rows.visible);
    }

    #[test]
    fn privacy_row_counts_exceptions() {
        let rule = PrivacyRule::with_exceptions(
            PrivacyOption::Contacts,
            [PeerId(1)],
            [PeerId(2), PeerId(3)],
        )
        .unwrap();
        let row = DerivedViewBuilder::default().privacy_row(PrivacyKey::Calls, Some(&rule));
        assert_eq!(row.title, "Calls");
        assert_eq!(row.value.as_deref(), Some("My contacts (-1, +2)"));
        assert_eq!(
            DerivedViewBuilder::default()
                .privacy_row(PrivacyKey::LastSeen, None)
                .value,
            None
        );
    }

    #[test]
    fn separators_follow_both_sections() {
        assert_eq!(
            DerivedViewBuilder::separators(true, false),
            SeparatorView {
                after_passcode: true,
                after_cloud_password: false,
            }
        );
        assert_eq!(DerivedViewBuilder::separators(false, false), SeparatorView::default());
        assert!(DerivedViewBuilder::separators(false, true).after_cloud_password);
    }

    proptest! {
        #[test]
        fn display_label_is_deterministic(never in 0usize..50, always in 0usize..50) {
            let labels = english();
            let first = display_label(&labels, PrivacyOption::Nobody, never, always);
            prop_assert_eq!(&first, &display_label(&labels, PrivacyOption::Nobody, never, always));
            prop_assert_eq!(first.contains('('), never > 0 || always > 0);
            prop_assert_eq!(first.contains('-'), never > 0);
            prop_assert_eq!(first.contains('+'), always > 0);
        }
    }
}
