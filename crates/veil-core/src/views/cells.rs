use std::collections::BTreeMap;

use super::{CloudPasswordView, DerivedViewBuilder, PasscodeView, PrivacyRowView, SeparatorView};
use crate::models::{LocalPasscodeState, PasswordState, PrivacyKey, PrivacyRule};
use crate::signal::ViewCell;

/// View values of the privacy & security screen.
///
/// Each `apply_*` call re-derives the affected values; cells only publish
/// when a value actually changed.
#[derive(Debug, Clone)]
pub struct ScreenViews {
    builder: DerivedViewBuilder,
    cloud_password: ViewCell<CloudPasswordView>,
    has_cloud_password: ViewCell<bool>,
    passcode: ViewCell<PasscodeView>,
    passcode_enabled: ViewCell<bool>,
    separators: ViewCell<SeparatorView>,
    privacy: BTreeMap<PrivacyKey, ViewCell<PrivacyRowView>>,
}

impl ScreenViews {
    pub fn new(
        builder: DerivedViewBuilder,
        privacy_keys: &[PrivacyKey],
        passcode: &LocalPasscodeState,
    ) -> Self {
        let privacy = privacy_keys
            .iter()
            .map(|key| (*key, ViewCell::new(builder.privacy_row(*key, None))))
            .collect();
        Self {
            cloud_password: ViewCell::new(builder.cloud_password(None, None)),
            has_cloud_password: ViewCell::new(false),
            passcode: ViewCell::new(builder.passcode(passcode)),
            passcode_enabled: ViewCell::new(passcode.enabled),
            separators: ViewCell::new(DerivedViewBuilder::separators(passcode.enabled, false)),
            privacy,
            builder,
        }
    }

    pub const fn builder(&self) -> &DerivedViewBuilder {
        &self.builder
    }

    pub const fn cloud_password(&self) -> &ViewCell<CloudPasswordView> {
        &self.cloud_password
    }

    pub const fn has_cloud_password(&self) -> &ViewCell<bool> {
        &self.has_cloud_password
    }

    pub const fn passcode(&self) -> &ViewCell<PasscodeView> {
        &self.passcode
    }

    pub const fn separators(&self) -> &ViewCell<SeparatorView> {
        &self.separators
    }

    pub fn privacy_row(&self, key: PrivacyKey) -> Option<&ViewCell<PrivacyRowView>> {
        self.privacy.get(&key)
    }

    pub fn privacy_keys(&self) -> impl Iterator<Item = PrivacyKey> + '_ {
        self.privacy.keys().copied()
    }

    /// Whether the "waiting for confirmation" label is currently shown.
    pub fn unconfirmed_visible(&self) -> bool {
        self.cloud_password.get().unconfirmed.visible
    }

    pub fn apply_password_state(&self, state: Option<&PasswordState>) {
        let previous = self.cloud_password.get().confirmation_text;
        let view = self.builder.cloud_password(state, Some(&previous));
        let has_password = view.has_password;
        if self.cloud_password.set(view) {
            tracing::debug!(has_password, "Cloud password view updated");
        }
        self.has_cloud_password.set(has_password);
        self.refresh_separators();
    }

    pub fn apply_passcode(&self, state: &LocalPasscodeState) {
        if self.passcode.set(self.builder.passcode(state)) {
            tracing::debug!(enabled = state.enabled, "Passcode view updated");
        }
        self.passcode_enabled.set(state.enabled);
        self.refresh_separators();
    }

    pub fn apply_privacy_rule(&self, key: PrivacyKey, rule: &PrivacyRule) {
        if let Some(cell) = self.privacy.get(&key) {
            cell.set(self.builder.privacy_row(key, Some(rule)));
        }
    }

    fn refresh_separators(&self) {
        self.separators.set(DerivedViewBuilder::separators(
            self.passcode_enabled.get(),
            self.has_cloud_password.get(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlgoDescriptor, PasswordRequest, PrivacyOption};

    fn views() -> ScreenViews {
        ScreenViews::new(
            DerivedViewBuilder::default(),
            &PrivacyKey::ALL,
            &LocalPasscodeState::default(),
        )
    }

    #[test]
    fn identical_states_do_not_retrigger_toggles() {
        let views = views();
        let mut has_password = views.has_cloud_password().subscribe();
        assert_eq!(has_password.try_next(), Some(false));

        let confirmed = PasswordState {
            request: Some(PasswordRequest {
                algo: AlgoDescriptor {
                    name: "pbkdf2".to_string(),
                    salt: String::new(),
                },
                srp_id: 4,
                srp_b: String::new(),
            }),
            ..PasswordState::default()
        };
        views.apply_password_state(Some(&confirmed));
        views.apply_password_state(Some(&confirmed));
        let mut with_hint = confirmed.clone();
        with_hint.hint = "pet name".to_string();
        views.apply_password_state(Some(&with_hint));

        assert_eq!(has_password.try_next(), Some(true));
        assert_eq!(has_password.try_next(), None);
    }

    #[test]
    fn separators_combine_passcode_and_password() {
        let views = views();
        assert_eq!(views.separators().get(), SeparatorView::default());

        views.apply_passcode(&LocalPasscodeState {
            enabled: true,
            auto_lock_seconds: 600,
        });
        let separators = views.separators().get();
        assert!(separators.after_passcode);
        assert!(!separators.after_cloud_password);
        assert_eq!(views.passcode().get().auto_lock_value, "10 minutes");
    }

    #[test]
    fn untracked_privacy_keys_are_ignored() {
        let views = ScreenViews::new(
            DerivedViewBuilder::default(),
            &[PrivacyKey::Calls],
            &LocalPasscodeState::default(),
        );
        views.apply_privacy_rule(PrivacyKey::LastSeen, &PrivacyRule::new(PrivacyOption::Nobody));
        assert!(views.privacy_row(PrivacyKey::LastSeen).is_none());

        views.apply_privacy_rule(PrivacyKey::Calls, &PrivacyRule::new(PrivacyOption::Nobody));
        let row = views.privacy_row(PrivacyKey::Calls).unwrap().get();
        assert_eq!(row.value.as_deref(), Some("Nobody"));
    }
}
