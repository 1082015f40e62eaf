//! User-visible strings.

use serde::{Deserialize, Serialize};

/// Every string the settings views render.
///
/// Templates use `{count}` and `{email}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub privacy_everyone: String,
    pub privacy_contacts: String,
    pub privacy_nobody: String,
    pub last_seen: String,
    pub calls: String,
    pub group_invites: String,
    pub loading: String,
    pub cloud_password_waiting: String,
    pub cloud_password_set: String,
    pub cloud_password_edit: String,
    pub cloud_password_disable: String,
    pub passcode_turn_on: String,
    pub passcode_change: String,
    pub passcode_disable: String,
    pub autolock_away: String,
    pub autolock_inactive: String,
    pub minutes_one: String,
    pub minutes_other: String,
    pub hours_one: String,
    pub hours_other: String,
    pub update_required: String,
    pub update_action: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            privacy_everyone: "Everyone".to_string(),
            privacy_contacts: "My contacts".to_string(),
            privacy_nobody: "Nobody".to_string(),
            last_seen: "Last seen".to_string(),
            calls: "Calls".to_string(),
            group_invites: "Group invites".to_string(),
            loading: "Loading...".to_string(),
            cloud_password_waiting: "Waiting for confirmation ({email})".to_string(),
            cloud_password_set: "Set cloud password".to_string(),
            cloud_password_edit: "Change cloud password".to_string(),
            cloud_password_disable: "Disable cloud password".to_string(),
            passcode_turn_on: "Turn on local passcode".to_string(),
            passcode_change: "Change local passcode".to_string(),
            passcode_disable: "Disable local passcode".to_string(),
            autolock_away: "Auto-lock if away for".to_string(),
            autolock_inactive: "Auto-lock after inactivity".to_string(),
            minutes_one: "{count} minute".to_string(),
            minutes_other: "{count} minutes".to_string(),
            hours_one: "{count} hour".to_string(),
            hours_other: "{count} hours".to_string(),
            update_required: "Please update the app to continue.".to_string(),
            update_action: "Update".to_string(),
        }
    }
}

impl Labels {
    pub fn minutes(&self, count: u32) -> String {
        plural(count, &self.minutes_one, &self.minutes_other)
    }

    pub fn hours(&self, count: u32) -> String {
        plural(count, &self.hours_one, &self.hours_other)
    }

    pub fn waiting_for(&self, email: &str) -> String {
        self.cloud_password_waiting.replace("{email}", email)
    }
}

fn plural(count: u32, one: &str, other: &str) -> String {
    let template = if count == 1 { one } else { other };
    template.replace("{count}", &count.to_string())
}
