//! Local device passcode settings.

use serde::{Deserialize, Serialize};

/// Auto-lock delay used until the user picks one.
pub const DEFAULT_AUTO_LOCK_SECONDS: u32 = 3600;

/// Client-authoritative passcode state; never fetched remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPasscodeState {
    pub enabled: bool,
    pub auto_lock_seconds: u32,
}

impl Default for LocalPasscodeState {
    fn default() -> Self {
        Self {
            enabled: false,
            auto_lock_seconds: DEFAULT_AUTO_LOCK_SECONDS,
        }
    }
}
