//! Local passcode settings store.
//!
//! Passcode state lives only on this device. Every create/disable/auto-lock
//! action persists the new state and notifies change subscribers.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{LocalPasscodeState, DEFAULT_AUTO_LOCK_SECONDS};
use crate::signal::{Listeners, Subscription};
use crate::util::lock;

pub trait LocalPasscodeStore: Send + Sync {
    fn state(&self) -> LocalPasscodeState;

    fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    fn auto_lock_seconds(&self) -> u32 {
        self.state().auto_lock_seconds
    }

    /// One event per local passcode mutation.
    fn changes(&self) -> Subscription<()>;
}

/// JSON-file backed passcode store; `in_memory()` skips persistence.
#[derive(Debug)]
pub struct FilePasscodeStore {
    path: Option<PathBuf>,
    state: Mutex<LocalPasscodeState>,
    listeners: Mutex<Listeners<()>>,
}

impl FilePasscodeStore {
    /// Load from `path`, starting from defaults when the file does not exist.
    ///
    /// A stored auto-lock delay of zero is replaced by the default.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let mut state: LocalPasscodeState = serde_json::from_str(&raw)?;
            if state.auto_lock_seconds == 0 {
                tracing::warn!(
                    path = %path.display(),
                    "Stored auto-lock delay is zero, using {DEFAULT_AUTO_LOCK_SECONDS}s"
                );
                state.auto_lock_seconds = DEFAULT_AUTO_LOCK_SECONDS;
            }
            state
        } else {
            LocalPasscodeState::default()
        };
        Ok(Self::with_state(Some(path), state))
    }

    pub fn in_memory(state: LocalPasscodeState) -> Self {
        Self::with_state(None, state)
    }

    fn with_state(path: Option<PathBuf>, state: LocalPasscodeState) -> Self {
        Self {
            path,
            state: Mutex::new(state),
            listeners: Mutex::new(Listeners::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn enable(&self) -> Result<()> {
        self.update(|state| state.enabled = true)
    }

    pub fn disable(&self) -> Result<()> {
        self.update(|state| state.enabled = false)
    }

    pub fn set_auto_lock(&self, seconds: u32) -> Result<()> {
        if seconds == 0 {
            return Err(Error::InvalidInput(
                "auto-lock delay must be greater than zero".to_string(),
            ));
        }
        self.update(|state| state.auto_lock_seconds = seconds)
    }

    fn update(&self, edit: impl FnOnce(&mut LocalPasscodeState)) -> Result<()> {
        let next = {
            let mut state = lock(&self.state);
            let mut next = *state;
            edit(&mut next);
            self.persist(&next)?;
            *state = next;
            next
        };
        tracing::info!(
            enabled = next.enabled,
            auto_lock_seconds = next.auto_lock_seconds,
            "Local passcode updated"
        );
        lock(&self.listeners).publish(&());
        Ok(())
    }

    fn persist(&self, state: &LocalPasscodeState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }
}

impl LocalPasscodeStore for FilePasscodeStore {
    fn state(&self) -> LocalPasscodeState {
        *lock(&self.state)
    }

    fn changes(&self) -> Subscription<()> {
        lock(&self.listeners).subscribe(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePasscodeStore::open(dir.path().join("passcode.json")).unwrap();
        assert!(!store.is_enabled());
        assert_eq!(store.auto_lock_seconds(), 3600);
    }

    #[test]
    fn mutations_persist_and_notify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("passcode.json");
        let store = FilePasscodeStore::open(&path).unwrap();
        let mut changes = store.changes();

        store.enable().unwrap();
        store.set_auto_lock(300).unwrap();
        assert_eq!(changes.try_next(), Some(()));
        assert_eq!(changes.try_next(), Some(()));

        let reopened = FilePasscodeStore::open(&path).unwrap();
        assert_eq!(
            reopened.state(),
            LocalPasscodeState {
                enabled: true,
                auto_lock_seconds: 300,
            }
        );
    }

    #[test]
    fn stored_zero_auto_lock_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passcode.json");
        std::fs::write(&path, r#"{"enabled":true,"auto_lock_seconds":0}"#).unwrap();

        let store = FilePasscodeStore::open(&path).unwrap();

        assert!(store.is_enabled());
        assert_eq!(store.auto_lock_seconds(), DEFAULT_AUTO_LOCK_SECONDS);
    }

    #[test]
    fn zero_auto_lock_is_rejected() {
        let store = FilePasscodeStore::in_memory(LocalPasscodeState::default());
        let mut changes = store.changes();
        assert!(store.set_auto_lock(0).is_err());
        assert_eq!(store.auto_lock_seconds(), 3600);
        assert_eq!(changes.try_next(), None);
    }
}
