//! Where the CLI keeps its files and how it reaches the account service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use veil_core::config::SettingsConfig;
use veil_core::memory::InMemoryAccountService;
use veil_core::service::{AccessToken, AccountService, HttpAccountService};
use veil_core::util::normalize_text_option;

use crate::error::CliError;

pub const ENV_ACCESS_TOKEN: &str = "VEIL_ACCESS_TOKEN";
const CONFIG_FILE_NAME: &str = "settings.json";
const PASSCODE_FILE_NAME: &str = "passcode.json";
const DEMO_PASSWORD: &str = "demo";

pub fn config_dir() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("veil"))
        .ok_or_else(|| CliError::Config("Failed to resolve config directory".to_string()))
}

/// Explicit path, or the default settings file when it exists.
pub fn resolve_config_path(explicit: Option<PathBuf>, config_dir: &Path) -> Option<PathBuf> {
    explicit.or_else(|| {
        let path = config_dir.join(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    })
}

pub fn resolve_passcode_path(explicit: Option<PathBuf>, config_dir: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| config_dir.join(PASSCODE_FILE_NAME))
}

pub fn load_settings(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SettingsConfig, CliError> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading settings file");
            SettingsConfig::load(path)?
        }
        None => SettingsConfig::default(),
    };
    Ok(config.merge_env(lookup)?)
}

/// Services the CLI can talk to.
pub enum Backend {
    Http(Arc<HttpAccountService>),
    Demo(Arc<InMemoryAccountService>),
}

impl Backend {
    pub fn connect(
        demo: bool,
        config: &SettingsConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CliError> {
        if demo {
            tracing::info!("Using in-process demo account (password: {DEMO_PASSWORD})");
            return Ok(Self::Demo(Arc::new(InMemoryAccountService::with_password(
                DEMO_PASSWORD,
                "the usual",
            ))));
        }

        let Some(base_url) = config.api_base_url.as_deref() else {
            return Err(CliError::ServiceNotConfigured);
        };
        let Some(token) = normalize_text_option(lookup(ENV_ACCESS_TOKEN)) else {
            return Err(CliError::ServiceNotConfigured);
        };
        let service = HttpAccountService::new(base_url, AccessToken::new(token)?)?;
        tracing::info!(base_url = service.base_url(), "Using account service");
        Ok(Self::Http(Arc::new(service)))
    }

    pub fn service(&self) -> Arc<dyn AccountService> {
        match self {
            Self::Http(service) => service.clone(),
            Self::Demo(service) => service.clone(),
        }
    }

    pub fn demo(&self) -> Option<&InMemoryAccountService> {
        match self {
            Self::Http(_) => None,
            Self::Demo(service) => Some(service),
        }
    }
}
