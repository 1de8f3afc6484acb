//! Persisted settings in `~/.config/git-commit-ai/`.
//!
//! Each setting is a small file holding one value:
//! - `config`   - API key
//! - `model`    - model identifier
//! - `base_url` - provider base URL
//! - `provider` - provider identifier

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::ConfigError;
use crate::llm::Provider;

const API_KEY_FILE: &str = "config";
const MODEL_FILE: &str = "model";
const BASE_URL_FILE: &str = "base_url";
const PROVIDER_FILE: &str = "provider";

/// Default network deadline for provider requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable to override the network deadline.
pub const TIMEOUT_ENV_VAR: &str = "CMAI_TIMEOUT";

/// File-per-key settings store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Open the store in `~/.config/git-commit-ai`, creating it if needed.
    pub fn open_default() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let store = Self::at(home.join(".config").join("git-commit-ai"));
        store.ensure_dir()?;
        Ok(store)
    }

    /// Use an explicit directory (not created until the first write).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir).map_err(|source| ConfigError::Write {
            path: self.dir.clone(),
            source,
        })?;
        set_mode(&self.dir, 0o700).map_err(|source| ConfigError::Write {
            path: self.dir.clone(),
            source,
        })
    }

    /// Read a value, trimmed. Missing files read as `None`.
    fn get(&self, file: &str) -> Result<Option<String>, ConfigError> {
        let path = self.dir.join(file);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let value = content.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Write a value atomically with owner-only permissions.
    fn set(&self, file: &str, value: &str) -> Result<(), ConfigError> {
        self.ensure_dir()?;
        let path = self.dir.join(file);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(value.as_bytes()).map_err(write_err)?;
        set_mode(tmp.path(), 0o600).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    pub fn api_key(&self) -> Result<Option<String>, ConfigError> {
        self.get(API_KEY_FILE)
    }

    /// Save the API key, keeping only its first whitespace-separated token.
    ///
    /// Guards against pasting `"sk-... --model x"` style input.
    pub fn save_api_key(&self, api_key: &str) -> Result<(), ConfigError> {
        let token = api_key.split_whitespace().next().unwrap_or_default();
        self.set(API_KEY_FILE, token)
    }

    pub fn model(&self) -> Result<Option<String>, ConfigError> {
        self.get(MODEL_FILE)
    }

    /// Save the model, stripping quotes a shell may have left in place.
    pub fn save_model(&self, model: &str) -> Result<(), ConfigError> {
        self.set(MODEL_FILE, model.trim_matches('"'))
    }

    pub fn base_url(&self) -> Result<Option<String>, ConfigError> {
        self.get(BASE_URL_FILE)
    }

    pub fn save_base_url(&self, base_url: &str) -> Result<(), ConfigError> {
        self.set(BASE_URL_FILE, base_url)
    }

    pub fn provider_id(&self) -> Result<Option<String>, ConfigError> {
        self.get(PROVIDER_FILE)
    }

    pub fn save_provider(&self, provider: Provider) -> Result<(), ConfigError> {
        self.set(PROVIDER_FILE, provider.id())
    }

    /// Switch provider, persisting its base URL and default model.
    pub fn switch_provider(
        &self,
        provider: Provider,
        base_url: &str,
        model: &str,
    ) -> Result<(), ConfigError> {
        self.save_provider(provider)?;
        self.save_base_url(base_url)?;
        self.save_model(model)
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Settings {
    /// Resolve settings from the store, filling provider defaults.
    ///
    /// An unrecognized persisted provider is an error; a missing one means
    /// OpenRouter.
    pub fn load(store: &ConfigStore) -> anyhow::Result<Self> {
        let provider = match store.provider_id()? {
            Some(id) => id.parse::<Provider>()?,
            None => Provider::OpenRouter,
        };
        let profile = provider.profile();

        // Custom has no default endpoint; it falls back to OpenRouter's.
        let base_url = store.base_url()?.unwrap_or_else(|| {
            let fallback = match profile.default_base_url {
                "" => Provider::OpenRouter.profile().default_base_url,
                url => url,
            };
            fallback.to_string()
        });
        let model = store
            .model()?
            .unwrap_or_else(|| profile.default_model.unwrap_or_default().to_string());

        Ok(Self {
            provider,
            base_url,
            model,
            api_key: store.api_key()?,
        })
    }
}

/// Get the configured request deadline.
///
/// Reads `CMAI_TIMEOUT` (seconds) if set, otherwise 30 seconds. Invalid values
/// log a warning and use the default.
pub fn request_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
