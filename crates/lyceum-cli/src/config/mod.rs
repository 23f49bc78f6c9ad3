//! Configuration management for the Lyceum CLI
//!
//! Values are layered with figment: compiled-in defaults, then the TOML file,
//! then `LYCEUM_*` environment variables (`LYCEUM_API_BASE_URL`,
//! `LYCEUM_API_TIMEOUT_SECS`, `LYCEUM_SESSION_DIR`, ...).

use crate::error::{CliError, Result};
use etcetera::{choose_base_strategy, BaseStrategy};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
    Figment,
};
use lyceum_common::{defaults, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Top-level sections addressable from the environment
const ENV_SECTIONS: &[&str] = &["api", "session"];

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the signed-in session is kept
    #[serde(default)]
    pub session: SessionConfig,
}

/// API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for the Lyceum backend
    pub base_url: String,

    /// Per-request timeout, refresh included
    pub timeout_secs: u64,

    /// Refresh endpoint relative to `base_url`
    pub refresh_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_API_URL.to_string(),
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
            refresh_path: defaults::REFRESH_PATH.to_string(),
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Directory holding the session file; the user's data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration, reading `path` instead of the default file when given
    ///
    /// A missing file is not an error: defaults and environment still apply.
    /// A file that exists but cannot be read is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => expand_tilde(path),
            None => Self::default_config_path()?,
        };
        debug!("Loading configuration from: {}", path.display());

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ConfigurationError::Io {
                    path: path.display().to_string(),
                    source,
                }
                .into())
            }
        };

        let config: Self = Self::figment(&contents)
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Layered provider chain backing [`CliConfig::load`], over the file's TOML text
    pub fn figment(toml: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .merge(Env::prefixed("LYCEUM_").map(|key| {
                // LYCEUM_API_BASE_URL -> api.base_url; only the first `_` is a separator
                let key = key.as_str().to_ascii_lowercase();
                if let Some((section, field)) = key.split_once('_') {
                    if ENV_SECTIONS.contains(&section) {
                        return Uncased::new(format!("{section}.{field}"));
                    }
                }
                Uncased::new(key)
            }))
    }

    /// Reject values the client builder would fail on later with a vaguer message
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigurationError::MissingValue {
                key: "api.base_url".into(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigurationError::invalid(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "api.timeout_secs",
                "must be greater than 0",
            ));
        }
        if !self.api.refresh_path.starts_with('/') {
            return Err(ConfigurationError::invalid(
                "api.refresh_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Directory the session file lives in
    pub fn session_dir(&self) -> Result<PathBuf> {
        match &self.session.dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => Self::data_dir(),
        }
    }

    /// Get all configuration as key-value pairs
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert("api.base_url".to_string(), self.api.base_url.clone());
        map.insert(
            "api.timeout_secs".to_string(),
            self.api.timeout_secs.to_string(),
        );
        map.insert("api.refresh_path".to_string(), self.api.refresh_path.clone());
        map.insert(
            "session.dir".to_string(),
            self.session_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| "<unavailable>".to_string()),
        );

        map
    }

    /// Get configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| {
            CliError::internal(format!("Failed to determine base directories: {e}"))
        })?;
        Ok(strategy.config_dir().join("lyceum"))
    }

    /// Get data directory
    pub fn data_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| {
            CliError::internal(format!("Failed to determine base directories: {e}"))
        })?;
        Ok(strategy.data_dir().join("lyceum"))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

/// Expand tilde (~) in file paths to home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = CliConfig::load(Some(Path::new("missing.toml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.api, ApiConfig::default());
            assert_eq!(config.api.base_url, "http://localhost:3000");
            assert_eq!(config.timeout(), Duration::from_secs(10));
            assert_eq!(config.session.dir, None);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [api]
                base_url = "https://crm.example.edu"
                timeout_secs = 30

                [session]
                dir = "/var/lib/lyceum"
                "#,
            )?;
            jail.set_env("LYCEUM_API_TIMEOUT_SECS", "5");
            jail.set_env("LYCEUM_API_REFRESH_PATH", "/v2/auth/refresh");

            let config =
                CliConfig::load(Some(Path::new("config.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(config.api.base_url, "https://crm.example.edu");
            assert_eq!(config.api.timeout_secs, 5);
            assert_eq!(config.api.refresh_path, "/v2/auth/refresh");
            assert_eq!(
                config.session_dir().map_err(|e| e.to_string())?,
                PathBuf::from("/var/lib/lyceum")
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_base_url_keeps_underscored_field() {
        Jail::expect_with(|jail| {
            jail.set_env("LYCEUM_API_BASE_URL", "http://10.0.0.5:3000");

            let config =
                CliConfig::load(Some(Path::new("none.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.api.base_url, "http://10.0.0.5:3000");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[api]\ntimeout_secs = 0\n")?;
            let err = CliConfig::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(err.to_string().contains("api.timeout_secs"));

            jail.create_file("config.toml", "[api]\nbase_url = \"ftp://crm\"\n")?;
            let err = CliConfig::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(err.to_string().contains("api.base_url"));
            Ok(())
        });
    }

    #[test]
    fn test_unreadable_config_path_is_an_error() {
        Jail::expect_with(|_jail| {
            std::fs::create_dir("config.toml").map_err(|e| e.to_string())?;

            let err = CliConfig::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(
                matches!(err, CliError::Config(ConfigurationError::Io { ref path, .. }) if path == "config.toml"),
                "got {err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/lyceum/config.toml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("lyceum/config.toml"));
        }
        assert_eq!(
            expand_tilde(Path::new("/etc/lyceum.toml")),
            PathBuf::from("/etc/lyceum.toml")
        );
    }
}
