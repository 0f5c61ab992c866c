//! Configuration management for nodepoolctl
//!
//! Handles configuration loading from files, environment variables, and command-line arguments.
//! Configuration is stored in TOML format with support for multiple named profiles.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use super::polling::PollingConfig;

/// Environment variable overriding a profile's auth token
pub const AUTH_TOKEN_ENV: &str = "NODEPOOLCTL_AUTH_TOKEN";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Profile {
    /// Region the Container Engine endpoint is derived from, e.g. `us-ashburn-1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Explicit API endpoint, overriding the region-derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Compartment node pools are listed and created in
    pub compartment_id: String,
    /// Bearer token. Supports the `keyring:` prefix for secure storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Path to the cluster's kubeconfig
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
    /// Polling and paging settings for this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling: Option<PollingConfig>,
}

impl Profile {
    /// Create a profile for a region and compartment
    pub fn new(region: impl Into<String>, compartment_id: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            compartment_id: compartment_id.into(),
            ..Default::default()
        }
    }

    /// Polling settings, falling back to defaults
    pub fn polling(&self) -> PollingConfig {
        self.polling.clone().unwrap_or_default()
    }

    /// Get the resolved auth token (with keyring support)
    ///
    /// When `use_env` is set, `NODEPOOLCTL_AUTH_TOKEN` takes precedence.
    pub fn resolve_auth_token(&self, use_env: bool) -> Result<Option<String>> {
        let env_var = use_env.then_some(AUTH_TOKEN_ENV);
        let store = CredentialStore::new();

        match (&self.auth_token, env_var) {
            (Some(token), _) => store.get_credential(token, env_var).map(Some).map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve auth token: {}", e))
            }),
            (None, Some(var)) => Ok(std::env::var(var).ok()),
            (None, None) => Ok(None),
        }
    }

    /// Returns true if the profile stores a token
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }
}

impl Config {
    /// Resolve the profile to use
    ///
    /// Resolution order: explicit name, configured default, then the
    /// alphabetically first profile.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some((name, _)) = self.list_profiles().first() {
            return Ok(name.to_string());
        }

        Err(ConfigError::NoProfiles {
            suggestion: "Use 'nodepoolctl profile set' to create a profile.".to_string(),
        })
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, this supports both the standard macOS path and Linux-style ~/.config path:
    /// 1. Check ~/.config/nodepoolctl/config.toml (Linux-style, preferred for consistency)
    /// 2. Fall back to ~/Library/Application Support/dev.nodepoolctl.nodepoolctl/config.toml
    ///
    /// On Linux: ~/.config/nodepoolctl/config.toml
    /// On Windows: %APPDATA%\nodepoolctl\nodepoolctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("nodepoolctl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("dev", "nodepoolctl", "nodepoolctl")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax. Unset variables without a
    /// default are left as-is so profiles that aren't used don't fail to load.
    ///
    /// Example:
    /// ```toml
    /// auth_token = "${OCI_TOKEN}"
    /// region = "${OCI_REGION:-us-ashburn-1}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
