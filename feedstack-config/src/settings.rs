//! Server settings, read from `feedstack.toml`.
//!
//! ```toml
//! [server]
//! config_root = "conf/feedstack"
//!
//! [wrappers]
//! implicit = "skip"   # skip | before | after
//!
//! [access_control]
//! enabled = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigResult;

/// How an adapter's implicit wrapper list combines with its explicit one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplicitWrapperPolicy {
    #[default]
    /// Apply explicit wrappers only.
    Skip,
    /// Implicit wrappers sit inside the explicit ones.
    Before,
    /// Implicit wrappers sit outside the explicit ones.
    After,
}

/// Settings shared by every adapter and wrapper of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding per-namespace configuration.
    pub config_root: PathBuf,
    pub implicit_wrappers: ImplicitWrapperPolicy,
    /// When false, access-control wrappers let every call through.
    pub access_control_enabled: bool,
}

fn default_config_root() -> PathBuf {
    PathBuf::from("conf/feedstack")
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_root: default_config_root(),
            implicit_wrappers: ImplicitWrapperPolicy::default(),
            access_control_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Loads settings from `path`. A missing or unreadable file falls back
    /// to defaults with a warning.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded server settings from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse settings file {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parses settings from TOML text. Unlike [`load_from`](Self::load_from)
    /// this reports errors.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let file: SettingsFile = toml::from_str(contents)?;
        Ok(file.into_config())
    }

    #[must_use]
    pub fn with_implicit_wrappers(mut self, policy: ImplicitWrapperPolicy) -> Self {
        self.implicit_wrappers = policy;
        self
    }

    #[must_use]
    pub fn with_access_control(mut self, enabled: bool) -> Self {
        self.access_control_enabled = enabled;
        self
    }
}

/// Raw TOML structure of the settings file.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    wrappers: WrapperSection,
    #[serde(default)]
    access_control: AccessControlSection,
}

#[derive(Deserialize)]
struct ServerSection {
    #[serde(default = "default_config_root")]
    config_root: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            config_root: default_config_root(),
        }
    }
}

#[derive(Deserialize, Default)]
struct WrapperSection {
    #[serde(default)]
    implicit: ImplicitWrapperPolicy,
}

#[derive(Deserialize)]
struct AccessControlSection {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for AccessControlSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SettingsFile {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            config_root: self.server.config_root,
            implicit_wrappers: self.wrappers.implicit,
            access_control_enabled: self.access_control.enabled,
        }
    }
}
