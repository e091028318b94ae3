//! Root settings stored in `.modlink/config.toml`.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::vcs::VcsKind;

/// Name of the private state directory under the projection root.
pub const STATE_DIR: &str = ".modlink";

/// Settings file name inside [`STATE_DIR`].
pub const SETTINGS_FILE: &str = "config.toml";

/// Directory inside [`STATE_DIR`] holding one working copy per module.
pub const MODULES_DIR: &str = "modules";

/// Descriptor file name used when the settings do not name one.
pub const DEFAULT_DESCRIPTOR: &str = "modlink.map";

/// Per-root settings.
///
/// ```toml
/// repository = "https://svn.example.com/modules"
/// vcs = "svn"
/// descriptor = "modlink.map"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Base URL that module names are appended to on checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// VCS client flavour.
    #[serde(default)]
    pub vcs: VcsKind,
    /// Descriptor file name looked up at each module root.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
}

fn default_descriptor() -> String {
    DEFAULT_DESCRIPTOR.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repository: None,
            vcs: VcsKind::default(),
            descriptor: default_descriptor(),
        }
    }
}

impl Settings {
    /// Path of the settings file for `root`.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(STATE_DIR).join(SETTINGS_FILE)
    }

    /// Load the settings of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotInitialized`] when the settings file does
    /// not exist, [`ConfigError::Io`] when it cannot be read, and
    /// [`ConfigError::InvalidSyntax`] when it is not valid TOML.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(root);
        if !path.exists() {
            return Err(ConfigError::NotInitialized {
                root: root.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::InvalidSyntax {
            file: path,
            message: e.message().to_string(),
        })
    }

    /// Write the settings of `root`, creating the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory or file cannot be written.
    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        let path = Self::path(root);
        let modules = root.join(STATE_DIR).join(MODULES_DIR);
        std::fs::create_dir_all(&modules).map_err(|source| ConfigError::Io {
            path: modules,
            source,
        })?;

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidSyntax {
            file: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|source| ConfigError::Io { path, source })
    }
}
