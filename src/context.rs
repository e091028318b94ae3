//! Explicit per-invocation context.
//!
//! Every operation receives the root and module it applies to through these
//! values; nothing reads the process working directory after start-up.
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::config::settings::{MODULES_DIR, STATE_DIR};
use crate::error::ConfigError;

/// An initialized projection root and its settings.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Projection root.
    pub root: PathBuf,
    /// Settings loaded from `.modlink/config.toml`.
    pub settings: Settings,
}

impl Workspace {
    /// Load the workspace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root has no readable settings file.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let settings = Settings::load(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            settings,
        })
    }

    /// Private state directory (`<root>/.modlink`).
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Directory holding all module working copies.
    #[must_use]
    pub fn modules_dir(&self) -> PathBuf {
        self.state_dir().join(MODULES_DIR)
    }

    /// Build the context for `module`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModuleName`] if the name is empty or
    /// contains path separators or parent references.
    pub fn module(&self, module: &str) -> Result<ModuleContext, ConfigError> {
        validate_module_name(module)?;
        let working_copy = self.modules_dir().join(module);
        Ok(ModuleContext::new(
            &self.root,
            module,
            working_copy,
            &self.settings.descriptor,
        ))
    }

    /// Names of all checked-out modules, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the modules directory cannot be read.
    pub fn checked_out_modules(&self) -> Result<Vec<String>, ConfigError> {
        let dir = self.modules_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: dir.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Immutable context for one module operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContext {
    /// Projection root.
    pub root: PathBuf,
    /// Module name.
    pub module: String,
    /// Checked-out module tree.
    pub working_copy: PathBuf,
    /// Top-level descriptor inside the working copy.
    pub descriptor: PathBuf,
}

impl ModuleContext {
    /// Assemble a context from its parts.
    #[must_use]
    pub fn new(root: &Path, module: &str, working_copy: PathBuf, descriptor_name: &str) -> Self {
        let descriptor = working_copy.join(descriptor_name);
        Self {
            root: root.to_path_buf(),
            module: module.to_string(),
            working_copy,
            descriptor,
        }
    }

    /// The same module checked out somewhere else (used by `export`).
    #[must_use]
    pub fn relocated(&self, working_copy: &Path) -> Self {
        let descriptor = self
            .descriptor
            .file_name()
            .map_or_else(|| working_copy.to_path_buf(), |name| working_copy.join(name));
        Self {
            root: self.root.clone(),
            module: self.module.clone(),
            working_copy: working_copy.to_path_buf(),
            descriptor,
        }
    }

    /// Whether the working copy directory exists.
    #[must_use]
    pub fn is_checked_out(&self) -> bool {
        self.working_copy.is_dir()
    }

    /// Fail unless the working copy exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ModuleNotCheckedOut`].
    pub fn require_checked_out(&self) -> Result<(), ConfigError> {
        if self.is_checked_out() {
            Ok(())
        } else {
            Err(ConfigError::ModuleNotCheckedOut(self.module.clone()))
        }
    }
}

fn validate_module_name(module: &str) -> Result<(), ConfigError> {
    let invalid = module.is_empty()
        || module == "."
        || module == ".."
        || module.contains('/')
        || module.contains('\\');
    if invalid {
        return Err(ConfigError::InvalidModuleName(module.to_string()));
    }
    Ok(())
}
