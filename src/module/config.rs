//! Module metadata: the `module.toml` file.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::paths;

/// Default metadata written by `peridot add` for new modules.
pub const DEFAULT_MODULE_TOML: &str = include_str!("default-module.toml");

/// Decoded and validated module metadata.
///
/// Path fields are resolved against the module directory at load time, so
/// consumers always see absolute paths.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Target base path under which symlinks are placed. Required.
    pub root: PathBuf,
    /// File basenames skipped during deployment.
    pub ignore: Vec<String>,
    /// External executables that must be discoverable in `PATH`.
    pub dependencies: Vec<String>,
    /// Names of modules that must exist in the state record.
    pub module_dependencies: Vec<String>,
    /// OS and environment requirements.
    pub conditions: Conditions,
    /// Shell command hooks around deploy and remove.
    pub hooks: Hooks,
    /// Values substituted during template rendering.
    #[serde(rename = "variables")]
    pub template_variables: BTreeMap<String, String>,
}

/// Preconditions a host must satisfy before the module deploys.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Conditions {
    /// Required operating system identifier, lowercased. Empty means any.
    pub os: String,
    /// Environment variables that must be set (an empty value counts).
    #[serde(rename = "env_exists")]
    pub env_required: Vec<String>,
}

/// Shell command strings run around deployment; empty means "no hook".
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Hooks {
    /// Runs before any file operation; a failure aborts the deployment.
    pub pre_deploy: String,
    /// Runs after all files deployed successfully.
    pub post_deploy: String,
    /// Runs during module removal, while the module files still exist.
    pub post_remove: String,
}

impl ModuleConfig {
    /// The path-valued fields of this schema, by name. Each entry drives
    /// resolution and existence validation.
    fn path_fields_mut(&mut self) -> [(&'static str, &mut PathBuf); 1] {
        [("root", &mut self.root)]
    }

    fn resolve_paths(&mut self, base: &Path) -> Result<(), ConfigError> {
        for (field, value) in self.path_fields_mut() {
            let raw = value.to_string_lossy().into_owned();
            *value = paths::resolve(&raw, base)
                .map_err(|source| ConfigError::Resolve { field, source })?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("root"));
        }

        for (field, value) in self.path_fields_mut() {
            if !value.exists() {
                return Err(ConfigError::MissingPath {
                    field,
                    path: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Read, resolve, and validate the metadata of the named module.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is unreadable, not valid TOML, or
/// fails validation (missing required field, non-existing path field).
pub fn load_config(dotfiles_dir: &Path, name: &str) -> Result<ModuleConfig, ConfigError> {
    let module_dir = paths::module_dir(dotfiles_dir, name);
    let path = module_dir.join(paths::MODULE_CONFIG_FILE_NAME);

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    let mut config: ModuleConfig = toml::from_str(&raw).map_err(|source| ConfigError::Decode {
        path,
        source: Box::new(source),
    })?;

    // Empty root must be caught before resolution turns it into the module dir.
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("root"));
    }

    config.resolve_paths(&module_dir)?;
    config.validate()?;
    Ok(config)
}
