//! Module loading and deployment preconditions.
//!
//! A [`Module`] binds a name to its decoded metadata. Precondition checks
//! surface as warnings plus a boolean rather than typed errors: a refused
//! deployment is an answer for the user, not a programmer fault, and the
//! deploy engine turns a `false` into a user-readable abort.

mod config;

pub use config::{Conditions, DEFAULT_MODULE_TOML, Hooks, ModuleConfig, load_config};

use std::path::Path;

use crate::error::ConfigError;
use crate::exec;
use crate::logging::Logger;
use crate::state::State;

/// A loaded module: its name and validated configuration.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name; also its directory name under the dotfiles root.
    pub name: String,
    /// Validated metadata from `module.toml`.
    pub config: ModuleConfig,
}

impl Module {
    /// Load the named module's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the metadata is missing or invalid.
    pub fn load(dotfiles_dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let config = load_config(dotfiles_dir, name)?;
        Ok(Self {
            name: name.to_string(),
            config,
        })
    }

    /// Return `true` if every precondition for deploying this module holds.
    ///
    /// Each failing group logs a warning naming what is missing.
    #[must_use]
    pub fn should_deploy(&self, state: &State, log: &Logger) -> bool {
        if let Err(missing) = self.check_binary_dependencies() {
            log.warn(&format!(
                "module {} has missing dependencies: [{}]",
                self.name,
                missing.join(", ")
            ));
            return false;
        }

        if let Err(missing) = self.check_module_dependencies(state) {
            log.warn(&format!(
                "module {} requires modules [{}] to be managed",
                self.name,
                missing.join(", ")
            ));
            return false;
        }

        if let Err(reason) = self.check_conditions() {
            log.warn(&format!("module {}: {reason}", self.name));
            return false;
        }

        true
    }

    /// Check that every binary dependency is discoverable in `PATH`.
    ///
    /// # Errors
    ///
    /// Returns the list of missing binaries.
    pub fn check_binary_dependencies(&self) -> Result<(), Vec<String>> {
        let missing: Vec<String> = self
            .config
            .dependencies
            .iter()
            .filter(|bin| !exec::which(bin))
            .cloned()
            .collect();

        if missing.is_empty() { Ok(()) } else { Err(missing) }
    }

    /// Check that every module dependency has a state record, whatever its
    /// own deploy status.
    ///
    /// # Errors
    ///
    /// Returns the list of unmanaged module names.
    pub fn check_module_dependencies(&self, state: &State) -> Result<(), Vec<String>> {
        let missing: Vec<String> = self
            .config
            .module_dependencies
            .iter()
            .filter(|dep| !state.modules.contains_key(*dep))
            .cloned()
            .collect();

        if missing.is_empty() { Ok(()) } else { Err(missing) }
    }

    /// Check the OS and environment conditions.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first unmet condition.
    pub fn check_conditions(&self) -> Result<(), String> {
        let required_os = self.config.conditions.os.to_lowercase();
        if !required_os.is_empty() && required_os != std::env::consts::OS {
            return Err(format!("requires os to be {required_os}"));
        }

        for var in &self.config.conditions.env_required {
            if std::env::var_os(var).is_none() {
                return Err(format!("requires environment variable {var} to be set"));
            }
        }

        Ok(())
    }
}
