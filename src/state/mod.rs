//! The persisted state record and its refresh cycle.
//!
//! State is created once (via `peridot init`), loaded at the start of every
//! invocation, mutated in memory by the engines, and written back before the
//! process exits. The record lives as a single JSON blob at
//! `DR/.peridot/state.json`.

pub mod tree;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::logging::Logger;
use crate::{hash, paths};

/// Tri-valued deployment status shared by modules and file entries.
///
/// Serialized as bare integers in the state file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DeployStatus {
    /// Never deployed.
    #[default]
    NotDeployed,
    /// Deployed, but the source has changed since the last deployment.
    Unsynced,
    /// Deployed and up to date.
    Synced,
}

impl From<DeployStatus> for u8 {
    fn from(status: DeployStatus) -> Self {
        match status {
            DeployStatus::NotDeployed => 0,
            DeployStatus::Unsynced => 1,
            DeployStatus::Synced => 2,
        }
    }
}

impl TryFrom<u8> for DeployStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotDeployed),
            1 => Ok(Self::Unsynced),
            2 => Ok(Self::Synced),
            other => Err(format!("invalid deploy status: {other}")),
        }
    }
}

/// The whole state record: one entry per managed module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Managed modules, keyed by module name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleState>,
}

/// Recorded state of a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Aggregate status; `Synced` only when every file entry is `Synced`.
    pub status: DeployStatus,
    /// Wall-clock time of the last successful deployment.
    #[serde(rename = "deployedAt", default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    /// File entries, keyed by absolute source path.
    #[serde(default)]
    pub files: BTreeMap<String, Entry>,
}

impl ModuleState {
    /// Return `true` if `path` is recorded as a symlink managed by this
    /// module.
    #[must_use]
    pub fn manages_symlink(&self, path: &Path) -> bool {
        self.files.values().any(|e| e.symlink_path == path)
    }
}

/// Recorded state of a single deployed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Sync status of this file.
    pub status: DeployStatus,
    /// Hex-encoded SHA-256 of the source at last observation.
    #[serde(rename = "hash")]
    pub source_hash: String,
    /// Rendered intermediate file under `DR/.peridot/`.
    #[serde(rename = "intermediatePath")]
    pub intermediate_path: PathBuf,
    /// Deployed symlink location under the target root.
    #[serde(rename = "symlinkPath")]
    pub symlink_path: PathBuf,
}

/// Map key for the `files` table of a [`ModuleState`].
#[must_use]
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl State {
    /// Load the state record from `DR/.peridot/state.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotInitialized`] when the file is missing and
    /// [`StateError::Decode`] when it is malformed.
    pub fn load(dotfiles_dir: &Path) -> Result<Self, StateError> {
        let path = paths::state_file(dotfiles_dir);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StateError::NotInitialized { path });
            }
            Err(e) => return Err(StateError::Io { path, source: e }),
        };

        serde_json::from_slice(&raw).map_err(|e| StateError::Decode { path, source: e })
    }

    /// Persist the state record with mode `0644`.
    ///
    /// Must be called after any mutation that has to survive the process.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if encoding or writing fails.
    pub fn save(&self, dotfiles_dir: &Path) -> Result<(), StateError> {
        let path = paths::state_file(dotfiles_dir);
        let encoded = serde_json::to_vec_pretty(self).map_err(StateError::Encode)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::Io {
                path: path.clone(),
                source: e,
            })?;
        }
        fs::write(&path, encoded).map_err(|e| StateError::Io {
            path: path.clone(),
            source: e,
        })?;

        // The record's mode is part of its contract; don't leave it to the
        // process umask.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644))
                .map_err(|e| StateError::Io { path, source: e })?;
        }

        Ok(())
    }

    /// Bring the record back in line with the filesystem.
    ///
    /// First prunes entries whose source files are gone and modules whose
    /// directories are gone; then rehashes every entry of each deployed
    /// module, demoting entry and module to `Unsynced` on a mismatch. The
    /// fresh hash is always stored, which makes a second refresh with no
    /// intervening file changes a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a surviving source file cannot be hashed.
    pub fn refresh(&mut self, dotfiles_dir: &Path, log: &Logger) -> Result<()> {
        for (name, module) in &mut self.modules {
            let before = module.files.len();
            module.files.retain(|source, _| Path::new(source).exists());
            let pruned = before - module.files.len();
            if pruned > 0 {
                log.debug(&format!("pruned {pruned} stale entries from module {name}"));
            }
        }

        self.modules.retain(|name, _| {
            let exists = paths::module_dir(dotfiles_dir, name).is_dir();
            if !exists {
                log.debug(&format!("pruned module {name}: directory no longer exists"));
            }
            exists
        });

        for module in self.modules.values_mut() {
            if module.status == DeployStatus::NotDeployed {
                continue;
            }
            for (source, entry) in &mut module.files {
                let fresh = hash::hash_file(Path::new(source))
                    .with_context(|| format!("could not hash file {source}"))?;
                if fresh != entry.source_hash {
                    entry.status = DeployStatus::Unsynced;
                    module.status = DeployStatus::Unsynced;
                }
                entry.source_hash = fresh;
            }
        }

        Ok(())
    }

    /// Build the hierarchical status view: modules at the first level, then
    /// the directories and files of each module relative to its directory.
    #[must_use]
    pub fn status_tree(&self, dotfiles_dir: &Path) -> tree::Node {
        let mut root = tree::Node::new(".");

        for (name, module) in &self.modules {
            let mut module_node = tree::Node::new(format_module_status(name, module));
            let module_dir = paths::module_dir(dotfiles_dir, name);

            for (source, entry) in &module.files {
                let source = Path::new(source);
                let rel = source.strip_prefix(&module_dir).unwrap_or(source);

                let mut cursor = &mut module_node;
                if let Some(parent) = rel.parent() {
                    for component in parent.components() {
                        let part = component.as_os_str().to_string_lossy();
                        cursor = cursor.child_or_insert(&part);
                    }
                }

                let file = rel
                    .file_name()
                    .map_or_else(|| rel.to_string_lossy(), |n| n.to_string_lossy());
                cursor.add(tree::Node::new(format_entry_status(
                    &file,
                    module.status,
                    entry.status,
                )));
            }

            root.add(module_node);
        }

        root
    }
}

fn format_module_status(name: &str, module: &ModuleState) -> String {
    match module.status {
        DeployStatus::NotDeployed => format!("○ {name} - not deployed"),
        DeployStatus::Unsynced => format!("✗ {name} - deployed, pending sync"),
        DeployStatus::Synced => format!("✓ {name} - deployed and up to date"),
    }
}

fn format_entry_status(file: &str, module_status: DeployStatus, status: DeployStatus) -> String {
    if module_status == DeployStatus::NotDeployed {
        return file.to_string();
    }
    match status {
        DeployStatus::Synced => format!("✓ {file}"),
        _ => format!("✗ {file}"),
    }
}
