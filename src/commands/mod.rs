//! Top-level command orchestration.
//!
//! Each submodule implements one CLI subcommand: load the state record,
//! refresh it, hand off to an engine, persist. Engines never persist state
//! themselves; the command layer owns the read-modify-write cycle so a
//! single invocation writes the record exactly once.

pub mod add;
pub mod deploy;
pub mod init;
pub mod remove;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::logging::Logger;
use crate::paths;
use crate::state::State;

/// Per-invocation context shared by all commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// The effective dotfiles root for this invocation.
    pub dotfiles_dir: PathBuf,
}

impl AppContext {
    /// Resolve the context from the environment and working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dotfiles_dir: paths::dotfiles_root_lookup(),
        }
    }

    /// Build a context rooted at an explicit directory.
    #[must_use]
    pub fn at(dotfiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            dotfiles_dir: dotfiles_dir.into(),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Persist the state record after the filesystem has been mutated.
///
/// A failure here is critical: the filesystem no longer matches the record.
/// It is logged with a distinctive message pointing the user at `status`,
/// whose refresh reconciles the record on the next run.
pub(crate) fn persist_state(state: &State, dotfiles_dir: &Path, log: &Logger) -> Result<()> {
    state.save(dotfiles_dir).map_err(|e| {
        log.error(
            "CRITICAL: the filesystem was changed but the state record could not \
             be saved; run 'peridot status' to reconcile it",
        );
        anyhow::Error::from(e)
    })
}
