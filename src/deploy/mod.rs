//! The deploy engine.
//!
//! Deployment turns a module directory into a coherent set of rendered
//! intermediates, symlinks, and state entries:
//!
//! ```text
//! DR/kitty/dot-config/kitty.conf            (source)
//!   -> DR/.peridot/kitty/.config/kitty.conf (rendered intermediate)
//!   <- ROOT/.config/kitty.conf              (symlink)
//! ```
//!
//! The engine is a per-module state machine: `NotDeployed`/`Unsynced` in,
//! `Synced` out on success, unchanged on failure. Partial deployments are
//! accepted as the worst case; the next refresh reclassifies affected
//! entries.

pub mod collision;

pub use collision::{CollisionPolicy, Outcome};

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use chrono::Utc;
use walkdir::WalkDir;

use crate::error::PathError;
use crate::logging::Logger;
use crate::module::Module;
use crate::state::{DeployStatus, Entry, State, path_key};
use crate::{exec, fsops, hash, paths, template};

/// Options accepted by the deploy engine, mirroring the CLI flags.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Override for the module's configured target root.
    pub root: Option<PathBuf>,
    /// Rewrite `dot-` path components to `.` when deriving target paths.
    pub dotreplace: bool,
    /// Decide everything, change nothing.
    pub simulate: bool,
    /// Adopt existing files at colliding targets.
    pub adopt: bool,
    /// Overwrite existing files at colliding targets.
    pub overwrite: bool,
}

/// Deploy one module.
///
/// Expects a freshly refreshed `state`. On success the module's record is
/// `Synced` with a fresh `deployed_at`; the caller is responsible for
/// persisting the state afterwards. In simulate mode the filesystem and the
/// record are left untouched.
///
/// # Errors
///
/// Returns an error when the module is unmanaged, preconditions are unmet, a
/// hook fails, or any per-file operation fails.
pub fn deploy_module(
    dotfiles_dir: &Path,
    name: &str,
    state: &mut State,
    opts: &DeployOptions,
    log: &Logger,
) -> Result<()> {
    if !state.modules.contains_key(name) {
        bail!("module {name} is not managed; run 'peridot add {name}' first");
    }

    let module = Module::load(dotfiles_dir, name)
        .with_context(|| format!("could not load module {name}"))?;

    if !module.should_deploy(state, log) {
        bail!("preconditions for module {name} are not met");
    }

    let files = enumerate_files(dotfiles_dir, &module)?;
    let root = opts
        .root
        .clone()
        .unwrap_or_else(|| module.config.root.clone());

    if opts.simulate {
        simulate_deployment(dotfiles_dir, &module, state, &files, &root, opts, log)
    } else {
        deploy_files(dotfiles_dir, &module, state, &files, &root, opts, log)
    }
}

/// Walk the module directory and collect deployable source files: regular
/// files whose basename is not ignored. The reserved `.peridot` name is
/// never traversed.
fn enumerate_files(dotfiles_dir: &Path, module: &Module) -> Result<Vec<PathBuf>> {
    let module_dir = paths::module_dir(dotfiles_dir, &module.name);
    let mut files = Vec::new();

    let walker = WalkDir::new(&module_dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != paths::PERIDOT_DIR_NAME);

    for entry in walker {
        let entry = entry.with_context(|| {
            format!("could not walk module directory {}", module_dir.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let basename = entry.file_name().to_string_lossy();
        if module.config.ignore.iter().any(|i| i == basename.as_ref()) {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

/// Derive the intermediate and symlink paths for one source file, applying
/// the dotreplace rewrite to the module-relative path when requested.
fn target_paths(
    dotfiles_dir: &Path,
    module: &Module,
    source: &Path,
    root: &Path,
    dotreplace: bool,
) -> Result<(PathBuf, PathBuf)> {
    let module_dir = paths::module_dir(dotfiles_dir, &module.name);
    let rel = source
        .strip_prefix(&module_dir)
        .map_err(|_| PathError::NotUnderBase {
            path: source.to_path_buf(),
            base: module_dir.clone(),
        })?;

    let rel = if dotreplace {
        paths::dotreplace_rel(rel)
    } else {
        rel.to_path_buf()
    };

    let deploy_path = module_dir.join(rel);
    let intermediate = paths::intermediate_of(&deploy_path, dotfiles_dir)?;
    let symlink_path = paths::symlink_of(&deploy_path, dotfiles_dir, &module.name, root)?;
    Ok((intermediate, symlink_path))
}

#[allow(clippy::too_many_arguments)]
fn deploy_files(
    dotfiles_dir: &Path,
    module: &Module,
    state: &mut State,
    files: &[PathBuf],
    root: &Path,
    opts: &DeployOptions,
    log: &Logger,
) -> Result<()> {
    let module_dir = paths::module_dir(dotfiles_dir, &module.name);

    exec::run_hook(&module.config.hooks.pre_deploy, &module_dir, log)
        .context("could not execute the pre-deploy hook")?;

    let policy = CollisionPolicy {
        adopt: opts.adopt,
        overwrite: opts.overwrite,
    };

    let Some(module_state) = state.modules.get_mut(&module.name) else {
        bail!("module {} disappeared from the state record", module.name);
    };

    for source in files {
        let (intermediate, symlink_path) =
            target_paths(dotfiles_dir, module, source, root, opts.dotreplace)?;

        collision::resolve(module_state, source, &symlink_path, policy)?;

        template::create_rendered(source, &intermediate, &module.config.template_variables)
            .with_context(|| format!("could not render {}", source.display()))?;

        fsops::remove_if_exists(&symlink_path)?;
        fsops::create_symlink(&intermediate, &symlink_path)?;

        let source_hash = hash::hash_file(source)?;
        module_state.files.insert(
            path_key(source),
            Entry {
                status: DeployStatus::Synced,
                source_hash,
                intermediate_path: intermediate,
                symlink_path: symlink_path.clone(),
            },
        );
        log.debug(&format!(
            "linked {} -> {}",
            symlink_path.display(),
            source.display()
        ));
    }

    module_state.status = DeployStatus::Synced;
    module_state.deployed_at = Some(Utc::now());

    exec::run_hook(&module.config.hooks.post_deploy, &module_dir, log)
        .context("could not execute the post-deploy hook")?;

    log.info(&format!(
        "deployed {} files from module {}",
        files.len(),
        module.name
    ));
    Ok(())
}

/// Dry run: make every decision the real deployment would make and report
/// the planned actions, without touching the filesystem or the record.
#[allow(clippy::too_many_arguments)]
fn simulate_deployment(
    dotfiles_dir: &Path,
    module: &Module,
    state: &State,
    files: &[PathBuf],
    root: &Path,
    opts: &DeployOptions,
    log: &Logger,
) -> Result<()> {
    let policy = CollisionPolicy {
        adopt: opts.adopt,
        overwrite: opts.overwrite,
    };
    let Some(module_state) = state.modules.get(&module.name) else {
        bail!("module {} disappeared from the state record", module.name);
    };

    if !module.config.hooks.pre_deploy.is_empty() {
        log.simulate(&format!(
            "would run pre-deploy hook: {}",
            module.config.hooks.pre_deploy
        ));
    }

    for source in files {
        let (intermediate, symlink_path) =
            target_paths(dotfiles_dir, module, source, root, opts.dotreplace)?;

        match collision::assess(module_state, &symlink_path, policy)? {
            Outcome::Adopt => log.simulate(&format!(
                "would adopt {} into {}",
                symlink_path.display(),
                source.display()
            )),
            Outcome::Overwrite => {
                log.simulate(&format!("would overwrite {}", symlink_path.display()));
            }
            Outcome::Vacant | Outcome::ReplaceManaged => {}
        }

        log.simulate(&format!("would render {}", intermediate.display()));
        log.simulate(&format!(
            "would link {} -> {}",
            symlink_path.display(),
            intermediate.display()
        ));
    }

    if !module.config.hooks.post_deploy.is_empty() {
        log.simulate(&format!(
            "would run post-deploy hook: {}",
            module.config.hooks.post_deploy
        ));
    }

    log.info(&format!(
        "simulated deployment of {} files from module {}; no changes made",
        files.len(),
        module.name
    ));
    Ok(())
}
