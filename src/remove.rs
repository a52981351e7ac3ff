//! The remove engine: materialize deployed files, then delete the module.
//!
//! Removal walks the module's recorded entries, replaces each managed
//! symlink with a real file rendered from the *current* source (a working
//! file, though not necessarily a byte-identical snapshot of the last
//! deployment), and finally deletes the module directory. A later refresh
//! prunes the module from the record.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::logging::Logger;
use crate::module::Module;
use crate::state::State;
use crate::{exec, fsops, paths, template};

/// Remove one module.
///
/// Expects a freshly refreshed `state`. Removal of an unmanaged module is a
/// success: there is nothing to do. The caller refreshes and persists the
/// state afterwards, which prunes the deleted module's record.
///
/// # Errors
///
/// Returns an error when the module config cannot be loaded, a file cannot
/// be materialized, the post-remove hook fails, or the directory cannot be
/// deleted.
pub fn remove_module(
    dotfiles_dir: &Path,
    name: &str,
    state: &State,
    log: &Logger,
) -> Result<()> {
    let Some(module_state) = state.modules.get(name) else {
        log.info(&format!("module {name} is not managed; nothing to remove"));
        return Ok(());
    };

    let module = Module::load(dotfiles_dir, name)
        .with_context(|| format!("could not load module {name}"))?;
    let module_dir = paths::module_dir(dotfiles_dir, name);

    for (source, entry) in &module_state.files {
        let source = Path::new(source);
        if !source.exists() {
            continue;
        }
        materialize(source, &entry.symlink_path, &module, log)?;
    }

    // Run the hook before deletion so it can still see the module's files.
    exec::run_hook(&module.config.hooks.post_remove, &module_dir, log)
        .context("could not execute the post-remove hook")?;

    fs::remove_dir_all(&module_dir)
        .with_context(|| format!("could not remove module directory {}", module_dir.display()))?;

    log.info(&format!("removed module {name}"));
    Ok(())
}

/// Replace the managed symlink at `target` with a real file rendered from
/// `source`.
///
/// A regular file at the target belongs to the user and is left alone; only
/// symlinks are unlinked and re-rendered in place.
fn materialize(source: &Path, target: &Path, module: &Module, log: &Logger) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_symlink() => {
            fsops::remove_if_exists(target)?;
        }
        Ok(_) => {
            log.warn(&format!(
                "not replacing {}: it is not a symlink managed by peridot",
                target.display()
            ));
            return Ok(());
        }
        // Vacant target: the rendered file is still produced below, so the
        // user ends up with a working config either way.
        Err(_) => {}
    }

    template::create_rendered(source, target, &module.config.template_variables)
        .with_context(|| format!("could not materialize {}", target.display()))?;
    log.debug(&format!("materialized {}", target.display()));
    Ok(())
}
