//! Init command: create the dotfiles dir and an empty state record.
use std::fs;

use anyhow::{Context as _, Result};

use crate::cli::InitArgs;
use crate::logging::Logger;
use crate::paths;
use crate::state::State;

/// Run the init command.
///
/// Creates the target directory, the reserved `.peridot/` subdirectory, and
/// an empty state record. An existing `state.json` is never clobbered, so
/// re-running init is safe.
///
/// # Errors
///
/// Returns an error if a directory or the state file cannot be created.
pub fn run(args: &InitArgs, log: &Logger) -> Result<()> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;

    let target = if let Some(dir) = &args.dir {
        paths::resolve(&dir.to_string_lossy(), &cwd)?
    } else if args.here {
        cwd
    } else {
        paths::dotfiles_root_lookup()
    };

    fs::create_dir_all(&target)
        .with_context(|| format!("could not create dotfiles dir {}", target.display()))?;
    fs::create_dir_all(paths::peridot_dir(&target))
        .with_context(|| format!("could not create {}", paths::peridot_dir(&target).display()))?;

    if paths::state_file(&target).exists() {
        log.info(&format!(
            "dotfiles dir {} is already initialized",
            target.display()
        ));
        return Ok(());
    }

    State::default().save(&target)?;
    log.info(&format!("initialized dotfiles dir {}", target.display()));
    Ok(())
}
