//! Add command: register a module and scaffold its directory.
use std::fs;

use anyhow::{Context as _, Result, ensure};

use super::{AppContext, persist_state};
use crate::cli::AddArgs;
use crate::logging::Logger;
use crate::module::DEFAULT_MODULE_TOML;
use crate::paths;
use crate::state::State;

/// Run the add command.
///
/// Ensures the module directory and a default `module.toml` exist, and that
/// the state record manages the module (status `NotDeployed`). Everything is
/// create-if-missing, so adding an existing module is a no-op.
///
/// # Errors
///
/// Returns an error if the state record is missing (run `init` first) or
/// the module scaffold cannot be created.
pub fn run(ctx: &AppContext, args: &AddArgs, log: &Logger) -> Result<()> {
    ensure!(!args.module.is_empty(), "cannot add a module with an empty name");

    let dr = &ctx.dotfiles_dir;
    let mut state = State::load(dr)?;

    let module_dir = paths::module_dir(dr, &args.module);
    fs::create_dir_all(&module_dir)
        .with_context(|| format!("could not create module dir {}", module_dir.display()))?;

    let config_path = module_dir.join(paths::MODULE_CONFIG_FILE_NAME);
    if !config_path.exists() {
        fs::write(&config_path, DEFAULT_MODULE_TOML)
            .with_context(|| format!("could not create {}", config_path.display()))?;
    }

    state.modules.entry(args.module.clone()).or_default();
    persist_state(&state, dr, log)?;

    log.info(&format!("added module {}", args.module));
    Ok(())
}
