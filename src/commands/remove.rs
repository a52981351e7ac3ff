//! Remove command: materialize files, delete the module, reconcile state.
use anyhow::Result;

use super::{AppContext, persist_state};
use crate::cli::RemoveArgs;
use crate::logging::Logger;
use crate::remove;
use crate::state::State;

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if state handling or the remove engine fails.
pub fn run(ctx: &AppContext, args: &RemoveArgs, log: &Logger) -> Result<()> {
    let dr = &ctx.dotfiles_dir;
    let mut state = State::load(dr)?;
    state.refresh(dr, log)?;

    remove::remove_module(dr, &args.module, &state, log)?;

    // The module directory is gone; refresh prunes its record.
    state.refresh(dr, log)?;
    persist_state(&state, dr, log)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::DeployArgs;
    use crate::paths;
    use std::fs;
    use std::path::PathBuf;

    fn logger() -> Logger {
        Logger::new()
    }

    /// Initialized root with a deployed `bash` module.
    fn deployed_setup() -> (tempfile::TempDir, AppContext, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dr = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        fs::create_dir_all(paths::peridot_dir(&dr)).unwrap();
        fs::create_dir_all(&home).unwrap();
        fs::create_dir_all(dr.join("bash")).unwrap();
        fs::write(dr.join("bash/bashrc"), "export EDITOR=vi").unwrap();
        fs::write(
            dr.join("bash/module.toml"),
            format!("root = \"{}\"\nignore = [\"module.toml\"]\n", home.display()),
        )
        .unwrap();

        let mut state = State::default();
        state
            .modules
            .insert("bash".to_string(), crate::state::ModuleState::default());
        state.save(&dr).unwrap();

        let ctx = AppContext::at(&dr);
        crate::commands::deploy::run(
            &ctx,
            &DeployArgs {
                module: "bash".to_string(),
                root: None,
                dotreplace: false,
                simulate: false,
                adopt: false,
                overwrite: false,
            },
            &logger(),
        )
        .unwrap();

        (tmp, ctx, home)
    }

    fn remove_args(module: &str) -> RemoveArgs {
        RemoveArgs {
            module: module.to_string(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn remove_prunes_state_and_restores_file() {
        let (_tmp, ctx, home) = deployed_setup();

        run(&ctx, &remove_args("bash"), &logger()).unwrap();

        let restored = home.join("bashrc");
        assert!(fs::symlink_metadata(&restored).unwrap().is_file());
        assert_eq!(fs::read_to_string(&restored).unwrap(), "export EDITOR=vi");

        assert!(!ctx.dotfiles_dir.join("bash").exists());
        let state = State::load(&ctx.dotfiles_dir).unwrap();
        assert!(!state.modules.contains_key("bash"));
    }

    #[cfg(unix)]
    #[test]
    fn remove_twice_succeeds() {
        let (_tmp, ctx, _home) = deployed_setup();
        run(&ctx, &remove_args("bash"), &logger()).unwrap();
        run(&ctx, &remove_args("bash"), &logger()).unwrap();
    }
}
