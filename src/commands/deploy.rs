//! Deploy command: refresh state, run the deploy engine, persist.
use anyhow::Result;

use super::{AppContext, persist_state};
use crate::cli::DeployArgs;
use crate::deploy::{self, DeployOptions};
use crate::logging::Logger;
use crate::state::State;

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the state cannot be loaded or refreshed, if the
/// engine refuses or fails the deployment, or if the mutated state cannot
/// be persisted.
pub fn run(ctx: &AppContext, args: &DeployArgs, log: &Logger) -> Result<()> {
    let dr = &ctx.dotfiles_dir;
    let mut state = State::load(dr)?;
    state.refresh(dr, log)?;

    let opts = DeployOptions {
        root: args.root.clone(),
        dotreplace: args.dotreplace,
        simulate: args.simulate,
        adopt: args.adopt,
        overwrite: args.overwrite,
    };

    deploy::deploy_module(dr, &args.module, &mut state, &opts, log)?;

    // A simulated run decides everything but changes nothing, including the
    // persisted record.
    if args.simulate {
        return Ok(());
    }

    persist_state(&state, dr, log)
}
