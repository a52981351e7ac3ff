//! Status command: refresh the record and print the status tree.
use anyhow::Result;

use super::{AppContext, persist_state};
use crate::logging::Logger;
use crate::state::State;

/// Run the status command.
///
/// Refreshing rehashes every deployed entry, so drift introduced since the
/// last invocation is reflected both in the tree and in the record, which is
/// persisted before returning.
///
/// # Errors
///
/// Returns an error if state handling fails.
pub fn run(ctx: &AppContext, log: &Logger) -> Result<()> {
    let dr = &ctx.dotfiles_dir;
    let mut state = State::load(dr)?;
    state.refresh(dr, log)?;

    println!("dotfiles_dir: {}", dr.display());
    print!("{}", state.status_tree(dr).render());

    persist_state(&state, dr, log)
}
