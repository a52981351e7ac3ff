//! Hook subprocess execution and binary lookup.
use std::path::Path;
use std::process::Command;

use crate::error::HookError;
use crate::logging::Logger;

/// Execute a hook command string synchronously.
///
/// The string is split on whitespace: the first word is the program, the rest
/// are its arguments. An empty string means "no hook" and succeeds
/// immediately. Combined stdout/stderr is captured and printed after the
/// hook completes.
///
/// # Errors
///
/// Returns [`HookError::Spawn`] if the process cannot be started and
/// [`HookError::Failed`] if it exits non-zero.
pub fn run_hook(hook: &str, cwd: &Path, log: &Logger) -> Result<(), HookError> {
    let mut parts = hook.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(());
    };

    log.debug(&format!("running hook: {hook}"));
    let output = Command::new(program)
        .args(parts)
        .current_dir(cwd)
        .output()
        .map_err(|source| HookError::Spawn {
            hook: hook.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        print!("{stdout}");
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        eprint!("{stderr}");
    }

    if !output.status.success() {
        return Err(HookError::Failed {
            hook: hook.to_string(),
            code: output.status.code().unwrap_or(-1),
        });
    }

    Ok(())
}

/// Check if a program is discoverable on `PATH`.
#[must_use]
pub fn which(program: &str) -> bool {
    #[cfg(target_os = "windows")]
    let check = Command::new("where").arg(program).output();

    #[cfg(not(target_os = "windows"))]
    let check = Command::new("which").arg(program).output();

    check.is_ok_and(|o| o.status.success())
}
