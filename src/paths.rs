//! Path resolution and derivation for the dotfiles tree.
//!
//! All layout knowledge lives here: where the reserved `.peridot/` directory
//! sits, how a source file maps to its intermediate and symlink locations,
//! and how the effective dotfiles root is discovered.

use std::path::{Component, Path, PathBuf};

use crate::error::PathError;

/// Environment variable overriding dotfiles-root discovery.
pub const DOTFILES_DIR_ENV: &str = "PERIDOT_DOTFILES_DIR";
/// Name of the reserved directory holding state and intermediates.
pub const PERIDOT_DIR_NAME: &str = ".peridot";
/// Name of the state record file inside the reserved directory.
pub const STATE_FILE_NAME: &str = "state.json";
/// Name of the per-module metadata file.
pub const MODULE_CONFIG_FILE_NAME: &str = "module.toml";
/// Basename prefix rewritten to `.` when dotreplace is requested.
pub const DOTREPLACE_PREFIX: &str = "dot-";

/// Resolve `path` to an absolute, lexically cleaned path.
///
/// A leading `~` is substituted with the user's home directory; absolute
/// paths are returned cleaned; relative paths are joined onto `base`.
///
/// # Errors
///
/// Returns [`PathError::HomeDirUnknown`] when a tilde cannot be expanded.
pub fn resolve(path: &str, base: &Path) -> Result<PathBuf, PathError> {
    if let Some(rest) = path.strip_prefix('~') {
        let home = dirs::home_dir().ok_or_else(|| PathError::HomeDirUnknown {
            path: path.to_string(),
        })?;
        return Ok(clean(&home.join(rest.trim_start_matches('/'))));
    }

    let p = Path::new(path);
    if p.is_absolute() {
        return Ok(clean(p));
    }

    Ok(clean(&base.join(p)))
}

/// Lexically normalize a path: drop `.` components and fold `..` into their
/// parent where one is available. Purely textual; never touches the
/// filesystem, so it works for paths that do not exist yet.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // "/.." is still "/"
                Some(Component::RootDir) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Directory of a named module under the dotfiles root.
#[must_use]
pub fn module_dir(dotfiles_dir: &Path, name: &str) -> PathBuf {
    dotfiles_dir.join(name)
}

/// The reserved `.peridot/` directory under the dotfiles root.
#[must_use]
pub fn peridot_dir(dotfiles_dir: &Path) -> PathBuf {
    dotfiles_dir.join(PERIDOT_DIR_NAME)
}

/// Path of the state record file.
#[must_use]
pub fn state_file(dotfiles_dir: &Path) -> PathBuf {
    peridot_dir(dotfiles_dir).join(STATE_FILE_NAME)
}

/// Path of the persistent log file.
#[must_use]
pub fn log_file(dotfiles_dir: &Path) -> PathBuf {
    peridot_dir(dotfiles_dir).join("log").join("peridot.log")
}

/// Location of the intermediate (rendered) file for `source`: the reserved
/// directory mirrors the dotfiles root's layout.
///
/// # Errors
///
/// Returns [`PathError::NotUnderBase`] when `source` does not live under the
/// dotfiles root.
pub fn intermediate_of(source: &Path, dotfiles_dir: &Path) -> Result<PathBuf, PathError> {
    let rel = source
        .strip_prefix(dotfiles_dir)
        .map_err(|_| PathError::NotUnderBase {
            path: source.to_path_buf(),
            base: dotfiles_dir.to_path_buf(),
        })?;
    Ok(peridot_dir(dotfiles_dir).join(rel))
}

/// Location of the deployed symlink for `source`: the target root mirrors the
/// module directory's layout.
///
/// # Errors
///
/// Returns [`PathError::NotUnderBase`] when `source` does not live under the
/// module directory.
pub fn symlink_of(
    source: &Path,
    dotfiles_dir: &Path,
    module_name: &str,
    root: &Path,
) -> Result<PathBuf, PathError> {
    let base = module_dir(dotfiles_dir, module_name);
    let rel = source.strip_prefix(&base).map_err(|_| PathError::NotUnderBase {
        path: source.to_path_buf(),
        base,
    })?;
    Ok(root.join(rel))
}

/// Rewrite a `dot-` basename prefix to `.`, leaving directory parts untouched.
///
/// `config/dot-bashrc` becomes `config/.bashrc`; `dot-config/bashrc` is
/// returned unchanged because only the final component is considered.
#[must_use]
pub fn dotreplace(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    match name.strip_prefix(DOTREPLACE_PREFIX) {
        Some(rest) => path.with_file_name(format!(".{rest}")),
        None => path.to_path_buf(),
    }
}

/// Apply the `dot-` rewrite to every component of a relative path.
///
/// Deployment maps whole relative paths, where directories like
/// `dot-config/` must become `.config/` as well.
#[must_use]
pub fn dotreplace_rel(rel: &Path) -> PathBuf {
    rel.components()
        .map(|c| match c {
            Component::Normal(os) => match os.to_str().and_then(|s| s.strip_prefix(DOTREPLACE_PREFIX)) {
                Some(rest) => PathBuf::from(format!(".{rest}")),
                None => PathBuf::from(os),
            },
            other => PathBuf::from(other.as_os_str()),
        })
        .collect()
}

/// Resolve the effective dotfiles root.
///
/// Consults, in order: the `PERIDOT_DOTFILES_DIR` environment variable (if it
/// names an existing path), the nearest ancestor of the current working
/// directory containing `.peridot/state.json`, and finally the current
/// working directory itself.
#[must_use]
pub fn dotfiles_root_lookup() -> PathBuf {
    if let Ok(value) = std::env::var(DOTFILES_DIR_ENV) {
        let candidate = PathBuf::from(&value);
        if candidate.exists() {
            return candidate;
        }
    }

    let Ok(cwd) = std::env::current_dir() else {
        return PathBuf::from(".");
    };

    find_dotfiles_root(&cwd).unwrap_or(cwd)
}

/// Walk up from `start` looking for a directory that contains
/// `.peridot/state.json`.
#[must_use]
pub fn find_dotfiles_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| state_file(dir).exists())
        .map(Path::to_path_buf)
}
