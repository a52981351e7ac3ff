//! Small filesystem primitives shared by the deploy and remove engines.
use std::fs;
use std::io::{self, Read as _};
use std::path::Path;

use anyhow::{Context as _, Result};

/// How many leading bytes are inspected when sniffing for binary content.
const SNIFF_SIZE: usize = 4096;

/// Create the parent directory of `path` (and any missing ancestors).
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create parent dirs for {}", path.display()))?;
    }
    Ok(())
}

/// Copy `src` to `dst`, creating parent directories and preserving the source
/// file's permission bits.
///
/// # Errors
///
/// Returns an error if the copy fails at any step.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    ensure_parent_dir(dst)?;
    fs::copy(src, dst)
        .with_context(|| format!("could not copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Stream the contents of `src` into `out` without interpretation.
///
/// # Errors
///
/// Returns an error if the source cannot be opened or read.
pub fn copy_to_writer(src: &Path, out: &mut dyn io::Write) -> Result<()> {
    let mut file =
        fs::File::open(src).with_context(|| format!("could not open source: {}", src.display()))?;
    io::copy(&mut file, out)
        .with_context(|| format!("could not copy contents of {}", src.display()))?;
    Ok(())
}

/// Remove the file or symlink at `path`, treating "not found" as success.
///
/// Never follows symlinks: a dangling link is removed, the file it pointed to
/// is left alone.
///
/// # Errors
///
/// Returns an error on any failure other than the path not existing.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove file: {}", path.display())),
    }
}

/// Create a symlink at `link` pointing to `target`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error if the parent directories or the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    ensure_parent_dir(link)?;

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link).with_context(|| {
        format!("could not create symlink {} -> {}", link.display(), target.display())
    })?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link).with_context(|| {
        format!("could not create symlink {} -> {}", link.display(), target.display())
    })?;

    Ok(())
}

/// Return `true` if `path` looks like a text file.
///
/// Reads up to the first 4 KiB; any NUL byte marks the file as binary.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn is_text_file(path: &Path) -> Result<bool> {
    let file =
        fs::File::open(path).with_context(|| format!("could not open file: {}", path.display()))?;
    let mut buf = Vec::with_capacity(SNIFF_SIZE);
    file.take(SNIFF_SIZE as u64)
        .read_to_end(&mut buf)
        .with_context(|| format!("could not read file: {}", path.display()))?;
    Ok(!buf.contains(&0))
}
