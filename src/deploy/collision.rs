//! Collision handling for occupied symlink targets.
//!
//! Pure decision logic plus, for adoption, a single copy-back. The resolver
//! never touches the filesystem in any other branch; actual removal of the
//! occupying file happens later in the deploy sequence.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::CollisionError;
use crate::state::ModuleState;

/// How the user asked to treat occupied targets. The two flags are mutually
/// exclusive and both off by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionPolicy {
    /// Import an existing file's contents into the module, then replace it.
    pub adopt: bool,
    /// Discard an existing file and replace it with the symlink.
    pub overwrite: bool,
}

/// The decision for one `(source, symlink_path)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing occupies the target.
    Vacant,
    /// A non-symlink occupies the target; its contents are copied back into
    /// the source before deployment continues.
    Adopt,
    /// A non-symlink occupies the target and will be discarded.
    Overwrite,
    /// A symlink managed by this module occupies the target; it is replaced
    /// by unlink-then-symlink.
    ReplaceManaged,
}

/// Decide the fate of whatever occupies `symlink_path`, without side effects.
///
/// # Errors
///
/// Returns [`CollisionError::NonSymlinkPresent`] or
/// [`CollisionError::ForeignSymlink`] when the target blocks deployment, and
/// [`CollisionError::Io`] when the target cannot be inspected.
pub fn assess(
    module_state: &ModuleState,
    symlink_path: &Path,
    policy: CollisionPolicy,
) -> Result<Outcome, CollisionError> {
    let meta = match fs::symlink_metadata(symlink_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Vacant),
        Err(e) => {
            return Err(CollisionError::Io {
                path: symlink_path.to_path_buf(),
                source: e,
            });
        }
    };

    if !meta.is_symlink() {
        if policy.adopt {
            return Ok(Outcome::Adopt);
        }
        if policy.overwrite {
            return Ok(Outcome::Overwrite);
        }
        return Err(CollisionError::NonSymlinkPresent {
            path: symlink_path.to_path_buf(),
        });
    }

    if module_state.manages_symlink(symlink_path) {
        Ok(Outcome::ReplaceManaged)
    } else {
        Err(CollisionError::ForeignSymlink {
            path: symlink_path.to_path_buf(),
        })
    }
}

/// Decide and, for adoption, copy the occupying file's contents over
/// `source` (permission bits included) so the module takes ownership of
/// them.
///
/// # Errors
///
/// Propagates [`assess`] failures; adoption copy failures surface as
/// [`CollisionError::Io`].
pub fn resolve(
    module_state: &ModuleState,
    source: &Path,
    symlink_path: &Path,
    policy: CollisionPolicy,
) -> Result<Outcome, CollisionError> {
    let outcome = assess(module_state, symlink_path, policy)?;

    if outcome == Outcome::Adopt {
        fs::copy(symlink_path, source).map_err(|e| CollisionError::Io {
            path: symlink_path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(outcome)
}
